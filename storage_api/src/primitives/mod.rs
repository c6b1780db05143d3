pub mod bytes;
pub(crate) mod shortcuts;
