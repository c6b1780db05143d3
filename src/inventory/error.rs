use storage_api::system::DeviceKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Device '{0}' is defined more than once")]
    DuplicateDevice(String),

    #[error("Device '{device}' of kind '{kind}' references non-existent device '{target}'")]
    NonExistentReference {
        device: String,
        kind: DeviceKind,
        target: String,
    },

    #[error("Device '{device}' of kind '{kind}' references device '{target}' of invalid kind '{target_kind}'")]
    InvalidReferenceKind {
        device: String,
        kind: DeviceKind,
        target: String,
        target_kind: DeviceKind,
    },

    #[error("Partition '{0}' has no number")]
    MissingPartitionNumber(String),

    #[error("Partition '{partition}' belongs to both '{parent_1}' and '{parent_2}'")]
    SharedPartition {
        partition: String,
        parent_1: String,
        parent_2: String,
    },

    #[error("Device '{0}' is listed as unavailable or non-candidate but does not exist")]
    UnknownDeviceState(String),
}
