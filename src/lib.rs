//! Resolution of declarative storage configurations against the devices of
//! a system.
//!
//! The config model lives in [`storage_api`]. This crate matches the
//! searches of the config against a [`StorageInventory`] and infers the boot
//! device.

pub mod inventory;
pub mod solver;

pub use inventory::{error::InventoryError, DeviceGraph, StorageInventory};
pub use solver::{
    boot::BootSolver,
    drives::{DrivesSearch, MdRaidsSearch},
    partitions::PartitionsSearch,
    ConfigSolver,
};
