//! Solvers that match a storage config against the devices of the system.
//!
//! Solvers never fail. A search that finds nothing is solved without a
//! device, and it is up to the caller to decide what that means (see
//! [`storage_api::config::checker::ConfigChecker`]).

use log::info;

use storage_api::config::Config;

use crate::inventory::StorageInventory;

pub mod boot;
pub mod drives;
pub mod partitions;
pub mod search;

#[cfg(test)]
mod boot_tests;

use self::{
    boot::BootSolver,
    drives::{DrivesSearch, MdRaidsSearch},
    partitions::PartitionsSearch,
    search::DeviceMatcher,
};

/// Runs all the solvers over a config: drives, MD RAIDs, their partitions
/// and finally the boot device.
pub struct ConfigSolver<'a, I: StorageInventory + ?Sized> {
    inventory: &'a I,
}

impl<'a, I: StorageInventory + ?Sized> ConfigSolver<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self { inventory }
    }

    pub fn solve(&self, config: &mut Config) {
        let mut matcher = DeviceMatcher::for_config(self.inventory, config);
        DrivesSearch::new(self.inventory).solve_with(&mut matcher, config);
        MdRaidsSearch::new(self.inventory).solve_with(&mut matcher, config);
        PartitionsSearch::new(self.inventory).solve_with(&mut matcher, config);
        BootSolver::new(self.inventory).solve(config);

        match &config.boot.device.device_alias {
            Some(alias) if config.boot.configure => info!("Boot device: '{alias}'"),
            _ => info!("No boot device configured"),
        }
    }
}
