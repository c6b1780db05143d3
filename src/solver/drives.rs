use log::debug;

use storage_api::{config::Config, system::DeviceKind};

use crate::inventory::StorageInventory;

use super::search::DeviceMatcher;

/// Solves the searches of the drives of a config.
pub struct DrivesSearch<'a, I: StorageInventory + ?Sized> {
    inventory: &'a I,
}

impl<'a, I: StorageInventory + ?Sized> DrivesSearch<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self { inventory }
    }

    pub fn solve(&self, config: &mut Config) {
        let mut matcher = DeviceMatcher::for_config(self.inventory, config);
        self.solve_with(&mut matcher, config);
    }

    pub(crate) fn solve_with(&self, matcher: &mut DeviceMatcher<'a, I>, config: &mut Config) {
        let pool = self.inventory.candidate_devices(DeviceKind::Disk);
        let drives = std::mem::take(&mut config.drives);
        config.drives = matcher.solve_entries(drives, &pool);
        debug!("Solved {} drive(s)", config.drives.len());
    }
}

/// Solves the searches of the MD RAIDs of a config.
///
/// Every RAID of the system can be matched, candidate or not. Whether a
/// reused RAID is suitable for booting is decided later by the boot solver.
pub struct MdRaidsSearch<'a, I: StorageInventory + ?Sized> {
    inventory: &'a I,
}

impl<'a, I: StorageInventory + ?Sized> MdRaidsSearch<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self { inventory }
    }

    pub fn solve(&self, config: &mut Config) {
        let mut matcher = DeviceMatcher::for_config(self.inventory, config);
        self.solve_with(&mut matcher, config);
    }

    pub(crate) fn solve_with(&self, matcher: &mut DeviceMatcher<'a, I>, config: &mut Config) {
        let pool = self.inventory.devices_of_kind(DeviceKind::MdRaid);
        let md_raids = std::mem::take(&mut config.md_raids);
        config.md_raids = matcher.solve_entries(md_raids, &pool);
        debug!("Solved {} MD RAID(s)", config.md_raids.len());
    }
}
