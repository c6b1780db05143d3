//! # Boot device inference
//!
//! When the boot device is left to the default, it is inferred from the
//! location of the root filesystem:
//! - Root in a partition of a drive: that drive.
//! - Root in a drive formatted as a whole: no boot device, as there is no
//!   room for a partition table.
//! - Root in an MD RAID (formatted or partitioned): a reused RAID is the
//!   boot device only if it is a candidate device. Otherwise, the first
//!   drive holding a partition used as member, following nested RAIDs. A
//!   RAID built only on whole disks gives no boot device.
//! - Root in a logical volume: the first drive or RAID where physical
//!   volumes are generated, then the first drive holding a partition used as
//!   physical volume, following RAIDs as above.
//!
//! A drive or reused RAID whose search found no device leaves the boot device
//! undetermined.
//!
//! The chosen drive or RAID gets a new alias if it has none.

use std::collections::BTreeSet;

use log::{debug, warn};

use storage_api::{
    config::{Config, Partitionable},
    constants::{DRIVE_ALIAS_PREFIX, MD_RAID_ALIAS_PREFIX},
};

use crate::inventory::StorageInventory;

/// Config entry holding the root filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootOwner {
    /// Drive, either formatted as root or holding the root partition.
    Drive { index: usize, formatted: bool },
    MdRaid(usize),
    VolumeGroup(usize),
}

/// Entry that can host the boot partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BootTarget {
    Drive(usize),
    MdRaid(usize),
}

pub struct BootSolver<'a, I: StorageInventory + ?Sized> {
    inventory: &'a I,
}

impl<'a, I: StorageInventory + ?Sized> BootSolver<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self { inventory }
    }

    /// Sets the boot device alias, if it has to be inferred and it can be.
    pub fn solve(&self, config: &mut Config) {
        if !config.boot.needs_default_device() {
            return;
        }

        let Some(owner) = Self::root_owner(config) else {
            debug!("No root filesystem, boot device not inferred");
            return;
        };

        let Some(target) = self.boot_target(config, owner) else {
            debug!("No suitable boot device for root in {owner:?}");
            return;
        };

        let alias = Self::ensure_alias(config, target);
        debug!("Boot device inferred: '{alias}'");
        config.boot.device.device_alias = Some(alias);
    }

    fn root_owner(config: &Config) -> Option<RootOwner> {
        let drive = config.drives.iter().enumerate().find_map(|(index, d)| {
            if d.is_root() {
                Some(RootOwner::Drive {
                    index,
                    formatted: true,
                })
            } else {
                d.root_partition().map(|_| RootOwner::Drive {
                    index,
                    formatted: false,
                })
            }
        });

        drive
            .or_else(|| {
                config
                    .md_raids
                    .iter()
                    .position(|r| r.is_root() || r.root_partition().is_some())
                    .map(RootOwner::MdRaid)
            })
            .or_else(|| {
                config
                    .volume_groups
                    .iter()
                    .position(|vg| vg.root_logical_volume().is_some())
                    .map(RootOwner::VolumeGroup)
            })
    }

    fn boot_target(&self, config: &Config, owner: RootOwner) -> Option<BootTarget> {
        let mut visited = BTreeSet::new();
        match owner {
            RootOwner::Drive {
                index,
                formatted: false,
            } => Self::drive_target(config, index),
            RootOwner::Drive {
                formatted: true, ..
            } => None,
            RootOwner::MdRaid(index) => self.md_raid_target(config, index, &mut visited),
            RootOwner::VolumeGroup(index) => {
                let vg = &config.volume_groups[index];
                vg.target_device_aliases()
                    .find_map(|alias| self.reference_target(config, alias, true, &mut visited))
                    .or_else(|| {
                        vg.physical_volume_aliases().find_map(|alias| {
                            self.reference_target(config, alias, false, &mut visited)
                        })
                    })
            }
        }
    }

    fn drive_target(config: &Config, index: usize) -> Option<BootTarget> {
        if config.drives[index].is_missing() {
            debug!("No disk found for drive #{index}");
            return None;
        }
        Some(BootTarget::Drive(index))
    }

    fn md_raid_target(
        &self,
        config: &Config,
        index: usize,
        visited: &mut BTreeSet<BootTarget>,
    ) -> Option<BootTarget> {
        if !visited.insert(BootTarget::MdRaid(index)) {
            return None;
        }

        let md_raid = &config.md_raids[index];
        if md_raid.is_missing() {
            debug!("No MD RAID found for MD RAID #{index}");
            return None;
        }
        if let Some(name) = md_raid.found_device() {
            let candidate = self
                .inventory
                .device(name)
                .is_some_and(|device| self.inventory.is_candidate(device));
            if !candidate {
                debug!("MD RAID '{name}' is not a candidate device");
            }
            return candidate.then_some(BootTarget::MdRaid(index));
        }

        md_raid
            .devices
            .iter()
            .find_map(|member| self.reference_target(config, member, false, visited))
    }

    /// Boot target for a device referenced by alias from a RAID or a volume
    /// group. A whole drive only qualifies when it is a target where new
    /// physical volumes are generated.
    fn reference_target(
        &self,
        config: &Config,
        alias: &str,
        is_target: bool,
        visited: &mut BTreeSet<BootTarget>,
    ) -> Option<BootTarget> {
        if let Some(index) = config.find_drive(alias) {
            return if is_target {
                Self::drive_target(config, index)
            } else {
                None
            };
        }
        if let Some(index) = config.find_drive_with_partition(alias) {
            return Self::drive_target(config, index);
        }
        if let Some(index) = config
            .find_md_raid(alias)
            .or_else(|| config.find_md_raid_with_partition(alias))
        {
            return self.md_raid_target(config, index, visited);
        }

        warn!("Device '{alias}' not found in the storage configuration");
        None
    }

    /// Returns the alias of the target, generating one if needed.
    fn ensure_alias(config: &mut Config, target: BootTarget) -> String {
        let (current, prefix) = match target {
            BootTarget::Drive(index) => (config.drives[index].alias(), DRIVE_ALIAS_PREFIX),
            BootTarget::MdRaid(index) => (config.md_raids[index].alias(), MD_RAID_ALIAS_PREFIX),
        };
        if let Some(alias) = current {
            return alias.to_owned();
        }

        let alias = config.generate_alias(prefix);
        let slot = match target {
            BootTarget::Drive(index) => &mut config.drives[index].alias,
            BootTarget::MdRaid(index) => &mut config.md_raids[index].alias,
        };
        *slot = Some(alias.clone());
        alias
    }
}
