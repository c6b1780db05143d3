use log::debug;

use storage_api::config::{search::Search, Config, Partitionable};

use crate::inventory::StorageInventory;

use super::search::DeviceMatcher;

/// Solves the searches of the partitions of drives and MD RAIDs.
///
/// Partitions are only looked for in the device found for their parent.
/// When the parent has no device, all its partition searches are solved
/// without a device.
pub struct PartitionsSearch<'a, I: StorageInventory + ?Sized> {
    inventory: &'a I,
}

impl<'a, I: StorageInventory + ?Sized> PartitionsSearch<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self { inventory }
    }

    pub fn solve(&self, config: &mut Config) {
        let mut matcher = DeviceMatcher::for_config(self.inventory, config);
        self.solve_with(&mut matcher, config);
    }

    /// Solves the partitions of a single drive or MD RAID.
    pub fn solve_parent<P: Partitionable>(&self, parent: &mut P) {
        let mut matcher = DeviceMatcher::new(self.inventory);
        self.solve_parent_with(&mut matcher, parent);
    }

    pub(crate) fn solve_with(&self, matcher: &mut DeviceMatcher<'a, I>, config: &mut Config) {
        for drive in config.drives.iter_mut() {
            self.solve_parent_with(matcher, drive);
        }
        for md_raid in config.md_raids.iter_mut() {
            self.solve_parent_with(matcher, md_raid);
        }
    }

    fn solve_parent_with<P: Partitionable>(
        &self,
        matcher: &mut DeviceMatcher<'a, I>,
        parent: &mut P,
    ) {
        let device = parent
            .search()
            .and_then(Search::device)
            .and_then(|name| self.inventory.device(name));
        let partitions = std::mem::take(parent.partitions_mut());

        *parent.partitions_mut() = match device {
            Some(device) => {
                let pool = self.inventory.partitions(device);
                matcher.solve_entries(partitions, &pool)
            }
            None => {
                if !partitions.is_empty() {
                    debug!(
                        "No device for '{}', its partitions cannot be found",
                        parent.alias().unwrap_or("<unnamed>")
                    );
                }
                partitions
                    .into_iter()
                    .map(|mut partition| {
                        if let Some(search) = partition.search.as_mut() {
                            search.solve(None);
                        }
                        partition
                    })
                    .collect()
            }
        };
    }
}
