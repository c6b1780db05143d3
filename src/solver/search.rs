//! Matching of config entries against inventory devices.

use std::collections::BTreeSet;

use log::{debug, trace};

use storage_api::{
    config::{drive::Drive, md_raid::MdRaid, partition::Partition, search::Search, Config},
    system::Device,
    DeviceName,
};

use crate::inventory::StorageInventory;

/// A config entry whose device is found through a search.
pub trait Searchable: Clone {
    fn search(&self) -> Option<&Search>;

    fn search_mut(&mut self) -> Option<&mut Search>;

    fn alias(&self) -> Option<&str>;

    /// Removes the alias of the entry and of its partitions. Used on the
    /// copies of an expanded entry so every alias keeps pointing to a single
    /// device.
    fn clear_aliases(&mut self);
}

macro_rules! impl_searchable {
    ($ty:ty $(, $children:ident)?) => {
        impl Searchable for $ty {
            fn search(&self) -> Option<&Search> {
                self.search.as_ref()
            }

            fn search_mut(&mut self) -> Option<&mut Search> {
                self.search.as_mut()
            }

            fn alias(&self) -> Option<&str> {
                self.alias.as_deref()
            }

            fn clear_aliases(&mut self) {
                self.alias = None;
                $(
                    for child in self.$children.iter_mut() {
                        child.alias = None;
                    }
                )?
            }
        }
    };
}

impl Searchable for Drive {
    fn search(&self) -> Option<&Search> {
        Some(&self.search)
    }

    fn search_mut(&mut self) -> Option<&mut Search> {
        Some(&mut self.search)
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn clear_aliases(&mut self) {
        self.alias = None;
        for partition in self.partitions.iter_mut() {
            partition.alias = None;
        }
    }
}

impl_searchable!(MdRaid, partitions);
impl_searchable!(Partition);

/// Assigns inventory devices to searches.
///
/// Keeps track of the devices already claimed by some entry, so every device
/// is assigned at most once during a resolution pass.
pub struct DeviceMatcher<'a, I: StorageInventory + ?Sized> {
    inventory: &'a I,

    /// Names of the devices already assigned to an entry.
    claimed: BTreeSet<DeviceName>,
}

impl<'a, I: StorageInventory + ?Sized> DeviceMatcher<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self {
            inventory,
            claimed: BTreeSet::new(),
        }
    }

    /// Creates a matcher where the devices of the already solved searches of
    /// the config are claimed.
    pub fn for_config(inventory: &'a I, config: &Config) -> Self {
        let mut matcher = Self::new(inventory);

        let drives = config.drives.iter().flat_map(|d| {
            std::iter::once(Some(&d.search))
                .chain(d.partitions.iter().map(|p| p.search.as_ref()))
        });
        let md_raids = config.md_raids.iter().flat_map(|r| {
            std::iter::once(r.search.as_ref())
                .chain(r.partitions.iter().map(|p| p.search.as_ref()))
        });

        for device in drives.chain(md_raids).flatten().filter_map(Search::device) {
            matcher.claim(device);
        }
        matcher
    }

    pub fn claim(&mut self, name: &str) {
        self.claimed.insert(name.to_owned());
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.claimed.contains(name)
    }

    fn is_available(&self, device: &Device) -> bool {
        !self.is_claimed(&device.name) && self.inventory.is_available(device)
    }

    /// Devices of the pool matching the search, in search order and limited
    /// to the number of devices the search can take.
    pub fn find_devices(&self, search: &Search, pool: &[&'a Device]) -> Vec<&'a Device> {
        let mut candidates: Vec<&'a Device> = pool
            .iter()
            .copied()
            .filter(|d| self.is_available(d))
            .collect();
        candidates.sort_by(|a, b| search.compare(a, b));

        trace!(
            "Available devices in search order: {:?}",
            candidates.iter().map(|d| &d.name).collect::<Vec<_>>()
        );

        candidates
            .into_iter()
            .filter(|d| search.condition.matches(d))
            .take(search.limit().unwrap_or(usize::MAX))
            .collect()
    }

    /// Solves the searches of a list of sibling entries, in declared order.
    ///
    /// An entry whose search can match several devices is replaced by one
    /// copy per matched device. Entries without a search, or already solved,
    /// are kept as they are.
    pub fn solve_entries<T: Searchable>(
        &mut self,
        entries: Vec<T>,
        pool: &[&'a Device],
    ) -> Vec<T> {
        for device in entries
            .iter()
            .filter_map(|e| e.search().and_then(Search::device))
        {
            self.claimed.insert(device.clone());
        }

        let mut solved = Vec::with_capacity(entries.len());
        for mut entry in entries {
            let devices = match entry.search() {
                Some(search) if !search.is_solved() => Some(self.find_devices(search, pool)),
                _ => None,
            };
            let Some(devices) = devices else {
                solved.push(entry);
                continue;
            };

            let label = entry.alias().unwrap_or("<unnamed>").to_owned();
            if devices.is_empty() {
                debug!("No device found for '{label}'");
                if let Some(search) = entry.search_mut() {
                    search.solve(None);
                }
                solved.push(entry);
                continue;
            }

            if devices.len() > 1 {
                debug!("Expanding '{label}' into {} entries", devices.len());
            }

            for (index, device) in devices.into_iter().enumerate() {
                let mut copy = entry.clone();
                if index > 0 {
                    copy.clear_aliases();
                }
                debug!("Device '{}' found for '{label}'", device.name);
                if let Some(search) = copy.search_mut() {
                    search.solve(Some(device.name.clone()));
                }
                self.claim(&device.name);
                solved.push(copy);
            }
        }
        solved
    }
}
