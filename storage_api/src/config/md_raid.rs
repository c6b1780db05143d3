use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::DeviceName;

use super::{
    filesystem::{mounts_root, Filesystem},
    partition::Partition,
    search::Search,
    Partitionable,
};

/// A software RAID. With a search it refers to an existing array, otherwise
/// it describes an array to be built from `devices`.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MdRaid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Name of the array to create, e.g. `system`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<RaidLevel>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::primitives::shortcuts::opt_string_or_struct"
    )]
    pub search: Option<Search>,

    /// Aliases of the member devices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Filesystem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<Partition>,
}

impl MdRaid {
    pub fn is_root(&self) -> bool {
        mounts_root(&self.filesystem)
    }

    /// Array already present on the system the config refers to.
    pub fn found_device(&self) -> Option<&DeviceName> {
        self.search.as_ref().and_then(Search::device)
    }

    /// Whether the search found no array, and none has to be built instead.
    pub fn is_missing(&self) -> bool {
        self.search.as_ref().is_some_and(Search::is_missing)
    }

    /// Whether the array has to be built.
    pub fn is_new(&self) -> bool {
        self.search.as_ref().map_or(true, Search::create_device)
    }
}

impl Partitionable for MdRaid {
    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn search(&self) -> Option<&Search> {
        self.search.as_ref()
    }

    fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    fn partitions_mut(&mut self) -> &mut Vec<Partition> {
        &mut self.partitions
    }
}

#[derive(
    Serialize, Deserialize, Copy, Clone, Debug, Hash, Eq, PartialEq, Display, EnumString,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[strum(serialize_all = "kebab-case")]
pub enum RaidLevel {
    /// # Striping
    Raid0,

    /// # Mirroring
    Raid1,

    /// # Striping with dedicated parity
    Raid4,

    /// # Striping with parity
    Raid5,

    /// # Striping with double parity
    Raid6,

    /// # Stripe of mirrors
    Raid10,
}

impl RaidLevel {
    /// Minimum number of member devices needed to build an array.
    pub fn min_devices(self) -> usize {
        match self {
            RaidLevel::Raid0 | RaidLevel::Raid1 | RaidLevel::Raid10 => 2,
            RaidLevel::Raid4 | RaidLevel::Raid5 => 3,
            RaidLevel::Raid6 => 4,
        }
    }
}
