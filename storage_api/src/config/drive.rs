use serde::{Deserialize, Serialize};

use super::{
    filesystem::{mounts_root, Filesystem},
    partition::Partition,
    search::Search,
    Partitionable,
};

/// A disk of the system, identified through a search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Drive {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Defaults to the first available disk.
    #[serde(
        default = "Search::default_drive",
        deserialize_with = "crate::primitives::shortcuts::string_or_struct"
    )]
    pub search: Search,

    /// Filesystem created directly on the whole disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Filesystem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<Partition>,
}

impl Default for Drive {
    fn default() -> Self {
        Self {
            alias: None,
            search: Search::default_drive(),
            filesystem: None,
            partitions: Vec::new(),
        }
    }
}

impl Drive {
    pub fn is_root(&self) -> bool {
        mounts_root(&self.filesystem)
    }

    /// Whether the search found no disk for the drive.
    pub fn is_missing(&self) -> bool {
        self.search.is_missing()
    }
}

impl Partitionable for Drive {
    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn search(&self) -> Option<&Search> {
        Some(&self.search)
    }

    fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    fn partitions_mut(&mut self) -> &mut Vec<Partition> {
        &mut self.partitions
    }
}
