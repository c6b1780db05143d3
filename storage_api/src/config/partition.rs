use serde::{Deserialize, Serialize};

use super::{
    filesystem::{mounts_root, Filesystem},
    search::Search,
};

/// A partition of a drive or of an MD RAID.
///
/// A partition with a search refers to an existing partition of the parent
/// device. Without a search the partition is meant to be created.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Partition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::primitives::shortcuts::opt_string_or_struct"
    )]
    pub search: Option<Search>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Filesystem>,
}

impl Partition {
    pub fn is_root(&self) -> bool {
        mounts_root(&self.filesystem)
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.alias.as_deref() == Some(alias)
    }
}
