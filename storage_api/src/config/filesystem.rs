use serde::{Deserialize, Serialize};

use crate::constants::ROOT_MOUNT_POINT_PATH;

/// Filesystem to create or reuse on a device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Filesystem {
    /// Mount point.
    pub path: String,
}

impl Filesystem {
    pub fn is_root(&self) -> bool {
        self.path == ROOT_MOUNT_POINT_PATH
    }
}

/// Whether the optional filesystem is mounted at `/`.
pub(crate) fn mounts_root(filesystem: &Option<Filesystem>) -> bool {
    filesystem.as_ref().is_some_and(Filesystem::is_root)
}
