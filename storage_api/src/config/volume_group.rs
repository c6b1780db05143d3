use serde::{Deserialize, Serialize};

use super::filesystem::{mounts_root, Filesystem};

/// An LVM volume group to be created.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VolumeGroup {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub physical_volumes: Vec<PhysicalVolume>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logical_volumes: Vec<LogicalVolume>,
}

impl VolumeGroup {
    pub fn root_logical_volume(&self) -> Option<&LogicalVolume> {
        self.logical_volumes.iter().find(|lv| lv.is_root())
    }

    /// Aliases of the devices directly used as physical volumes.
    pub fn physical_volume_aliases(&self) -> impl Iterator<Item = &str> {
        self.physical_volumes.iter().filter_map(|pv| match pv {
            PhysicalVolume::Alias(alias) => Some(alias.as_str()),
            PhysicalVolume::Generate { .. } => None,
        })
    }

    /// Aliases of the devices where physical volumes have to be generated.
    pub fn target_device_aliases(&self) -> impl Iterator<Item = &str> {
        self.physical_volumes
            .iter()
            .filter_map(|pv| match pv {
                PhysicalVolume::Generate { generate } => Some(generate),
                PhysicalVolume::Alias(_) => None,
            })
            .flatten()
            .map(String::as_str)
    }
}

/// Either the alias of an existing config entry used as physical volume, or
/// a list of devices where new physical volumes are generated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PhysicalVolume {
    Alias(String),
    Generate { generate: Vec<String> },
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LogicalVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Filesystem>,
}

impl LogicalVolume {
    pub fn is_root(&self) -> bool {
        mounts_root(&self.filesystem)
    }
}
