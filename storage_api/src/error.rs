use serde::{Deserialize, Serialize};

use crate::config::md_raid::RaidLevel;

/// A problem found in a storage configuration.
#[derive(thiserror::Error, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    #[error("Alias '{0}' is defined more than once")]
    DuplicatedAlias(String),

    #[error("MD RAID '{raid}' references non-existent device '{member}'")]
    MissingRaidMember { raid: String, member: String },

    #[error("MD RAID '{raid}' has {count} device(s), but at least {required} are required for {level}")]
    WrongRaidMembers {
        raid: String,
        level: RaidLevel,
        count: usize,
        required: usize,
    },

    #[error("Volume group '{volume_group}' references non-existent physical volume '{alias}'")]
    MissingPhysicalVolume { volume_group: String, alias: String },

    #[error("Volume group '{volume_group}' references non-existent target device '{alias}'")]
    MissingTargetDevice { volume_group: String, alias: String },

    #[error("Volume group at position {0} has no name")]
    VolumeGroupWithoutName(usize),

    #[error("Device '{0}' is used by more than one MD RAID or volume group")]
    OverusedAlias(String),

    #[error("No device found for '{0}'")]
    SearchNotFound(String),
}
