/// Mount point of the root filesystem.
pub const ROOT_MOUNT_POINT_PATH: &str = "/";

/// Prefix of the aliases synthesized for drives.
pub const DRIVE_ALIAS_PREFIX: &str = "drive";

/// Prefix of the aliases synthesized for MD RAIDs.
pub const MD_RAID_ALIAS_PREFIX: &str = "mdRaid";
