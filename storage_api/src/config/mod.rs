use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};

use crate::{error::ConfigIssue, is_default};

pub mod boot;
pub mod checker;
pub mod drive;
pub mod filesystem;
pub mod md_raid;
pub mod partition;
pub mod search;
pub mod volume_group;

use self::{
    boot::Boot, checker::ConfigChecker, drive::Drive, md_raid::MdRaid, partition::Partition,
    search::Search, volume_group::VolumeGroup,
};

/// Storage configuration: the devices to use and how to lay them out.
///
/// Entries refer to each other by alias. Searches start unsolved and are
/// solved against the devices of the system before the configuration is
/// applied.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "is_default")]
    pub boot: Boot,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<Drive>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub md_raids: Vec<MdRaid>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_groups: Vec<VolumeGroup>,
}

/// A config entry that can hold a partition table.
pub trait Partitionable {
    fn alias(&self) -> Option<&str>;

    /// Search of the entry, if it refers to an existing device.
    fn search(&self) -> Option<&Search>;

    fn partitions(&self) -> &[Partition];

    fn partitions_mut(&mut self) -> &mut Vec<Partition>;

    fn has_partition(&self, alias: &str) -> bool {
        self.partitions().iter().any(|p| p.has_alias(alias))
    }

    fn root_partition(&self) -> Option<&Partition> {
        self.partitions().iter().find(|p| p.is_root())
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        serde_yaml::from_str(yaml).context("Failed to parse storage configuration")
    }

    /// All aliases in the configuration, in declared order, duplicates
    /// included.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        let drives = self.drives.iter().flat_map(|d| {
            d.alias
                .iter()
                .chain(d.partitions.iter().filter_map(|p| p.alias.as_ref()))
        });
        let md_raids = self.md_raids.iter().flat_map(|r| {
            r.alias
                .iter()
                .chain(r.partitions.iter().filter_map(|p| p.alias.as_ref()))
        });
        let logical_volumes = self
            .volume_groups
            .iter()
            .flat_map(|vg| vg.logical_volumes.iter().filter_map(|lv| lv.alias.as_ref()));

        drives
            .chain(md_raids)
            .chain(logical_volumes)
            .map(String::as_str)
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases().any(|a| a == alias)
    }

    /// Returns `<prefix><n>` with the smallest `n` not used by any alias.
    pub fn generate_alias(&self, prefix: &str) -> String {
        (0..)
            .map(|n| format!("{prefix}{n}"))
            .find(|alias| !self.has_alias(alias))
            .unwrap_or_else(|| prefix.to_owned())
    }

    /// Index of the drive with the given alias.
    pub fn find_drive(&self, alias: &str) -> Option<usize> {
        self.drives
            .iter()
            .position(|d| d.alias.as_deref() == Some(alias))
    }

    /// Index of the drive holding the partition with the given alias.
    pub fn find_drive_with_partition(&self, alias: &str) -> Option<usize> {
        self.drives.iter().position(|d| d.has_partition(alias))
    }

    pub fn find_md_raid(&self, alias: &str) -> Option<usize> {
        self.md_raids
            .iter()
            .position(|r| r.alias.as_deref() == Some(alias))
    }

    pub fn find_md_raid_with_partition(&self, alias: &str) -> Option<usize> {
        self.md_raids.iter().position(|r| r.has_partition(alias))
    }

    /// Checks the configuration, returning the first issue found.
    pub fn validate(&self) -> Result<(), ConfigIssue> {
        match ConfigChecker::new(self).issues().into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::config::search::SearchCondition;

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(indoc! {r#"
            boot:
              configure: true
            drives:
              - alias: disk1
                search: /dev/vda
                partitions:
                  - alias: root
                    filesystem:
                      path: /
              - {}
            mdRaids:
              - alias: md0
                level: raid1
                devices: [disk1, disk2]
            volumeGroups:
              - name: system
                physicalVolumes:
                  - generate: [disk1]
                logicalVolumes:
                  - alias: home
                    filesystem:
                      path: /home
        "#})
        .unwrap();

        assert_eq!(config.drives.len(), 2);
        assert_eq!(
            config.drives[0].search.condition,
            SearchCondition::Name("/dev/vda".into())
        );
        assert_eq!(config.drives[1].search, Search::default_drive());
        assert_eq!(config.md_raids[0].devices, vec!["disk1", "disk2"]);
        assert_eq!(
            config.aliases().collect::<Vec<_>>(),
            vec!["disk1", "root", "md0", "home"]
        );

        let err = Config::from_yaml("disks: []").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse storage configuration");
    }

    #[test]
    fn test_generate_alias() {
        let config = Config::from_yaml(indoc! {r#"
            drives:
              - alias: drive0
              - alias: drive2
        "#})
        .unwrap();
        assert_eq!(config.generate_alias("drive"), "drive1");
        assert_eq!(config.generate_alias("mdRaid"), "mdRaid0");
    }

    #[test]
    fn test_find() {
        let config = Config::from_yaml(indoc! {r#"
            drives:
              - alias: disk1
              - alias: disk2
                partitions:
                  - alias: p1
            mdRaids:
              - alias: md0
                partitions:
                  - alias: p2
        "#})
        .unwrap();
        assert_eq!(config.find_drive("disk2"), Some(1));
        assert_eq!(config.find_drive("md0"), None);
        assert_eq!(config.find_drive_with_partition("p1"), Some(1));
        assert_eq!(config.find_md_raid("md0"), Some(0));
        assert_eq!(config.find_md_raid_with_partition("p2"), Some(0));
        assert_eq!(config.find_md_raid_with_partition("p1"), None);
        assert!(config.has_alias("p2"));
        assert!(!config.has_alias("p3"));
    }
}
