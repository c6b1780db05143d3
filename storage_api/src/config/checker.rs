use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::{partition::Partition, search::Search, Config, Partitionable};
use crate::error::ConfigIssue;

/// Finds the issues of a storage configuration.
pub struct ConfigChecker<'a> {
    config: &'a Config,
}

impl<'a> ConfigChecker<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// All issues, in declared order.
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.alias_issues());
        issues.extend(self.md_raid_issues());
        issues.extend(self.volume_group_issues());
        issues.extend(self.overused_alias_issues());
        issues.extend(self.search_issues());

        if !issues.is_empty() {
            debug!("Found {} issue(s) in the storage configuration", issues.len());
        }
        issues
    }

    fn alias_issues(&self) -> Vec<ConfigIssue> {
        let mut seen = BTreeSet::new();
        let mut reported = BTreeSet::new();
        self.config
            .aliases()
            .filter(|alias| !seen.insert(*alias) && reported.insert(*alias))
            .map(|alias| ConfigIssue::DuplicatedAlias(alias.to_owned()))
            .collect()
    }

    fn md_raid_issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (index, raid) in self.config.md_raids.iter().enumerate() {
            let label = raid
                .alias
                .clone()
                .or_else(|| raid.name.clone())
                .unwrap_or_else(|| format!("mdRaids[{index}]"));

            issues.extend(
                raid.devices
                    .iter()
                    .filter(|member| !self.config.has_alias(member))
                    .map(|member| ConfigIssue::MissingRaidMember {
                        raid: label.clone(),
                        member: member.clone(),
                    }),
            );

            if let Some(level) = raid.level.filter(|_| raid.is_new()) {
                if raid.devices.len() < level.min_devices() {
                    issues.push(ConfigIssue::WrongRaidMembers {
                        raid: label.clone(),
                        level,
                        count: raid.devices.len(),
                        required: level.min_devices(),
                    });
                }
            }
        }
        issues
    }

    fn volume_group_issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (index, vg) in self.config.volume_groups.iter().enumerate() {
            if vg.name.is_empty() {
                issues.push(ConfigIssue::VolumeGroupWithoutName(index));
            }

            for alias in vg.physical_volume_aliases() {
                if !self.config.has_alias(alias) {
                    issues.push(ConfigIssue::MissingPhysicalVolume {
                        volume_group: vg.name.clone(),
                        alias: alias.to_owned(),
                    });
                }
            }

            for alias in vg.target_device_aliases() {
                let known = self.config.find_drive(alias).is_some()
                    || self.config.find_md_raid(alias).is_some();
                if !known {
                    issues.push(ConfigIssue::MissingTargetDevice {
                        volume_group: vg.name.clone(),
                        alias: alias.to_owned(),
                    });
                }
            }
        }
        issues
    }

    /// A device can only be a member of one RAID or a physical volume of one
    /// volume group.
    fn overused_alias_issues(&self) -> Vec<ConfigIssue> {
        let raid_members = self
            .config
            .md_raids
            .iter()
            .flat_map(|r| r.devices.iter().map(String::as_str));
        let physical_volumes = self
            .config
            .volume_groups
            .iter()
            .flat_map(|vg| vg.physical_volume_aliases());

        let mut users: BTreeMap<&str, usize> = BTreeMap::new();
        let mut issues = Vec::new();
        for alias in raid_members.chain(physical_volumes) {
            let count = users.entry(alias).or_default();
            *count += 1;
            if *count == 2 {
                issues.push(ConfigIssue::OverusedAlias(alias.to_owned()));
            }
        }
        issues
    }

    fn search_issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut check = |search: Option<&Search>, label: String| {
            if search.is_some_and(Search::not_found_error) {
                issues.push(ConfigIssue::SearchNotFound(label));
            }
        };

        for (index, drive) in self.config.drives.iter().enumerate() {
            let label = drive
                .alias
                .clone()
                .unwrap_or_else(|| format!("drives[{index}]"));
            check(Some(&drive.search), label.clone());
            for (p_index, partition) in drive.partitions.iter().enumerate() {
                check(partition.search.as_ref(), partition_label(&label, p_index, partition));
            }
        }

        for (index, raid) in self.config.md_raids.iter().enumerate() {
            let label = raid
                .alias()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("mdRaids[{index}]"));
            check(raid.search.as_ref(), label.clone());
            for (p_index, partition) in raid.partitions.iter().enumerate() {
                check(partition.search.as_ref(), partition_label(&label, p_index, partition));
            }
        }
        issues
    }
}

fn partition_label(parent: &str, index: usize, partition: &Partition) -> String {
    partition
        .alias
        .clone()
        .unwrap_or_else(|| format!("{parent}.partitions[{index}]"))
}
