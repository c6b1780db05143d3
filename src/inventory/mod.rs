//! Read-only view of the devices of the system.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};

use storage_api::{
    primitives::bytes::ByteCount,
    system::{Device, DeviceKind},
    DeviceName,
};

pub mod builder;
pub mod error;

use self::{builder::DeviceGraphBuilder, error::InventoryError};

/// Devices the solvers can match against.
///
/// Implementations are snapshots: the solvers never modify them and expect
/// the same answers for the whole resolution pass.
pub trait StorageInventory {
    fn device(&self, name: &str) -> Option<&Device>;

    /// All devices of the given kind, ordered by name.
    fn devices_of_kind(&self, kind: DeviceKind) -> Vec<&Device>;

    /// Whether the device is free to be used, i.e. not mounted or otherwise
    /// claimed by the running system.
    fn is_available(&self, device: &Device) -> bool;

    /// Whether the device is suitable for installing the system.
    fn is_candidate(&self, device: &Device) -> bool;

    /// Devices of the given kind that are suitable for installing the system,
    /// ordered by name.
    fn candidate_devices(&self, kind: DeviceKind) -> Vec<&Device> {
        self.devices_of_kind(kind)
            .into_iter()
            .filter(|d| self.is_candidate(d))
            .collect()
    }

    /// Partitions of the device, in table order.
    fn partitions(&self, device: &Device) -> Vec<&Device> {
        device
            .partitions
            .iter()
            .filter_map(|name| self.device(name))
            .collect()
    }
}

/// In-memory snapshot of the devices of a system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceGraph {
    devices: BTreeMap<DeviceName, Device>,
    unavailable: BTreeSet<DeviceName>,
    non_candidates: BTreeSet<DeviceName>,
}

impl DeviceGraph {
    pub fn builder() -> DeviceGraphBuilder {
        DeviceGraphBuilder::default()
    }

    /// Builds a graph from a YAML description of the system.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let scenario: Scenario =
            serde_yaml::from_str(yaml).context("Failed to parse device graph")?;
        scenario
            .into_graph()
            .context("Failed to build device graph")
    }
}

impl StorageInventory for DeviceGraph {
    fn device(&self, name: &str) -> Option<&Device> {
        self.devices.get(name)
    }

    fn devices_of_kind(&self, kind: DeviceKind) -> Vec<&Device> {
        self.devices.values().filter(|d| d.kind == kind).collect()
    }

    fn is_available(&self, device: &Device) -> bool {
        !self.unavailable.contains(&device.name)
    }

    fn is_candidate(&self, device: &Device) -> bool {
        !self.non_candidates.contains(&device.name)
    }
}

/// YAML description of a system:
///
/// ```yaml
/// disks:
///   - name: /dev/vda
///     size: 50 GiB
///     partitions:
///       - name: /dev/vda1
///         number: 1
///         size: 1 GiB
/// mdRaids:
///   - name: /dev/md0
///     size: 20 GiB
///     members: [/dev/vdb, /dev/vdc]
/// volumeGroups:
///   - name: /dev/system
///     size: 10 GiB
///     physicalVolumes: [/dev/vda1]
/// unavailable: [/dev/vdc]
/// nonCandidates: [/dev/md0]
/// ```
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Scenario {
    #[serde(default)]
    disks: Vec<PartitionedEntry>,

    #[serde(default)]
    md_raids: Vec<PartitionedEntry>,

    #[serde(default)]
    volume_groups: Vec<VolumeGroupEntry>,

    #[serde(default)]
    unavailable: Vec<DeviceName>,

    #[serde(default)]
    non_candidates: Vec<DeviceName>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PartitionedEntry {
    name: DeviceName,
    size: ByteCount,
    #[serde(default)]
    members: Vec<DeviceName>,
    #[serde(default)]
    partitions: Vec<PartitionEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PartitionEntry {
    name: DeviceName,
    size: ByteCount,
    number: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct VolumeGroupEntry {
    name: DeviceName,
    size: ByteCount,
    #[serde(default)]
    physical_volumes: Vec<DeviceName>,
}

impl Scenario {
    fn into_graph(self) -> Result<DeviceGraph, InventoryError> {
        let mut builder = DeviceGraph::builder();

        let partitioned = self
            .disks
            .into_iter()
            .map(|entry| (DeviceKind::Disk, entry))
            .chain(self.md_raids.into_iter().map(|entry| (DeviceKind::MdRaid, entry)));
        for (kind, entry) in partitioned {
            let mut device = Device::new(entry.name, kind, entry.size);
            device.members = entry.members;
            for partition in entry.partitions {
                device.partitions.push(partition.name.clone());
                builder.add_device(Device {
                    number: partition.number,
                    ..Device::new(partition.name, DeviceKind::Partition, partition.size)
                });
            }
            builder.add_device(device);
        }

        for entry in self.volume_groups {
            let mut device = Device::new(entry.name, DeviceKind::LvmVg, entry.size);
            device.physical_volumes = entry.physical_volumes;
            builder.add_device(device);
        }

        for name in self.unavailable {
            builder.mark_unavailable(name);
        }
        for name in self.non_candidates {
            builder.mark_non_candidate(name);
        }

        builder.build()
    }
}
