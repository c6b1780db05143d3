//! # Device graph builder
//!
//! Collects the devices of a system snapshot and builds a [`DeviceGraph`]
//! out of them. The build step checks that:
//! - Device names are unique.
//! - Partition, member and physical volume references point to existing
//!   devices of a suitable kind.
//! - Every partition has a number and belongs to a single parent.
//! - Devices flagged as unavailable or non-candidate exist.

use std::collections::{BTreeMap, BTreeSet};

use log::trace;

use storage_api::{
    system::{Device, DeviceKind},
    DeviceName,
};

use super::{error::InventoryError, DeviceGraph};

#[derive(Debug, Clone, Default)]
pub struct DeviceGraphBuilder {
    devices: Vec<Device>,
    unavailable: Vec<DeviceName>,
    non_candidates: Vec<DeviceName>,
}

impl DeviceGraphBuilder {
    pub fn add_device(&mut self, device: Device) -> &mut Self {
        self.devices.push(device);
        self
    }

    /// Flags a device as already in use, so no search can match it.
    pub fn mark_unavailable(&mut self, name: impl Into<DeviceName>) -> &mut Self {
        self.unavailable.push(name.into());
        self
    }

    /// Flags a device as not suitable for installing the system.
    pub fn mark_non_candidate(&mut self, name: impl Into<DeviceName>) -> &mut Self {
        self.non_candidates.push(name.into());
        self
    }

    pub fn build(self) -> Result<DeviceGraph, InventoryError> {
        let mut devices: BTreeMap<DeviceName, Device> = BTreeMap::new();
        for device in self.devices {
            if let Some(other) = devices.insert(device.name.clone(), device) {
                return Err(InventoryError::DuplicateDevice(other.name));
            }
        }

        Self::check_references(&devices)?;
        Self::check_partitions(&devices)?;

        let unavailable = Self::known_names(&devices, self.unavailable)?;
        let non_candidates = Self::known_names(&devices, self.non_candidates)?;

        trace!("Built device graph with {} device(s)", devices.len());
        Ok(DeviceGraph {
            devices,
            unavailable,
            non_candidates,
        })
    }

    fn check_references(devices: &BTreeMap<DeviceName, Device>) -> Result<(), InventoryError> {
        for device in devices.values() {
            let references = [
                (&device.partitions, &[DeviceKind::Partition][..]),
                (
                    &device.members,
                    &[DeviceKind::Disk, DeviceKind::Partition][..],
                ),
                (
                    &device.physical_volumes,
                    &[DeviceKind::Disk, DeviceKind::Partition, DeviceKind::MdRaid][..],
                ),
            ];

            for (targets, valid_kinds) in references {
                for target in targets {
                    let target_device = devices.get(target).ok_or_else(|| {
                        InventoryError::NonExistentReference {
                            device: device.name.clone(),
                            kind: device.kind,
                            target: target.clone(),
                        }
                    })?;

                    if !valid_kinds.contains(&target_device.kind) {
                        return Err(InventoryError::InvalidReferenceKind {
                            device: device.name.clone(),
                            kind: device.kind,
                            target: target.clone(),
                            target_kind: target_device.kind,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_partitions(devices: &BTreeMap<DeviceName, Device>) -> Result<(), InventoryError> {
        let mut parents: BTreeMap<&str, &str> = BTreeMap::new();
        for device in devices.values() {
            for partition in &device.partitions {
                if let Some(other) = parents.insert(partition, &device.name) {
                    return Err(InventoryError::SharedPartition {
                        partition: partition.clone(),
                        parent_1: other.to_owned(),
                        parent_2: device.name.clone(),
                    });
                }
            }
        }

        match devices
            .values()
            .find(|d| d.kind == DeviceKind::Partition && d.number.is_none())
        {
            Some(partition) => Err(InventoryError::MissingPartitionNumber(
                partition.name.clone(),
            )),
            None => Ok(()),
        }
    }

    fn known_names(
        devices: &BTreeMap<DeviceName, Device>,
        names: Vec<DeviceName>,
    ) -> Result<BTreeSet<DeviceName>, InventoryError> {
        names
            .into_iter()
            .map(|name| {
                if devices.contains_key(&name) {
                    Ok(name)
                } else {
                    Err(InventoryError::UnknownDeviceState(name))
                }
            })
            .collect()
    }
}
