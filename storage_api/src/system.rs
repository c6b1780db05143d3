//! Description of the block devices present on the system.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{primitives::bytes::ByteCount, DeviceName};

/// Kind of a device in the system inventory.
#[derive(
    Serialize,
    Deserialize,
    Copy,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceKind {
    /// Whole disk.
    Disk,

    /// Partition of a disk or of a RAID.
    Partition,

    /// Software RAID (MD) array.
    MdRaid,

    /// LVM volume group.
    LvmVg,
}

/// A device of the system as seen by the solver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Device {
    /// Kernel name of the device, e.g. `/dev/vda`. Unique within an inventory.
    pub name: DeviceName,

    pub kind: DeviceKind,

    pub size: ByteCount,

    /// Partition number. Only meaningful for partitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,

    /// Names of the partitions of this device, in table order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<DeviceName>,

    /// Names of the member devices of a RAID.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<DeviceName>,

    /// Names of the physical volumes of a volume group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub physical_volumes: Vec<DeviceName>,
}

impl Device {
    pub fn new(name: impl Into<DeviceName>, kind: DeviceKind, size: ByteCount) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            number: None,
            partitions: Vec::new(),
            members: Vec::new(),
            physical_volumes: Vec::new(),
        }
    }

    pub fn disk(name: impl Into<DeviceName>, size: ByteCount) -> Self {
        Self::new(name, DeviceKind::Disk, size)
    }

    pub fn partition(name: impl Into<DeviceName>, number: u32, size: ByteCount) -> Self {
        Self {
            number: Some(number),
            ..Self::new(name, DeviceKind::Partition, size)
        }
    }

    pub fn md_raid(name: impl Into<DeviceName>, size: ByteCount) -> Self {
        Self::new(name, DeviceKind::MdRaid, size)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use indoc::indoc;

    use super::*;

    #[test]
    fn test_device_kind_strings() {
        assert_eq!(DeviceKind::MdRaid.to_string(), "md-raid");
        assert_eq!(DeviceKind::from_str("lvm-vg").unwrap(), DeviceKind::LvmVg);
        assert!(DeviceKind::from_str("floppy").is_err());
    }

    #[test]
    fn test_deserialize_device() {
        let device: Device = serde_yaml::from_str(indoc! {r#"
            name: /dev/vda1
            kind: partition
            size: 1 GiB
            number: 1
        "#})
        .unwrap();
        assert_eq!(
            device,
            Device::partition("/dev/vda1", 1, ByteCount::from_gib(1))
        );

        let err = serde_yaml::from_str::<Device>(indoc! {r#"
            name: /dev/vda
            kind: disk
            size: 1 GiB
            label: foo
        "#});
        assert!(err.is_err());
    }
}
