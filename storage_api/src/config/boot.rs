use serde::{Deserialize, Serialize};

use crate::is_default;

/// Bootloader configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Boot {
    /// Whether the partitions needed for booting should be configured.
    #[serde(default = "default_true")]
    pub configure: bool,

    #[serde(default, skip_serializing_if = "is_default")]
    pub device: BootDevice,
}

impl Default for Boot {
    fn default() -> Self {
        Self {
            configure: true,
            device: BootDevice::default(),
        }
    }
}

/// Device that hosts the bootloader.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BootDevice {
    /// Whether the device is inferred from the location of the root
    /// filesystem. Set to false when the user picks the device explicitly.
    #[serde(default = "default_true")]
    pub default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_alias: Option<String>,
}

impl Default for BootDevice {
    fn default() -> Self {
        Self {
            default: true,
            device_alias: None,
        }
    }
}

impl Boot {
    /// Whether the boot device still has to be inferred.
    pub fn needs_default_device(&self) -> bool {
        self.configure && self.device.default && self.device.device_alias.is_none()
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn test_defaults() {
        let boot: Boot = serde_yaml::from_str("{}").unwrap();
        assert_eq!(boot, Boot::default());
        assert!(boot.needs_default_device());

        let boot: Boot = serde_yaml::from_str(indoc! {r#"
            configure: true
            device:
              default: false
              deviceAlias: disk1
        "#})
        .unwrap();
        assert!(!boot.device.default);
        assert!(!boot.needs_default_device());

        let boot: Boot = serde_yaml::from_str("configure: false").unwrap();
        assert!(!boot.needs_default_device());
    }
}
