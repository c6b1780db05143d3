use indoc::{formatdoc, indoc};

use storage_api::config::Config;

use crate::{inventory::DeviceGraph, test_utils::init_logger};

use super::{boot::BootSolver, ConfigSolver};

fn solve_boot(config: &str) -> Config {
    solve_boot_with(&DeviceGraph::default(), config)
}

fn solve_boot_with(inventory: &DeviceGraph, config: &str) -> Config {
    init_logger();
    let mut config = Config::from_yaml(config).unwrap();
    BootSolver::new(inventory).solve(&mut config);
    config
}

fn boot_alias(config: &Config) -> Option<&str> {
    config.boot.device.device_alias.as_deref()
}

#[test]
fn test_root_partition_on_drive() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
            partitions:
              - filesystem:
                  path: /home
          - alias: disk2
            partitions:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), Some("disk2"));
}

#[test]
fn test_alias_synthesized() {
    let config = solve_boot(indoc! {r#"
        drives:
          - partitions:
              - filesystem:
                  path: /
        "#});
    assert_eq!(config.drives[0].alias.as_deref(), Some("drive0"));
    assert_eq!(boot_alias(&config), Some("drive0"));

    let config = solve_boot(indoc! {r#"
        drives:
          - alias: drive0
          - partitions:
              - alias: drive1
                filesystem:
                  path: /
        "#});
    assert_eq!(config.drives[1].alias.as_deref(), Some("drive2"));
    assert_eq!(boot_alias(&config), Some("drive2"));
}

#[test]
fn test_not_inferred() {
    let root = indoc! {r#"
        drives:
          - alias: disk1
            partitions:
              - filesystem:
                  path: /
    "#};

    let config = solve_boot(&format!("boot:\n  configure: false\n{root}"));
    assert_eq!(boot_alias(&config), None);

    let config = solve_boot(&format!("boot:\n  device:\n    default: false\n{root}"));
    assert_eq!(boot_alias(&config), None);

    let config = solve_boot(&format!(
        "boot:\n  device:\n    deviceAlias: other\n{root}"
    ));
    assert_eq!(boot_alias(&config), Some("other"));
}

#[test]
fn test_no_root() {
    let config = solve_boot(indoc! {r#"
        drives:
          - partitions:
              - filesystem:
                  path: /home
        volumeGroups:
          - name: data
            physicalVolumes:
              - generate: [disk1]
            logicalVolumes:
              - filesystem:
                  path: /srv
        "#});
    assert_eq!(boot_alias(&config), None);
    assert_eq!(config.drives[0].alias, None);
}

#[test]
fn test_formatted_drive() {
    let config = solve_boot(indoc! {r#"
        drives:
          - filesystem:
              path: /
          - partitions:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), None);
    assert!(config.drives.iter().all(|d| d.alias.is_none()));
}

#[test]
fn test_drive_root_before_md_raid_root() {
    let config = solve_boot(indoc! {r#"
        mdRaids:
          - alias: md0
            devices: [p1, p2]
            partitions:
              - filesystem:
                  path: /
        drives:
          - alias: disk1
            partitions:
              - alias: p1
          - alias: disk2
            partitions:
              - alias: p2
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), Some("disk2"));
}

#[test]
fn test_md_raid_of_whole_disks() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
          - alias: disk2
        mdRaids:
          - devices: [disk1, disk2]
            partitions:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), None);
}

#[test]
fn test_md_raid_of_partitions() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
          - partitions:
              - alias: p2
        mdRaids:
          - devices: [disk1, p2]
            partitions:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), Some("drive0"));
    assert_eq!(config.drives[1].alias.as_deref(), Some("drive0"));
}

#[test]
fn test_formatted_md_raid() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
            partitions:
              - alias: p1
        mdRaids:
          - devices: [missing, p1]
            filesystem:
              path: /
        "#});
    assert_eq!(boot_alias(&config), Some("disk1"));
}

#[test]
fn test_nested_md_raids() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
            partitions:
              - alias: p1
        mdRaids:
          - alias: md0
            devices: [md1]
            partitions:
              - filesystem:
                  path: /
          - alias: md1
            devices: [md0, p1]
        "#});
    assert_eq!(boot_alias(&config), Some("disk1"));
}

#[test]
fn test_found_md_raid() {
    init_logger();
    let inventory = DeviceGraph::from_yaml(indoc! {r#"
        disks:
          - name: /dev/vda
            size: 10 GiB
          - name: /dev/vdb
            size: 10 GiB
        mdRaids:
          - name: /dev/md0
            size: 10 GiB
            members: [/dev/vda, /dev/vdb]
          - name: /dev/md1
            size: 10 GiB
        nonCandidates: [/dev/md1]
    "#})
    .unwrap();

    let raid_config = |name: &str| {
        formatdoc! {r#"
            drives:
              - alias: disk1
                partitions:
                  - alias: p1
            mdRaids:
              - search: {}
                devices: [p1]
                partitions:
                  - filesystem:
                      path: /
            "#,
            name
        }
    };

    let mut config = Config::from_yaml(&raid_config("/dev/md0")).unwrap();
    ConfigSolver::new(&inventory).solve(&mut config);
    assert_eq!(config.md_raids[0].alias.as_deref(), Some("mdRaid0"));
    assert_eq!(boot_alias(&config), Some("mdRaid0"));

    // A reused RAID that is not a candidate cannot hold the boot partitions
    let mut config = Config::from_yaml(&raid_config("/dev/md1")).unwrap();
    ConfigSolver::new(&inventory).solve(&mut config);
    assert_eq!(boot_alias(&config), None);

    // A reused RAID that does not exist leaves the boot device undetermined
    let mut config = Config::from_yaml(&raid_config("/dev/md9")).unwrap();
    ConfigSolver::new(&inventory).solve(&mut config);
    assert_eq!(boot_alias(&config), None);
    assert_eq!(config.md_raids[0].alias, None);

    // A RAID to create when not found is handled like any new RAID
    let mut config = Config::from_yaml(&raid_config(
        "{ condition: { name: /dev/md9 }, ifNotFound: create }",
    ))
    .unwrap();
    ConfigSolver::new(&inventory).solve(&mut config);
    assert_eq!(boot_alias(&config), Some("disk1"));
}

#[test]
fn test_root_on_missing_drive() {
    init_logger();
    let inventory = DeviceGraph::from_yaml(indoc! {r#"
        disks:
          - name: /dev/vda
            size: 10 GiB
    "#})
    .unwrap();
    let mut config = Config::from_yaml(indoc! {r#"
        drives:
          - search: /dev/vdz
            partitions:
              - filesystem:
                  path: /
    "#})
    .unwrap();

    ConfigSolver::new(&inventory).solve(&mut config);

    assert!(config.drives[0].is_missing());
    assert_eq!(boot_alias(&config), None);
    assert_eq!(config.drives[0].alias, None);
}

#[test]
fn test_md_raid_member_on_missing_drive() {
    init_logger();
    let inventory = DeviceGraph::from_yaml(indoc! {r#"
        disks:
          - name: /dev/vda
            size: 10 GiB
    "#})
    .unwrap();
    let config_yaml = indoc! {r#"
        drives:
          - alias: missing
            search: /dev/vdz
            partitions:
              - alias: p1
          - alias: present
            search: /dev/vda
            partitions:
              - alias: p2
        mdRaids:
          - alias: md0
            level: raid1
            devices: [p1, p2]
            filesystem:
              path: /
    "#};

    let mut config = Config::from_yaml(config_yaml).unwrap();
    ConfigSolver::new(&inventory).solve(&mut config);
    assert_eq!(boot_alias(&config), Some("present"));

    // Physical volumes on a missing drive are skipped as well
    let mut config = Config::from_yaml(indoc! {r#"
        drives:
          - alias: missing
            search: /dev/vdz
            partitions:
              - alias: p1
        volumeGroups:
          - name: system
            physicalVolumes:
              - generate: [missing]
              - p1
            logicalVolumes:
              - filesystem:
                  path: /
    "#})
    .unwrap();
    ConfigSolver::new(&inventory).solve(&mut config);
    assert_eq!(boot_alias(&config), None);
}

#[test]
fn test_generated_physical_volumes() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: diskA
          - alias: diskB
        volumeGroups:
          - name: system
            physicalVolumes:
              - generate: [diskB, diskA]
            logicalVolumes:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), Some("diskB"));
}

#[test]
fn test_generated_physical_volumes_on_md_raid() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
          - alias: disk2
            partitions:
              - alias: p2
        mdRaids:
          - alias: md0
            devices: [disk1, p2]
        volumeGroups:
          - name: system
            physicalVolumes:
              - generate: [md0, disk1]
            logicalVolumes:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), Some("disk2"));
}

#[test]
fn test_flat_physical_volumes() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
          - alias: disk2
            partitions:
              - alias: pv2
          - alias: disk3
            partitions:
              - alias: pv3
        volumeGroups:
          - name: system
            physicalVolumes: [disk1, pv2, pv3]
            logicalVolumes:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), Some("disk2"));

    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
          - alias: disk2
        volumeGroups:
          - name: system
            physicalVolumes: [disk1, disk2, unknown]
            logicalVolumes:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), None);
}

#[test]
fn test_generated_targets_fall_back_to_physical_volumes() {
    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
          - alias: disk2
        mdRaids:
          - alias: md0
            devices: [disk1, disk2]
          - alias: md1
            partitions:
              - alias: md1p1
            devices: [pv]
        volumeGroups:
          - name: system
            physicalVolumes:
              - generate: [md0]
              - md1p1
            logicalVolumes:
              - filesystem:
                  path: /
          - name: other
            physicalVolumes: [pv]
        "#});

    // md1 is built on an unknown device
    assert_eq!(boot_alias(&config), None);

    let config = solve_boot(indoc! {r#"
        drives:
          - alias: disk1
          - alias: disk2
            partitions:
              - alias: p2
        mdRaids:
          - alias: md0
            devices: [disk1]
          - alias: md1
            partitions:
              - alias: md1p1
            devices: [p2]
        volumeGroups:
          - name: system
            physicalVolumes:
              - generate: [md0]
              - md1p1
            logicalVolumes:
              - filesystem:
                  path: /
        "#});
    assert_eq!(boot_alias(&config), Some("disk2"));
}

#[test]
fn test_config_solver_pipeline() {
    init_logger();
    let inventory = DeviceGraph::from_yaml(indoc! {r#"
        disks:
          - name: /dev/vda
            size: 50 GiB
          - name: /dev/vdb
            size: 100 GiB
    "#})
    .unwrap();
    let mut config = Config::from_yaml(indoc! {r#"
        drives:
          - search:
              sort: { size: desc }
              max: 1
            partitions:
              - filesystem:
                  path: /
          - {}
    "#})
    .unwrap();

    ConfigSolver::new(&inventory).solve(&mut config);

    assert_eq!(config.drives[0].search.device().unwrap(), "/dev/vdb");
    assert_eq!(config.drives[1].search.device().unwrap(), "/dev/vda");
    assert_eq!(boot_alias(&config), Some("drive0"));
    assert_eq!(config.drives[0].alias.as_deref(), Some("drive0"));
    assert_eq!(config.validate(), Ok(()));
}
