//! End-to-end pipeline tests against real zip packages and a real
//! filesystem fragment directory: the production collaborators, not the
//! in-memory doubles.

use resmap_core::archive::DirPackageStore;
use resmap_core::manager::{InitStatus, ManagerConfig, ResMapManager};
use resmap_core::test_utils::{cleanup, make_test_dir, CountingRestart, MemoryVfs};
use resmap_core::{ModSlot, SlotId};
use std::fs;
use std::path::Path;

/// Lay out a complete fake client installation under `dir`: GUI packages
/// with a baseline document (carrying the shipped trailing-comma defect),
/// and a fragment directory.
fn install_client(dir: &Path, baseline: &str) -> (ManagerConfig, DirPackageStore) {
    let packages = dir.join("res/packages");
    resmap_core::test_utils::write_zip_package(
        &packages.join("gui-part1.pkg"),
        &[("audio/unrelated.json", "{}")],
    );
    resmap_core::test_utils::write_zip_package(
        &packages.join("gui-part2.pkg"),
        &[("GUI/Unbound/res_map.json", baseline)],
    );

    let config = ManagerConfig {
        configs_dir: dir.join("mods/configs/res_map"),
        vfs_configs_dir: "mods/configs/res_map".to_string(),
        table_path: dir.join("res_mods/gui/unbound/res_map.json"),
        sentinel_path: dir.join("res_map_restart"),
        baseline_internal_path: "gui/unbound/res_map.json".to_string(),
    };
    fs::create_dir_all(&config.configs_dir).unwrap();
    let store = DirPackageStore::new(packages, "gui-part");
    (config, store)
}

#[test]
fn baseline_plus_one_fragment_produces_the_documented_table() {
    let dir = make_test_dir("e2e_documented");
    let (config, store) = install_client(&dir, r#"{"a":{"name":"x"},}"#);
    fs::write(
        config.configs_dir.join("buttons.json"),
        r#"[{"itemID":"mod.button","icon":"b.png"}]"#,
    )
    .unwrap();
    let restart = CountingRestart::new();

    let manager = ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);

    // Baseline key "a" is slot 0xa; the table population is 1, so the mod
    // entry lands at slot 1 and sorts before the baseline entry.
    assert_eq!(
        fs::read_to_string(&config.table_path).unwrap(),
        r#"{"1":{"icon":"b.png"},"a":{"name":"x"}}"#
    );
    let map = manager.map();
    assert_eq!(map.slot_for("mod.button"), SlotId(1));
    assert_eq!(map.slot_for("missing"), SlotId::INVALID);
    assert_eq!(restart.count(), 1);

    cleanup(&dir);
}

#[test]
fn persisted_bytes_are_identical_across_runs() {
    let dir = make_test_dir("e2e_identical");
    let (config, store) = install_client(
        &dir,
        r#"{"0":{"name":"hangar"},"1":{"name":"garage"},}"#,
    );
    fs::write(
        config.configs_dir.join("pack.json"),
        r#"[{"itemID":"mod.a","label":"Ä"},{"itemID":"mod.b"}]"#,
    )
    .unwrap();
    let restart = CountingRestart::new();

    ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);
    let first = fs::read(&config.table_path).unwrap();

    let second_run = ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);
    let second = fs::read(&config.table_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(second_run.status(), InitStatus::Validated);
    // Non-ASCII survives un-escaped in the persisted form.
    assert!(String::from_utf8(second).unwrap().contains("Ä"));

    cleanup(&dir);
}

#[test]
fn filesystem_fragment_shadows_packed_one() {
    let dir = make_test_dir("e2e_precedence");
    let (config, store) = install_client(&dir, r#"{"0":{"name":"hangar"}}"#);
    fs::write(
        config.configs_dir.join("Theme.json"),
        r#"[{"itemID":"mod.theme","source":"disk"}]"#,
    )
    .unwrap();

    let mut vfs = MemoryVfs::new();
    // Same file shipped packed: must lose to the loose install.
    vfs.add_file(
        "mods/configs/res_map/theme.json",
        br#"[{"itemID":"mod.theme","source":"packed"},{"itemID":"mod.extra","source":"packed"}]"#,
    );
    // A genuinely packed-only fragment still participates.
    vfs.add_file(
        "mods/configs/res_map/zz_packed.json",
        br#"[{"itemID":"mod.packed_only"}]"#,
    );

    let restart = CountingRestart::new();
    let manager = ResMapManager::initialize(&config, &store, &vfs, &restart);
    let map = manager.map();

    assert_eq!(map.slot_for("mod.theme"), SlotId(1));
    assert_eq!(map.slot_for("mod.packed_only"), SlotId(2));
    // The shadowed packed copy was never processed at all, so its second
    // entry is absent too.
    assert_eq!(map.slot_for("mod.extra"), SlotId::INVALID);

    let table = fs::read_to_string(&config.table_path).unwrap();
    assert!(table.contains(r#""source":"disk""#));
    assert!(!table.contains("packed"));

    cleanup(&dir);
}

#[test]
fn substring_scan_reflects_assignment_order() {
    let dir = make_test_dir("e2e_masks");
    let (config, store) = install_client(&dir, r#"{"0":{"name":"hangar"}}"#);
    fs::write(
        config.configs_dir.join("a.json"),
        r#"[{"itemID":"ui.panel.main"},{"itemID":"audio.click"},{"itemID":"ui.panel.side"}]"#,
    )
    .unwrap();

    let restart = CountingRestart::new();
    let manager = ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);
    let map = manager.map();

    assert_eq!(
        map.slots_matching("ui.panel"),
        vec![
            ("ui.panel.main".to_string(), SlotId(1)),
            ("ui.panel.side".to_string(), SlotId(3)),
        ]
    );

    cleanup(&dir);
}

#[test]
fn deferred_accessors_resolve_once_validation_completes() {
    let dir = make_test_dir("e2e_deferred");
    let (config, store) = install_client(&dir, r#"{"0":{"name":"hangar"}}"#);
    fs::write(
        config.configs_dir.join("a.json"),
        r#"[{"itemID":"mod.button"}]"#,
    )
    .unwrap();
    let restart = CountingRestart::new();

    // First run writes and asks for a restart; not validated yet.
    let first = ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);
    assert_eq!(first.status(), InitStatus::RestartPending);
    let early = ModSlot::new(&first.map(), "mod.button");
    assert_eq!(early.get(), SlotId::INVALID);

    // Second run validates; accessors created before and after both resolve.
    let second = ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);
    assert_eq!(second.status(), InitStatus::Validated);
    let late = ModSlot::new(&second.map(), "mod.button");
    assert_eq!(late.get(), SlotId(1));

    cleanup(&dir);
}

#[test]
fn broken_fragment_does_not_poison_the_rest() {
    let dir = make_test_dir("e2e_broken_fragment");
    let (config, store) = install_client(&dir, r#"{"0":{"name":"hangar"}}"#);
    fs::write(config.configs_dir.join("a_broken.json"), "{ nope").unwrap();
    fs::write(
        config.configs_dir.join("b_good.json"),
        r#"[{"itemID":"mod.survivor"}]"#,
    )
    .unwrap();

    let restart = CountingRestart::new();
    let manager = ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);

    assert_eq!(manager.status(), InitStatus::RestartPending);
    assert_eq!(manager.map().slot_for("mod.survivor"), SlotId(1));

    cleanup(&dir);
}

#[test]
fn mixed_formats_merge_in_name_order() {
    let dir = make_test_dir("e2e_mixed_formats");
    let (config, store) = install_client(&dir, r#"{"0":{"name":"hangar"}}"#);
    fs::write(
        config.configs_dir.join("a.toml"),
        "[[items]]\nitemID = \"mod.from_toml\"\n",
    )
    .unwrap();
    fs::write(
        config.configs_dir.join("b.ron"),
        r#"[{"itemID": "mod.from_ron"}]"#,
    )
    .unwrap();
    fs::write(
        config.configs_dir.join("c.json"),
        r#"[{"itemID":"mod.from_json"}]"#,
    )
    .unwrap();

    let restart = CountingRestart::new();
    let manager = ResMapManager::initialize(&config, &store, &MemoryVfs::new(), &restart);
    let map = manager.map();

    assert_eq!(map.slot_for("mod.from_toml"), SlotId(1));
    assert_eq!(map.slot_for("mod.from_ron"), SlotId(2));
    assert_eq!(map.slot_for("mod.from_json"), SlotId(3));

    cleanup(&dir);
}
