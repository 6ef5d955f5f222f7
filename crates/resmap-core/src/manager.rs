//! The composition root: wires discovery, baseline loading, merging and
//! reconciliation into one synchronous initialization pass.
//!
//! The manager is an explicitly constructed instance; the embedding host
//! owns it and injects its collaborators, so tests (and multiple isolated
//! hosts) can run side by side. Initialization runs to completion before any
//! lookup is served; nothing here suspends or spawns.

use std::fs;
use std::path::{Path, PathBuf};

use crate::baseline::load_baseline;
use crate::discover::discover_fragments;
use crate::facade::ResMap;
use crate::host::{PackageStore, RestartHost, VirtualFs};
use crate::merge::{merge, MergeResult};
use crate::reconcile::{reconcile, revert_to_baseline, ReconcileOutcome};

/// Internal package path of the baseline table, and the relative path the
/// merged table is persisted to under the mods root.
pub const RES_MAP_FILE_PATH: &str = "gui/unbound/res_map.json";

/// Directory holding mod fragments, mirrored on the real filesystem and in
/// the virtual overlay.
pub const MOD_CONFIGS_PATH: &str = "mods/configs/res_map";

/// Restart sentinel, relative to the process working directory.
pub const RESTART_FLAG_FILE: &str = "res_map_restart";

/// All the paths one manager instance operates on.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Real-filesystem fragment directory.
    pub configs_dir: PathBuf,
    /// The same directory in the virtual overlay.
    pub vfs_configs_dir: String,
    /// Where the merged table is persisted.
    pub table_path: PathBuf,
    /// Restart sentinel location.
    pub sentinel_path: PathBuf,
    /// Path of the baseline document inside a candidate package.
    pub baseline_internal_path: String,
}

impl ManagerConfig {
    /// The host's conventional layout, rooted at the given mods directory.
    pub fn for_mods_root(mods_root: &Path) -> Self {
        Self {
            configs_dir: PathBuf::from(MOD_CONFIGS_PATH),
            vfs_configs_dir: MOD_CONFIGS_PATH.to_string(),
            table_path: mods_root.join(RES_MAP_FILE_PATH),
            sentinel_path: PathBuf::from(RESTART_FLAG_FILE),
            baseline_internal_path: RES_MAP_FILE_PATH.to_string(),
        }
    }
}

/// First existing directory among host-provided mods-root candidates.
pub fn pick_mods_root(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_dir())
}

/// What initialization concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// Table merged and reconciled; lookups are live and ready callbacks
    /// have fired.
    Validated,
    /// No fragments anywhere and nothing previously persisted; the subsystem
    /// stays dormant.
    NoMods,
    /// The persisted state changed; the host was asked to restart (or a
    /// request was already outstanding from the revert path).
    RestartPending,
    /// Baseline load or persistence failed; lookups return the invalid
    /// sentinel for the rest of the process.
    Failed,
}

/// Owns the façade and remembers how initialization went.
pub struct ResMapManager {
    map: ResMap,
    status: InitStatus,
}

impl ResMapManager {
    /// Run the full pipeline: discover → (revert | load baseline → merge →
    /// reconcile) → validate.
    pub fn initialize(
        config: &ManagerConfig,
        store: &dyn PackageStore,
        vfs: &dyn VirtualFs,
        restart: &dyn RestartHost,
    ) -> Self {
        let map = ResMap::new();
        let status = run_pipeline(config, store, vfs, restart, &map);

        if status == InitStatus::Validated {
            map.mark_validated();
            clear_sentinel(&config.sentinel_path);
        }

        Self { map, status }
    }

    /// A handle to the lookup façade. Cheap to clone and hand out.
    pub fn map(&self) -> ResMap {
        self.map.clone()
    }

    pub fn status(&self) -> InitStatus {
        self.status
    }

    pub fn is_validated(&self) -> bool {
        self.status == InitStatus::Validated
    }
}

fn run_pipeline(
    config: &ManagerConfig,
    store: &dyn PackageStore,
    vfs: &dyn VirtualFs,
    restart: &dyn RestartHost,
    map: &ResMap,
) -> InitStatus {
    let fragments = discover_fragments(&config.configs_dir, vfs, &config.vfs_configs_dir);

    if fragments.is_empty() {
        if config.table_path.is_file() {
            // Mods were removed since the last run; drop the persisted table
            // without running the merge path at all.
            return match revert_to_baseline(&config.table_path, &config.sentinel_path, restart) {
                Ok(ReconcileOutcome::Unchanged) => InitStatus::NoMods,
                Ok(_) => InitStatus::RestartPending,
                Err(err) => {
                    log::error!("failed to revert resource table: {err}");
                    InitStatus::Failed
                }
            };
        }
        log::info!("no mod resource fragments found");
        return InitStatus::NoMods;
    }
    log::debug!("discovered {} mod resource fragments", fragments.len());

    let baseline = match load_baseline(store, &config.baseline_internal_path) {
        Ok(table) => table,
        Err(err) => {
            log::error!("cannot load baseline resource table: {err}");
            return InitStatus::Failed;
        }
    };

    let MergeResult { table, items } = merge(baseline, &fragments, vfs);
    log::info!("merged {} mod entries into the resource table", items.len());
    map.publish_items(items);

    match reconcile(&table, &config.table_path, &config.sentinel_path, restart) {
        Ok(ReconcileOutcome::WrittenAndRestartRequested) => InitStatus::RestartPending,
        Ok(_) => InitStatus::Validated,
        Err(err) => {
            log::error!("failed to persist resource table: {err}");
            InitStatus::Failed
        }
    }
}

/// Remove the restart sentinel after a run validates; the pending episode is
/// over. Removal failure is only worth a warning.
fn clear_sentinel(path: &Path) {
    if path.is_file()
        && let Err(err) = fs::remove_file(path)
    {
        log::warn!("cannot remove restart flag {}: {err}", path.display());
    }
}
