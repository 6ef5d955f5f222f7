//! resmap -- merging a game client's resource-identifier table with mod
//! entries.
//!
//! The host ships a baseline table mapping hexadecimal slot keys to opaque
//! resource entries inside its GUI packages. Mods contribute fragment files
//! (JSON, RON or TOML) from a directory that exists both on the real
//! filesystem and in the host's packed/virtual overlay. At startup the
//! pipeline runs synchronously to completion:
//!
//! 1. **Discover** ([`discover`]) -- enumerate fragments from both sources,
//!    deduplicated case-insensitively (filesystem wins), in sorted order.
//! 2. **Load baseline** ([`baseline`]) -- first candidate package containing
//!    the document wins; a known trailing-comma defect is repaired first.
//! 3. **Merge** ([`merge`]) -- append each accepted entry at the next dense
//!    slot; first definition of a symbolic id wins; bad entries and bad
//!    fragments are logged and skipped, never fatal.
//! 4. **Reconcile** ([`reconcile`]) -- persist the canonical byte form only
//!    when it differs from the previous run, then request a host restart,
//!    guarded by a sentinel file against restart loops.
//! 5. **Resolve** ([`facade`]) -- O(1) symbolic-id lookups, substring scans,
//!    and a one-shot readiness latch for consumers that must wait for
//!    validation.
//!
//! [`manager::ResMapManager`] wires the steps together over the host
//! collaborator traits in [`host`]; [`archive::DirPackageStore`] is the
//! production zip-backed package reader.
//!
//! Everything is single-threaded and run-to-completion; see the module docs
//! for the per-step contracts.

pub mod archive;
pub mod baseline;
pub mod discover;
pub mod facade;
pub mod host;
pub mod id;
pub mod manager;
pub mod merge;
pub mod reconcile;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use facade::{ModSlot, ResMap};
pub use id::SlotId;
pub use manager::{InitStatus, ManagerConfig, ResMapManager};
