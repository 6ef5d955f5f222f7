//! Folding mod fragments into the baseline table.
//!
//! Each accepted entry is appended at the next dense slot (the table's
//! population at the moment of insertion) and its symbolic id recorded in
//! the items mapping. Conflicts never overwrite: the first definition of an
//! id wins and later ones are logged and dropped. Per-fragment and per-entry
//! problems are recovered locally; the merge itself cannot fail.

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;

use crate::discover::{Format, Fragment, FragmentSource};
use crate::host::VirtualFs;
use crate::id::SlotId;
use crate::table::ResourceTable;

/// The mandatory identity field on every mod entry. Stripped before the
/// entry is stored in the table.
pub const ITEM_ID_KEY: &str = "itemID";

/// Top-level key holding the entry list in TOML fragments (TOML has no
/// top-level array).
pub const TOML_ITEMS_KEY: &str = "items";

/// Mod symbolic id to assigned slot, in assignment order.
pub type ItemsMapping = IndexMap<String, SlotId>;

/// Per-fragment failures. Logged and skipped by [`merge`]; they never abort
/// the merge of other fragments.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("failed to read fragment: {0}")]
    Read(#[from] std::io::Error),

    #[error("virtual filesystem entry is absent or unreadable")]
    VfsRead,

    #[error("fragment is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to parse fragment: {detail}")]
    Parse { detail: String },

    /// The document parsed but is not a list of entries (and not one of the
    /// tolerated empty shapes).
    #[error("fragment document is not a list of entries")]
    NotEntryList,
}

/// Result of a merge: the combined table and the symbolic-id mapping.
#[derive(Debug)]
pub struct MergeResult {
    pub table: ResourceTable,
    pub items: ItemsMapping,
}

/// Fold every fragment's entries into the baseline, in discovery order.
pub fn merge(baseline: ResourceTable, fragments: &[Fragment], vfs: &dyn VirtualFs) -> MergeResult {
    let mut table = baseline;
    let mut items = ItemsMapping::new();

    for fragment in fragments {
        match load_fragment_entries(fragment, vfs) {
            Ok(entries) => fold_entries(fragment, entries, &mut table, &mut items),
            Err(err) => {
                log::error!("skipping fragment {}: {err}", fragment.source);
            }
        }
    }

    MergeResult { table, items }
}

/// Read and parse one fragment into its entry list. Content that parses to
/// an empty/absent value is tolerated as "no entries".
fn load_fragment_entries(
    fragment: &Fragment,
    vfs: &dyn VirtualFs,
) -> Result<Vec<Value>, FragmentError> {
    let bytes = match &fragment.source {
        FragmentSource::Disk(path) => fs::read(path)?,
        FragmentSource::Virtual(path) => vfs.read(path).ok_or(FragmentError::VfsRead)?,
    };
    let text = String::from_utf8(bytes)?;

    let doc: Value = match fragment.format {
        Format::Json => serde_json::from_str(&text).map_err(|err| FragmentError::Parse {
            detail: err.to_string(),
        })?,
        Format::Ron => ron::from_str(&text).map_err(|err| FragmentError::Parse {
            detail: err.to_string(),
        })?,
        Format::Toml => {
            let doc: Value = toml::from_str(&text).map_err(|err| FragmentError::Parse {
                detail: err.to_string(),
            })?;
            match doc {
                Value::Object(mut map) => map.remove(TOML_ITEMS_KEY).unwrap_or(Value::Null),
                other => other,
            }
        }
    };

    if is_falsy(&doc) {
        return Ok(Vec::new());
    }
    match doc {
        Value::Array(entries) => Ok(entries),
        _ => Err(FragmentError::NotEntryList),
    }
}

/// Whether a parsed document counts as "nothing to merge". Kept permissive:
/// null, `[]`, `{}`, `""`, `false` and `0` are all silent no-ops.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
    }
}

/// Fold one fragment's entries into the table. Invalid entries are logged
/// and dropped without consuming a slot.
fn fold_entries(
    fragment: &Fragment,
    entries: Vec<Value>,
    table: &mut ResourceTable,
    items: &mut ItemsMapping,
) {
    for entry in entries {
        let Value::Object(mut fields) = entry else {
            log::error!("entry in {} is not an object, skipping", fragment.source);
            continue;
        };
        let Some(id_value) = fields.remove(ITEM_ID_KEY) else {
            log::error!(
                "entry in {} is missing the mandatory {ITEM_ID_KEY} field, skipping",
                fragment.source
            );
            continue;
        };
        let Value::String(item_id) = id_value else {
            log::error!(
                "entry in {} has a non-string {ITEM_ID_KEY}, skipping",
                fragment.source
            );
            continue;
        };
        if items.contains_key(&item_id) {
            log::error!("item '{item_id}' is already mapped, skipping later definition");
            continue;
        }

        let slot = table.next_slot();
        items.insert(item_id, slot);
        table.insert(slot, Value::Object(fields));
    }
}
