//! The resource table: numeric slots to opaque metadata entries.
//!
//! The host ships the table as a JSON object keyed by hexadecimal slot
//! strings. Keys are decoded to numeric slots once at parse time and the
//! table is held in a `BTreeMap`, so ascending-numeric key order is a
//! property of the structure rather than a sort performed at serialization.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::id::SlotId;

/// Errors produced while decoding a table document.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The document parsed, but its top level is not an object.
    #[error("table document is not a JSON object")]
    NotAnObject,

    /// A top-level key is not a hexadecimal slot value.
    #[error("slot key '{key}' is not a hexadecimal value")]
    BadSlotKey { key: String },

    /// The document is not valid JSON at all.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Mapping from numeric slot to an opaque resource entry.
///
/// Entry values are host-defined and not interpreted beyond being JSON; the
/// table never inspects them after the identity key is stripped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTable {
    entries: BTreeMap<u64, Value>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a table document: a JSON object whose keys are hexadecimal
    /// slot strings.
    pub fn from_json_str(text: &str) -> Result<Self, TableError> {
        let doc: Value = serde_json::from_str(text)?;
        let Value::Object(map) = doc else {
            return Err(TableError::NotAnObject);
        };

        let mut entries = BTreeMap::new();
        for (key, value) in map {
            let Some(slot) = SlotId::from_hex_key(&key) else {
                return Err(TableError::BadSlotKey { key });
            };
            entries.insert(slot.0, value);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The slot the next inserted entry receives: dense append, one past the
    /// current population.
    pub fn next_slot(&self) -> SlotId {
        SlotId(self.entries.len() as u64)
    }

    pub fn get(&self, slot: SlotId) -> Option<&Value> {
        self.entries.get(&slot.0)
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.entries.contains_key(&slot.0)
    }

    /// Insert an entry at a slot. Returns the displaced entry if the slot was
    /// already occupied.
    pub fn insert(&mut self, slot: SlotId, entry: Value) -> Option<Value> {
        self.entries.insert(slot.0, entry)
    }

    /// Entries in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Value)> {
        self.entries.iter().map(|(slot, value)| (SlotId(*slot), value))
    }

    /// Canonical byte form: compact JSON, keys ascending by numeric slot
    /// value, entry fields in the encoder's stable order, non-ASCII
    /// preserved. Byte-identical for equal tables regardless of how they
    /// were built.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for ResourceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (slot, value) in &self.entries {
            map.serialize_entry(&SlotId(*slot).hex_key(), value)?;
        }
        map.end()
    }
}
