use serde::{Deserialize, Serialize};

/// Numeric handle for an entry in the resource table. Cheap to copy and
/// compare. The host addresses resources by this value; the on-disk table
/// keys are its hexadecimal encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u64);

impl SlotId {
    /// Sentinel returned by lookups for unknown ids. Never a real slot.
    pub const INVALID: SlotId = SlotId(u64::MAX);

    /// Whether this is a real slot rather than the invalid sentinel.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    /// Parse a table key: lowercase or uppercase hex digits, no `0x` prefix.
    pub fn from_hex_key(key: &str) -> Option<SlotId> {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(key, 16).ok().map(SlotId)
    }

    /// Encode as a table key: lowercase hex, no prefix, no padding.
    pub fn hex_key(self) -> String {
        format!("{:x}", self.0)
    }
}
