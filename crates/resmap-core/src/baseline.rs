//! Baseline resource table loading.
//!
//! The baseline is the ground-truth table the host ships inside its GUI
//! packages. The first candidate archive containing the document wins;
//! later candidates are never consulted. Shipped documents carry a known
//! cosmetic defect (a trailing comma before a closing brace) that is
//! repaired textually before parsing.

use crate::host::PackageStore;
use crate::table::{ResourceTable, TableError};

/// Errors fatal to baseline loading (and therefore to initialization).
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    /// No candidate package contains the baseline document.
    #[error("no candidate package contains '{internal_path}'")]
    NotFound { internal_path: String },

    /// The document's bytes are not UTF-8.
    #[error("baseline document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The repaired document failed to decode as a resource table.
    #[error("failed to parse baseline document: {0}")]
    Parse(#[from] TableError),
}

/// Remove the known trailing-comma defect: every `,}` becomes `}`. The
/// defect only ever occurs immediately before a closing object brace, so the
/// blanket replacement is safe on this document class. Applied exactly once,
/// before the general-purpose parse.
pub fn repair_trailing_commas(text: &str) -> String {
    text.replace(",}", "}")
}

/// Locate and decode the baseline table.
pub fn load_baseline(
    store: &dyn PackageStore,
    internal_path: &str,
) -> Result<ResourceTable, BaselineError> {
    let candidates = store.candidates();

    let mut data = None;
    for candidate in &candidates {
        match store.read_entry(candidate, internal_path) {
            Ok(Some(bytes)) => {
                log::debug!(
                    "baseline '{internal_path}' found in {}",
                    candidate.display()
                );
                data = Some(bytes);
                break;
            }
            Ok(None) => continue,
            Err(err) => {
                log::warn!("skipping unreadable package {}: {err}", candidate.display());
                continue;
            }
        }
    }

    let Some(bytes) = data else {
        log::error!(
            "cannot find '{internal_path}' in any of {} candidate packages",
            candidates.len()
        );
        return Err(BaselineError::NotFound {
            internal_path: internal_path.to_string(),
        });
    };

    let text = String::from_utf8(bytes)?;
    let repaired = repair_trailing_commas(&text);
    Ok(ResourceTable::from_json_str(&repaired)?)
}
