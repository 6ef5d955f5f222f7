//! Host collaborator seams.
//!
//! The merge pipeline never touches the host process directly; everything it
//! needs from the surrounding client is expressed as one of these traits.
//! Production implementations live in [`crate::archive`] (package reading) or
//! are supplied by the embedding host (virtual filesystem, restart). Test
//! doubles live in [`crate::test_utils`].

use std::io;
use std::path::{Path, PathBuf};

/// Source of the host's packaged assets: an ordered list of candidate
/// archives, and entry reads out of them.
pub trait PackageStore {
    /// Ordered candidate archives that may contain the baseline document.
    fn candidates(&self) -> Vec<PathBuf>;

    /// Read an entry from one archive. Internal paths match
    /// case-insensitively. `Ok(None)` means the archive exists but does not
    /// contain the entry (or the archive itself is absent).
    fn read_entry(&self, archive: &Path, internal_path: &str) -> io::Result<Option<Vec<u8>>>;
}

/// The host's virtual/packed filesystem overlay. Paths are `/`-separated and
/// relative to the overlay root; hosts typically expose them lowercased.
pub trait VirtualFs {
    fn is_file(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;

    /// Immediate child names of a directory. Empty when the path is not a
    /// readable directory.
    fn list_dir(&self, path: &str) -> Vec<String>;

    /// Contents of a file, or `None` when absent or unreadable.
    fn read(&self, path: &str) -> Option<Vec<u8>>;
}

/// The host's restart/reload primitive. Fire-and-forget; the host is assumed
/// to tear down or reload the process context at its own pace.
pub trait RestartHost {
    fn trigger_restart(&self);
}

/// A [`VirtualFs`] with no overlay at all. For hosts that only ship mod
/// fragments on the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyVfs;

impl VirtualFs for EmptyVfs {
    fn is_file(&self, _path: &str) -> bool {
        false
    }

    fn is_dir(&self, _path: &str) -> bool {
        false
    }

    fn list_dir(&self, _path: &str) -> Vec<String> {
        Vec::new()
    }

    fn read(&self, _path: &str) -> Option<Vec<u8>> {
        None
    }
}
