//! Mod fragment discovery.
//!
//! Fragments live in one directory that exists twice: once on the real
//! filesystem (loose mod installs) and once in the host's packed/virtual
//! overlay (mods shipped inside host packages). Both sides are enumerated;
//! a fragment present in both is processed once, and the filesystem copy
//! wins. Enumeration order is an explicit contract: file-name ascending
//! within each source, filesystem pass before the virtual pass.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::host::VirtualFs;

/// Supported fragment formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
    Toml,
}

impl Format {
    /// Detect the format of a fragment from its file name. `None` for
    /// unrecognized extensions; those files are not fragments.
    pub fn detect(name: &str) -> Option<Format> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "ron" => Some(Format::Ron),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

/// Where a fragment's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentSource {
    /// A regular file on the real filesystem.
    Disk(PathBuf),
    /// A path inside the host's virtual overlay, already lowercased.
    Virtual(String),
}

impl fmt::Display for FragmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentSource::Disk(path) => write!(f, "{}", path.display()),
            FragmentSource::Virtual(path) => write!(f, "vfs:{path}"),
        }
    }
}

/// A discovered mod fragment, ready to be read and merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub source: FragmentSource,
    pub format: Format,
}

/// Enumerate fragments from the real filesystem directory and the mirrored
/// virtual directory. Re-enumerates on every call; nothing is cached here.
pub fn discover_fragments(fs_dir: &Path, vfs: &dyn VirtualFs, vfs_dir: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    // Case-insensitive names already claimed by the filesystem pass.
    let mut seen = BTreeSet::new();

    let mut disk: Vec<(String, PathBuf, Format)> = Vec::new();
    match fs::read_dir(fs_dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let Some(name) = file_name.to_str() else {
                    continue;
                };
                let Some(format) = Format::detect(name) else {
                    continue;
                };
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                disk.push((name.to_owned(), path, format));
            }
        }
        Err(err) => {
            log::debug!("mod config directory {} not readable: {err}", fs_dir.display());
        }
    }
    disk.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, path, format) in disk {
        seen.insert(name.to_ascii_lowercase());
        fragments.push(Fragment {
            source: FragmentSource::Disk(path),
            format,
        });
    }

    if vfs.is_dir(vfs_dir) {
        let mut children = vfs.list_dir(vfs_dir);
        children.sort();
        for child in children {
            let lower = child.to_ascii_lowercase();
            let Some(format) = Format::detect(&lower) else {
                continue;
            };
            if seen.contains(&lower) {
                continue;
            }
            let path = format!("{vfs_dir}/{lower}");
            if !vfs.is_file(&path) {
                continue;
            }
            seen.insert(lower);
            fragments.push(Fragment {
                source: FragmentSource::Virtual(path),
                format,
            });
        }
    }

    fragments
}
