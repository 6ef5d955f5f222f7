//! Zip-backed implementation of [`PackageStore`].
//!
//! Game clients ship their GUI assets split across zip-compatible package
//! files in a single directory, e.g. `res/packages/gui-part1.pkg`,
//! `gui-part2.pkg`, ... The store scans that directory for entries matching a
//! name prefix and reads documents out of them, matching internal paths
//! case-insensitively (package tools are inconsistent about case).

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::host::PackageStore;

/// Directory the host's GUI packages conventionally live in, and their name
/// prefix.
pub const PACKAGES_ROOT: &str = "res/packages";
pub const PACKAGE_PREFIX: &str = "gui-part";

/// [`PackageStore`] over a directory of zip-compatible package archives.
#[derive(Debug, Clone)]
pub struct DirPackageStore {
    root: PathBuf,
    prefix: String,
}

impl DirPackageStore {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// The host's conventional package layout, relative to the working
    /// directory.
    pub fn conventional() -> Self {
        Self::new(PACKAGES_ROOT, PACKAGE_PREFIX)
    }
}

impl PackageStore for DirPackageStore {
    /// Package files under the root whose name starts with the prefix,
    /// sorted by name so the candidate order is stable across platforms.
    fn candidates(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!(
                    "package root {} not readable: {err}",
                    self.root.display()
                );
                return Vec::new();
            }
        };

        let mut out = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(&self.prefix) {
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                out.push(path);
            }
        }
        out.sort();
        out
    }

    fn read_entry(&self, archive: &Path, internal_path: &str) -> io::Result<Option<Vec<u8>>> {
        let file = match File::open(archive) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(io::Error::other)?;

        // Internal paths are matched case-insensitively, forward slashes only.
        let wanted = internal_path.replace('\\', "/").to_ascii_lowercase();
        let found = zip
            .file_names()
            .find(|name| name.to_ascii_lowercase() == wanted)
            .map(str::to_owned);
        let Some(name) = found else {
            return Ok(None);
        };

        let mut entry = zip.by_name(&name).map_err(io::Error::other)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        Ok(Some(buf))
    }
}
