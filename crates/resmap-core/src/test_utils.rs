//! Shared helpers for resmap tests: disposable directories, zip package
//! fixtures, and in-memory host collaborators.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::host::{PackageStore, RestartHost, VirtualFs};

/// Create a temporary directory with a unique name for test isolation.
pub fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("resmap_test_{suffix}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Clean up a test directory.
pub fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

/// Write a zip package containing the given `(internal_path, content)`
/// entries.
pub fn write_zip_package(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// In-memory [`PackageStore`]: named packages holding named entries, no zip
/// bytes involved. Candidate order is insertion order.
#[derive(Debug, Default)]
pub struct MemoryPackages {
    packages: Vec<(PathBuf, HashMap<String, Vec<u8>>)>,
}

impl MemoryPackages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, name: &str, entries: &[(&str, &str)]) {
        let entries = entries
            .iter()
            .map(|(path, content)| (path.to_ascii_lowercase(), content.as_bytes().to_vec()))
            .collect();
        self.packages.push((PathBuf::from(name), entries));
    }
}

impl PackageStore for MemoryPackages {
    fn candidates(&self) -> Vec<PathBuf> {
        self.packages.iter().map(|(path, _)| path.clone()).collect()
    }

    fn read_entry(&self, archive: &Path, internal_path: &str) -> io::Result<Option<Vec<u8>>> {
        let wanted = internal_path.replace('\\', "/").to_ascii_lowercase();
        Ok(self
            .packages
            .iter()
            .find(|(path, _)| path == archive)
            .and_then(|(_, entries)| entries.get(&wanted))
            .cloned())
    }
}

/// In-memory [`VirtualFs`]. Paths are stored lowercased, matching hosts that
/// expose their overlay case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryVfs {
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: &str, content: &[u8]) {
        let path = path.to_ascii_lowercase();
        self.add_parent_dirs(&path);
        self.files.insert(path, content.to_vec());
    }

    pub fn add_dir(&mut self, path: &str) {
        let path = path.to_ascii_lowercase();
        self.add_parent_dirs(&path);
        self.dirs.insert(path);
    }

    fn add_parent_dirs(&mut self, path: &str) {
        let mut current = path;
        while let Some(pos) = current.rfind('/') {
            current = &current[..pos];
            self.dirs.insert(current.to_string());
        }
    }
}

impl VirtualFs for MemoryVfs {
    fn is_file(&self, path: &str) -> bool {
        self.files.contains_key(&path.to_ascii_lowercase())
    }

    fn is_dir(&self, path: &str) -> bool {
        self.dirs.contains(&path.to_ascii_lowercase())
    }

    fn list_dir(&self, path: &str) -> Vec<String> {
        let prefix = format!("{}/", path.to_ascii_lowercase());
        let mut out: Vec<String> = self
            .files
            .keys()
            .chain(self.dirs.iter())
            .filter_map(|candidate| candidate.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_owned)
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(&path.to_ascii_lowercase()).cloned()
    }
}

/// [`RestartHost`] that counts invocations instead of restarting anything.
#[derive(Debug, Default)]
pub struct CountingRestart {
    triggered: Cell<u32>,
}

impl CountingRestart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.triggered.get()
    }
}

impl RestartHost for CountingRestart {
    fn trigger_restart(&self) {
        self.triggered.set(self.triggered.get() + 1);
    }
}
