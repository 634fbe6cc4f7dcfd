//! In-memory mock filesystem for testing without a real `/sys`.

use crate::collector::traits::FileSystem;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory so tests can describe a
/// `/sys/class/net` tree, including devices that disappear between ticks.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: BTreeSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Adds a network device with its `statistics/` counter files.
    ///
    /// # Arguments
    /// * `net_root` - Devices root, usually `/sys/class/net`
    /// * `name` - Interface name
    /// * `counters` - `(source_key, value)` pairs written under `statistics/`
    pub fn add_device(
        &mut self,
        net_root: impl AsRef<Path>,
        name: &str,
        counters: &[(&str, u64)],
    ) {
        let base = net_root.as_ref().join(name);
        self.add_dir(base.join("statistics"));
        for (key, value) in counters {
            self.set_counter(net_root.as_ref(), name, key, *value);
        }
    }

    /// Overwrites one counter file, as the kernel would between ticks.
    pub fn set_counter(
        &mut self,
        net_root: impl AsRef<Path>,
        name: &str,
        key: &str,
        value: u64,
    ) {
        let path = net_root.as_ref().join(name).join("statistics").join(key);
        self.add_file(path, format!("{}\n", value));
    }

    /// Removes a device and everything below it.
    pub fn remove_device(&mut self, net_root: impl AsRef<Path>, name: &str) {
        let base = net_root.as_ref().join(name);
        self.files.retain(|p, _| !p.starts_with(&base));
        self.directories.retain(|p| !p.starts_with(&base));
    }

    /// Loads a mock filesystem from a directory snapshot.
    ///
    /// The directory is mounted at `virtual_root`, so a copy of a real
    /// `/sys/class/net` tree can be replayed in regression tests.
    pub fn from_snapshot(dir: &Path, virtual_root: &Path) -> io::Result<Self> {
        let mut fs = Self::new();
        load_directory_recursive(&mut fs, dir, virtual_root)?;
        Ok(fs)
    }
}

fn load_directory_recursive(
    fs: &mut MockFs,
    real_path: &Path,
    virtual_path: &Path,
) -> io::Result<()> {
    fs.add_dir(virtual_path);

    for entry in std::fs::read_dir(real_path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let real_child = entry.path();
        let virtual_child = virtual_path.join(entry.file_name());

        if file_type.is_dir() {
            load_directory_recursive(fs, &real_child, &virtual_child)?;
        } else if file_type.is_file() {
            // Skip unreadable and binary attributes
            if let Ok(content) = std::fs::read_to_string(&real_child) {
                fs.add_file(&virtual_child, content);
            }
        }
    }
    Ok(())
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = BTreeSet::new();

        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}
