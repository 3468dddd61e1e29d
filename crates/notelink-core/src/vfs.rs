use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file or directory found while walking a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Abstract interface for file system operations.
pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file into a string.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Replace the contents of a file.
    fn write(&self, path: &Path, content: &str) -> std::io::Result<()>;

    fn is_dir(&self, path: &Path) -> bool;

    /// Every entry below `root` (root excluded), sorted by name within each
    /// directory. Directories whose name is in `ignore` are skipped with their contents.
    fn walk(&self, root: &Path, ignore: &[String]) -> Vec<VfsEntry>;
}

/// Standard implementation of FileSystem using std::fs and walkdir.
pub struct PhysicalFileSystem;

impl FileSystem for PhysicalFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk(&self, root: &Path, ignore: &[String]) -> Vec<VfsEntry> {
        WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && ignore
                        .iter()
                        .any(|name| entry.file_name().to_string_lossy() == name.as_str()))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(VfsEntry {
                    is_dir: entry.file_type().is_dir(),
                    path: entry.into_path(),
                }),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .collect()
    }
}
