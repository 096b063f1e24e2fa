//! Filesystem access used by the finder
//!
//! The finder only needs three primitives: list a directory, stat a path
//! and open a file for reading. They live behind [`FileSystem`] so the
//! traversal can run against an instrumented or in-memory implementation.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::errors::{FindError, FindResult};

/// One child returned by a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    /// Base name of the child
    pub name: String,
    /// Whether the directory entry type is a directory
    pub is_dir: bool,
}

impl DirItem {
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            is_dir,
        }
    }
}

/// The result of reading one directory
///
/// A child that could not be read is reported in `errors`; its siblings
/// are still listed in `items`.
#[derive(Debug, Default)]
pub struct DirListing {
    pub items: Vec<DirItem>,
    pub errors: Vec<FindError>,
}

impl From<Vec<DirItem>> for DirListing {
    fn from(items: Vec<DirItem>) -> Self {
        Self {
            items,
            errors: Vec::new(),
        }
    }
}

/// Metadata returned by [`FileSystem::stat`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub size: u64,
    pub modified: SystemTime,
    /// Permission bits (unix mode on unix, synthesized elsewhere)
    pub mode: u32,
    pub is_dir: bool,
}

impl Stat {
    pub fn from_metadata(meta: &fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            mode: mode_bits(meta),
            is_dir: meta.is_dir(),
        }
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

/// Filesystem primitives consumed by the finder
///
/// Implementations must be shareable across worker threads.
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// List the immediate children of `dir` in one read
    ///
    /// `Err` means the directory itself could not be read.
    fn read_dir(&self, dir: &Path) -> FindResult<DirListing>;

    /// Read the metadata of `path`, following symlinks
    fn stat(&self, path: &Path) -> io::Result<Stat>;

    /// Open `path` for reading
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
}

/// The operating system filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_dir(&self, dir: &Path) -> FindResult<DirListing> {
        // depth 1 only: walkdir yields children in listing order without sorting
        let walker = WalkDir::new(dir).min_depth(1).max_depth(1);
        let mut listing = DirListing::default();

        for entry in walker {
            match entry {
                Ok(entry) => listing.items.push(DirItem {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir: entry.file_type().is_dir(),
                }),
                // depth 0 is the directory itself
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => listing.errors.push(e.into()),
            }
        }

        Ok(listing)
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        fs::metadata(path).map(|meta| Stat::from_metadata(&meta))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }
}
