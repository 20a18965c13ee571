//! Reading and replacing the complete tag list of one filesystem entry.
//!
//! The attribute store only supports whole-value replacement, so a write
//! always clears the entry first and then stores the new list. Nothing
//! locks the entry between our read and our write: if Finder or another
//! process changes the tags in between, the last writer wins.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::{Result, TagError};
use crate::tags::{codec, LocalizationTable, Tag};

/// Extended attribute holding the tag list.
#[cfg(target_os = "macos")]
pub const USER_TAGS_ATTR: &str = "com.apple.metadata:_kMDItemUserTags";
#[cfg(not(target_os = "macos"))]
pub const USER_TAGS_ATTR: &str = "user.com.apple.metadata:_kMDItemUserTags";

/// Legacy Finder info block; byte 9 carries the old single label color.
#[cfg(target_os = "macos")]
pub const FINDER_INFO_ATTR: &str = "com.apple.FinderInfo";
#[cfg(not(target_os = "macos"))]
pub const FINDER_INFO_ATTR: &str = "user.com.apple.FinderInfo";

const FINDER_INFO_FLAGS_BYTE: usize = 9;
const FINDER_INFO_LABEL_MASK: u8 = 0x0E;

/// Raw access to the place tags are stored.
///
/// `clear` must remove every trace of the entry's tags, including ones set
/// through channels other than `write_raw`.
pub trait TagBackend {
    fn read_raw(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;
    fn clear(&self, path: &Path) -> io::Result<()>;
    fn write_raw(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

/// Tags stored in extended attributes on the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct XattrBackend;

impl TagBackend for XattrBackend {
    fn read_raw(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        xattr::get(path, USER_TAGS_ATTR)
    }

    fn clear(&self, path: &Path) -> io::Result<()> {
        if xattr::get(path, USER_TAGS_ATTR)?.is_some() {
            xattr::remove(path, USER_TAGS_ATTR)?;
        }

        // Finder still honours the legacy label bits, so they have to go too.
        if let Some(mut info) = xattr::get(path, FINDER_INFO_ATTR)? {
            if info.len() > FINDER_INFO_FLAGS_BYTE
                && info[FINDER_INFO_FLAGS_BYTE] & FINDER_INFO_LABEL_MASK != 0
            {
                info[FINDER_INFO_FLAGS_BYTE] &= !FINDER_INFO_LABEL_MASK;
                if info.iter().all(|b| *b == 0) {
                    xattr::remove(path, FINDER_INFO_ATTR)?;
                } else {
                    xattr::set(path, FINDER_INFO_ATTR, &info)?;
                }
            }
        }

        Ok(())
    }

    fn write_raw(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        xattr::set(path, USER_TAGS_ATTR, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    Clear(PathBuf),
    Write(PathBuf),
}

/// In-process tag storage, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<PathBuf, Vec<u8>>>,
    failing: Mutex<HashSet<PathBuf>>,
    ops: Mutex<Vec<BackendOp>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_raw(&self, path: impl Into<PathBuf>, data: Vec<u8>) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), data);
    }

    pub fn insert_tags(&self, path: impl Into<PathBuf>, tags: &[Tag]) -> Result<()> {
        self.insert_raw(path, codec::encode(tags)?);
        Ok(())
    }

    /// Makes every later `write_raw` to `path` fail.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into());
    }

    pub fn raw(&self, path: &Path) -> Option<Vec<u8>> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn operations(&self) -> Vec<BackendOp> {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, op: BackendOp) {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).push(op);
    }
}

impl TagBackend for MemoryBackend {
    fn read_raw(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        Ok(self.raw(path))
    }

    fn clear(&self, path: &Path) -> io::Result<()> {
        self.record(BackendOp::Clear(path.to_path_buf()));
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
        Ok(())
    }

    fn write_raw(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.record(BackendOp::Write(path.to_path_buf()));
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path);
        if failing {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "write rejected",
            ));
        }
        self.insert_raw(path, data.to_vec());
        Ok(())
    }
}

pub struct TagStore<B: TagBackend> {
    backend: B,
    localization: LocalizationTable,
    localize: bool,
}

impl<B: TagBackend> TagStore<B> {
    pub fn new(backend: B, localization: LocalizationTable) -> Self {
        Self {
            backend,
            localization,
            localize: true,
        }
    }

    /// Whether palette tag names are written in the user's language.
    pub fn with_localization_on_write(mut self, localize: bool) -> Self {
        self.localize = localize;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn localization(&self) -> &LocalizationTable {
        &self.localization
    }

    /// Current tags of `path` with canonical color names. Never fails: a
    /// missing or unreadable attribute reads as no tags.
    pub fn read(&self, path: &Path) -> Vec<Tag> {
        let data = match self.backend.read_raw(path) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(err) => {
                debug!(path = %path.display(), %err, "could not read tags");
                return Vec::new();
            }
        };

        match codec::decode(&data) {
            Ok(tags) => tags
                .iter()
                .map(|tag| self.localization.delocalize(tag))
                .collect(),
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring corrupt tag attribute");
                Vec::new()
            }
        }
    }

    pub fn write(&self, tags: &[Tag], path: &Path) -> Result<()> {
        self.write_with(tags, path, self.localize)
    }

    /// Replaces the tags of `path`. The entry is cleared before the new
    /// list is stored so that a shrinking update leaves nothing behind.
    pub fn write_with(&self, tags: &[Tag], path: &Path, localize: bool) -> Result<()> {
        let data = if localize {
            let localized: Vec<Tag> = tags
                .iter()
                .map(|tag| self.localization.localize(tag))
                .collect();
            codec::encode(&localized)?
        } else {
            codec::encode(tags)?
        };

        self.backend
            .clear(path)
            .map_err(|e| TagError::persist(path, e))?;
        self.backend
            .write_raw(path, &data)
            .map_err(|e| TagError::persist(path, e))?;

        debug!(path = %path.display(), count = tags.len(), "tags written");
        Ok(())
    }
}
