//! Virtual file system facade.
//!
//! [`open`] gives the compile pipeline uniform access to a named blob:
//! a borrowed slice when the path names a preloaded virtual file, an owned
//! buffer after a filesystem read. `Cow` encodes the borrowed/owned duality
//! so owned buffers are released on every exit path.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::{IoError, IoResult};

/// A set of preloaded in-memory files keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Vfs {
    files: HashMap<String, Vec<u8>>,
}

impl Vfs {
    /// Create an empty virtual file system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named blob. An existing entry with the same name is
    /// replaced.
    pub fn add_file(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.files.insert(name.into(), data);
    }

    /// Look up a named blob.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Open a named blob, preferring the virtual file system.
///
/// Returns a borrowed slice on a VFS hit and an owned buffer after a
/// filesystem read.
///
/// # Errors
///
/// Returns [`IoError::NotFound`] if neither source yields the file and
/// [`IoError::Empty`] if the file holds zero bytes.
pub fn open<'v>(vfs: Option<&'v Vfs>, path: &str) -> IoResult<Cow<'v, [u8]>> {
    if let Some(bytes) = vfs.and_then(|v| v.find(path)) {
        if bytes.is_empty() {
            return Err(IoError::Empty {
                path: path.to_string(),
            });
        }
        return Ok(Cow::Borrowed(bytes));
    }

    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Err(IoError::Empty {
            path: path.to_string(),
        }),
        Ok(bytes) => Ok(Cow::Owned(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IoError::NotFound {
            path: path.to_string(),
        }),
        Err(e) => Err(IoError::Io(e)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn vfs_hit_is_borrowed() {
        let mut vfs = Vfs::new();
        vfs.add_file("cube.msh", vec![1, 2, 3]);

        let blob = open(Some(&vfs), "cube.msh").unwrap();
        assert!(matches!(blob, Cow::Borrowed(_)));
        assert_eq!(&*blob, &[1, 2, 3]);
    }

    #[test]
    fn vfs_empty_file() {
        let mut vfs = Vfs::new();
        vfs.add_file("empty.stl", Vec::new());

        let err = open(Some(&vfs), "empty.stl").unwrap_err();
        assert!(matches!(err, IoError::Empty { .. }));
    }

    #[test]
    fn filesystem_fallback_is_owned() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"payload").unwrap();
        let path = tmp.path().to_str().unwrap().to_string();

        let blob = open(None, &path).unwrap();
        assert!(matches!(blob, Cow::Owned(_)));
        assert_eq!(&*blob, b"payload");
    }

    #[test]
    fn missing_everywhere() {
        let vfs = Vfs::new();
        let err = open(Some(&vfs), "no/such/file.stl").unwrap_err();
        assert!(matches!(err, IoError::NotFound { .. }));
    }

    #[test]
    fn vfs_replaces_existing() {
        let mut vfs = Vfs::new();
        vfs.add_file("a", vec![1]);
        vfs.add_file("a", vec![2]);
        assert_eq!(vfs.find("a"), Some(&[2u8][..]));
        assert_eq!(vfs.len(), 1);
    }
}
