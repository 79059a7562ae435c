//! Container handles.
//!
//! A [`Container`] owns one seekable stream and one read position. Scans take
//! `&mut Container`, so a single handle can never be advanced by two scans at
//! once; concurrent scans open their own handles, or take independent views
//! of a [`MappedContainer`].

use crate::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An open (or closed) handle over a binary G-code stream.
///
/// The stream is released when the container is closed or dropped.
#[derive(Debug)]
pub struct Container<S> {
    stream: Option<S>,
    label: String,
}

/// A file-backed container.
pub type FileContainer = Container<BufReader<File>>;

/// A memory-backed container.
pub type MemoryContainer = Container<Cursor<Vec<u8>>>;

impl<S: Read + Seek> Container<S> {
    /// Wraps an already open stream.
    pub fn new(stream: S, label: impl Into<String>) -> Self {
        Self {
            stream: Some(stream),
            label: label.into(),
        }
    }

    /// Returns true while the stream is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Closes the stream. Further operations fail with [`Error::HandleInvalid`].
    pub fn close(&mut self) {
        self.stream = None;
    }

    /// Label identifying the container in diagnostics (usually the path).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the underlying stream.
    ///
    /// # Errors
    /// Returns [`Error::HandleInvalid`] if the container is closed.
    pub fn stream_mut(&mut self) -> Result<&mut S> {
        self.stream.as_mut().ok_or(Error::HandleInvalid)
    }

    /// Moves the read position back to the start of the stream.
    ///
    /// # Errors
    /// Returns an error if the container is closed or the seek fails.
    pub fn rewind(&mut self) -> Result<()> {
        self.stream_mut()?.rewind()?;
        Ok(())
    }

    /// Current read position.
    ///
    /// # Errors
    /// Returns an error if the container is closed or the position cannot be read.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream_mut()?.stream_position()?)
    }

    /// Total stream length in bytes. The read position is preserved.
    ///
    /// # Errors
    /// Returns an error if the container is closed or a seek fails.
    pub fn stream_len(&mut self) -> Result<u64> {
        let stream = self.stream_mut()?;
        let current = stream.stream_position()?;
        let end = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(current))?;
        Ok(end)
    }

    /// Consumes the container, returning the stream if it was open.
    #[must_use]
    pub fn into_inner(self) -> Option<S> {
        self.stream
    }
}

impl Container<BufReader<File>> {
    /// Opens a file-backed container.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        Ok(Self::new(
            BufReader::new(file),
            path.as_ref().display().to_string(),
        ))
    }
}

impl Container<Cursor<Vec<u8>>> {
    /// Creates a memory-backed container over `bytes`.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(Cursor::new(bytes), "<memory>")
    }
}

/// Shared, read-only file mapping.
#[derive(Clone, Debug)]
pub struct SharedMmap(Arc<Mmap>);

impl AsRef<[u8]> for SharedMmap {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

/// A memory-mapped container file.
///
/// The file is mapped once; every [`MappedContainer::view`] is an
/// independent handle with its own read position.
pub struct MappedContainer {
    mmap: Arc<Mmap>,
    path: PathBuf,
}

impl MappedContainer {
    /// Maps a file for reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap: Arc::new(mmap),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the mapped bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Path of the mapped file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a new handle positioned at the start of the mapping.
    #[must_use]
    pub fn view(&self) -> Container<Cursor<SharedMmap>> {
        Container::new(
            Cursor::new(SharedMmap(Arc::clone(&self.mmap))),
            self.path.display().to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_memory_container_lifecycle() {
        let mut container = Container::from_bytes(vec![0u8; 16]);
        assert!(container.is_open());
        assert_eq!(container.label(), "<memory>");
        assert_eq!(container.stream_len().unwrap(), 16);

        container.stream_mut().unwrap().seek(SeekFrom::Start(5)).unwrap();
        assert_eq!(container.position().unwrap(), 5);
        assert_eq!(container.stream_len().unwrap(), 16);
        assert_eq!(container.position().unwrap(), 5);

        container.rewind().unwrap();
        assert_eq!(container.position().unwrap(), 0);

        container.close();
        assert!(!container.is_open());
        assert!(matches!(container.rewind(), Err(Error::HandleInvalid)));
        assert!(matches!(container.stream_mut(), Err(Error::HandleInvalid)));
        assert!(container.into_inner().is_none());
    }

    #[test]
    fn test_file_container_open() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"GCDE\x01\x00\x00\x00\x01\x00").unwrap();
        file.flush().unwrap();

        let mut container = Container::open(file.path()).unwrap();
        assert!(container.is_open());
        assert_eq!(container.stream_len().unwrap(), 10);
        assert!(container.label().ends_with(
            file.path()
                .file_name()
                .unwrap()
                .to_str()
                .unwrap()
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = Container::open("/nonexistent/dir/print.bgcode").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_mapped_views_are_independent() {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..64).collect();
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        let mapped = MappedContainer::open(file.path()).unwrap();
        assert_eq!(mapped.len(), 64);
        assert!(!mapped.is_empty());
        assert_eq!(mapped.as_bytes(), &data[..]);

        let mut first = mapped.view();
        let mut second = mapped.view();
        first.stream_mut().unwrap().seek(SeekFrom::Start(40)).unwrap();

        assert_eq!(first.position().unwrap(), 40);
        assert_eq!(second.position().unwrap(), 0);

        let mut byte = [0u8; 1];
        second.stream_mut().unwrap().read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], 0);
        first.stream_mut().unwrap().read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], 40);
    }
}
