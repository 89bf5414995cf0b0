//! Thread-safe append writer and sequential reader for framed records.
//! [`ByteSpool`] handles arbitrary byte payloads (Kreyvium ciphertexts,
//! raw queue messages, decrypted output bytes); [`TfheSpool`] layers
//! [`crate::crypto::tfhe_codec`] on top for `TfheCtVec` records.

use std::fs::{self, File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::crypto::tfhe_codec::{TfheCodec, TfheCtVec, TfheParams};
use crate::error::Result;
use crate::transport::framer::{read_frame, write_frame};
use crate::transport::path_locks::{self, PathLock};

/// Appends framed byte payloads to a single path, serialized across threads by
/// [`path_locks`].
pub struct ByteSpoolWriter {
    path: PathBuf,
    lock: PathLock,
}

impl ByteSpoolWriter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = path_locks::acquire(&path);
        Self { path, lock }
    }

    /// Appends one frame. Creates parent directories on first use.
    pub fn append(&self, bytes: &[u8]) -> Result<()> {
        let _guard = self.lock.lock()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| crate::error::Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| crate::error::Error::Io {
                path: self.path.clone(),
                source,
            })?;
        write_frame(&mut file, bytes)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Sequentially reads framed byte payloads from a single path.
///
/// A reader opened on a file that does not yet exist is in an "empty" state
/// and reports clean end immediately rather than failing.
pub struct ByteSpoolReader {
    path: PathBuf,
    lock: PathLock,
    file: Option<BufReader<File>>,
}

impl ByteSpoolReader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = path_locks::acquire(&path);
        Self {
            path,
            lock,
            file: None,
        }
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        match File::open(&self.path) {
            Ok(file) => {
                self.file = Some(BufReader::new(file));
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(crate::error::Error::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Returns the next frame, or `None` at clean end.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let _guard = self.lock.lock()?;
        self.ensure_open()?;
        match &mut self.file {
            Some(file) => read_frame(file),
            None => Ok(None),
        }
    }

    /// Restarts iteration from offset 0.
    pub fn reset(&mut self) -> Result<()> {
        let _guard = self.lock.lock()?;
        self.file = None;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Appends framed `TfheCtVec` records, encoded via [`TfheCodec`].
pub struct TfheSpoolWriter {
    inner: ByteSpoolWriter,
}

impl TfheSpoolWriter {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: ByteSpoolWriter::new(path),
        }
    }

    pub fn append(&self, value: &TfheCtVec) -> Result<()> {
        let encoded = TfheCodec::encode(value)?;
        self.inner.append(&encoded)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }
}

/// Sequentially reads and decodes `TfheCtVec` records.
pub struct TfheSpoolReader {
    inner: ByteSpoolReader,
}

impl TfheSpoolReader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: ByteSpoolReader::new(path),
        }
    }

    /// Reads and decodes the next record, binding it to `params`.
    pub fn next_ct_vec(&mut self, params: &TfheParams) -> Result<Option<TfheCtVec>> {
        match self.inner.next_frame()? {
            Some(bytes) => Ok(Some(TfheCodec::decode(&bytes, Some(params))?)),
            None => Ok(None),
        }
    }

    pub fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concatenation_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spool.bin");

        let writer = ByteSpoolWriter::new(&path);
        writer.append(b"one").unwrap();
        writer.append(b"two").unwrap();
        writer.append(b"three").unwrap();

        let mut reader = ByteSpoolReader::new(&path);
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().unwrap() {
            frames.push(frame);
        }
        assert_eq!(
            frames,
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn reader_on_missing_file_reports_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.bin");
        let mut reader = ByteSpoolReader::new(&path);
        assert_eq!(reader.next_frame().unwrap(), None);
    }

    #[test]
    fn reset_restarts_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spool.bin");
        let writer = ByteSpoolWriter::new(&path);
        writer.append(b"alpha").unwrap();

        let mut reader = ByteSpoolReader::new(&path);
        assert_eq!(reader.next_frame().unwrap(), Some(b"alpha".to_vec()));
        assert_eq!(reader.next_frame().unwrap(), None);

        reader.reset().unwrap();
        assert_eq!(reader.next_frame().unwrap(), Some(b"alpha".to_vec()));
    }

    #[test]
    fn truncated_last_frame_surfaces_as_corrupted_after_valid_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spool.bin");
        let writer = ByteSpoolWriter::new(&path);
        writer.append(b"first").unwrap();
        writer.append(b"second").unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes.pop(); // truncate the last frame's payload by one byte

        fs::write(&path, &bytes).unwrap();

        let mut reader = ByteSpoolReader::new(&path);
        assert_eq!(reader.next_frame().unwrap(), Some(b"first".to_vec()));
        let err = reader.next_frame().unwrap_err();
        assert!(matches!(err, crate::error::Error::CorruptedFrame(_)));
    }

    #[test]
    fn two_concurrent_writers_produce_all_frames_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concurrent.bin");

        let mut handles = Vec::new();
        for thread_id in 0..2u8 {
            let path = path.clone();
            handles.push(thread::spawn(move || {
                let writer = ByteSpoolWriter::new(&path);
                for i in 0..100u32 {
                    let payload = [thread_id, (i >> 8) as u8, i as u8];
                    writer.append(&payload).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut reader = ByteSpoolReader::new(&path);
        let mut seen = std::collections::HashSet::new();
        let mut count = 0;
        while let Some(frame) = reader.next_frame().unwrap() {
            assert_eq!(frame.len(), 3);
            seen.insert(frame);
            count += 1;
        }
        assert_eq!(count, 200);
        assert_eq!(seen.len(), 200);
    }
}
