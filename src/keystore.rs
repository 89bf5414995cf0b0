//! Blocking load/save of key material as byte blobs on disk, under
//! `storage_keys/*.bin`.
//!
//! The Kreyvium key file is wrapped in the same [`crate::transport::framer`]
//! format as every other on-disk record: a fixed-width big-endian length
//! prefix, deliberately not a native-endian `size_t` prefix, which would not
//! round-trip between hosts of different endianness. TFHE parameter and
//! secret-key blobs are written as-is: each file holds exactly one opaque
//! library export, so no additional framing is needed.

use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;

use crate::crypto::context::{SecurityLevel, TfheParams};
use crate::crypto::kreyvium::{bits_to_bytes, bytes_to_bits, KEY_BITS};
use crate::error::{Error, Result};
use crate::transport::framer::{read_frame, write_frame};

pub struct KeyStore;

impl KeyStore {
    /// Writes `key` to `path` as a single [`crate::transport::framer::Frame`].
    pub fn save_kreyvium_key(path: &Path, key: &[bool; KEY_BITS]) -> Result<()> {
        let bytes = bits_to_bytes(key);
        let mut file = create_file(path)?;
        write_frame(&mut file, &bytes)
    }

    /// Reads back a key written by [`KeyStore::save_kreyvium_key`].
    pub fn load_kreyvium_key(path: &Path) -> Result<[bool; KEY_BITS]> {
        let mut file = open_file(path)?;
        let bytes = read_frame(&mut file)?.ok_or(Error::KeyLoad {
            path: path.to_path_buf(),
            reason: "key file is empty".into(),
        })?;
        let bits = bytes_to_bits(&bytes);
        bits.try_into().map_err(|bits: Vec<bool>| Error::KeyLoad {
            path: path.to_path_buf(),
            reason: format!("expected {KEY_BITS} key bits, found {}", bits.len()),
        })
    }

    /// Writes `level`'s TFHE parameter set, bincode-encoded.
    pub fn save_tfhe_params(path: &Path, level: SecurityLevel) -> Result<()> {
        let bytes = bincode::serialize(&level)?;
        write_whole_file(path, &bytes)
    }

    pub fn load_tfhe_params(path: &Path) -> Result<SecurityLevel> {
        let bytes = read_whole_file(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Writes the full (client + server) key pair via [`TfheParams::export_secret`].
    pub fn save_tfhe_secret(path: &Path, params: &TfheParams) -> Result<()> {
        let bytes = params.export_secret()?;
        write_whole_file(path, &bytes)
    }

    /// Reads back the full key pair written by [`KeyStore::save_tfhe_secret`].
    pub fn load_tfhe_secret(path: &Path) -> Result<TfheParams> {
        let bytes = read_whole_file(path)?;
        TfheParams::import_secret(&bytes)
    }
}

/// Opens `path` for a fresh write, creating parent directories as needed.
/// Shared with [`crate::perf::PerfLogger`], which opens its own log files the
/// same way.
pub(crate) fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_whole_file(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;
    let mut file = create_file(path)?;
    file.write_all(bytes).map_err(Error::IoBare)
}

fn read_whole_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = open_file(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(Error::IoBare)?;
    Ok(bytes)
}
