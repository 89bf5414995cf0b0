//! Compiled-in configuration for the three role binaries. No CLI arguments and
//! no environment variables are consulted; every role's `main` calls
//! [`default_parameters`] and [`StorageRoot::default`].

use std::path::{Path, PathBuf};

use crate::crypto::kreyvium::IV_BITS;
use crate::params::{DataHandling, IntBits, Parameters, Variant};

/// Base directory under which every spool, key, and performance-log directory
/// is rooted, rather than hardcoded `../../…` relative paths.
#[derive(Debug, Clone)]
pub struct StorageRoot(PathBuf);

impl StorageRoot {
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self(base.into())
    }

    #[must_use]
    pub fn keys_dir(&self) -> PathBuf {
        self.0.join("storage_keys")
    }

    #[must_use]
    pub fn kreyvium_key_path(&self) -> PathBuf {
        self.keys_dir().join("key_kreyvium.bin")
    }

    #[must_use]
    pub fn tfhe_params_path(&self) -> PathBuf {
        self.keys_dir().join("params_tfhe.bin")
    }

    #[must_use]
    pub fn tfhe_secret_key_path(&self) -> PathBuf {
        self.keys_dir().join("sk_tfhe.bin")
    }

    #[must_use]
    pub fn kreyvium_data_dir(&self) -> PathBuf {
        self.0.join("data_kreyvium")
    }

    #[must_use]
    pub fn tfhe_data_dir(&self) -> PathBuf {
        self.0.join("data_tfhe")
    }

    #[must_use]
    pub fn encrypted_tfhe_data_dir(&self) -> PathBuf {
        self.0.join("data_encrypted_tfhe")
    }

    #[must_use]
    pub fn decrypted_data_dir(&self) -> PathBuf {
        self.0.join("data_decrypted")
    }

    #[must_use]
    pub fn perf_time_dir(&self) -> PathBuf {
        self.0.join("Performance_Measurement").join("data_time")
    }

    #[must_use]
    pub fn perf_memory_dir(&self) -> PathBuf {
        self.0.join("Performance_Measurement").join("data_memory")
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.0
    }
}

impl Default for StorageRoot {
    fn default() -> Self {
        Self::new("storage_root")
    }
}

/// Default endpoints for the three role processes.
pub mod endpoints {
    pub const CLIENT_TO_SERVER_KREYVIUM: &str = "tcp://*:5556";
    pub const CLIENT_TO_SERVER_KREYVIUM_CONNECT: &str = "tcp://localhost:5556";
    pub const CLIENT_TO_TTP_HE: &str = "tcp://*:5557";
    pub const CLIENT_TO_TTP_HE_CONNECT: &str = "tcp://localhost:5557";
    pub const SERVER_TO_TTP_HHE: &str = "tcp://*:5557";
    pub const SERVER_TO_TTP_HHE_CONNECT: &str = "tcp://localhost:5557";
}

/// The compiled-in `Parameters` this harness runs with. All three roles of a
/// run must use the same value.
#[must_use]
pub fn default_parameters() -> Parameters {
    Parameters {
        variant: Variant::Hhe,
        int_bits: IntBits::B32,
        batch_size: 16,
        batch_count: 4,
        data_handling: DataHandling::AllAtOnce,
    }
}

/// The Kreyvium IV this harness runs with. Unlike the key, the IV is public
/// per Kreyvium's design (the transcipher seeds it via trivial encryption,
/// never a secret one), so it is compiled in rather than loaded from
/// `storage_keys/`.
#[must_use]
pub fn default_kreyvium_iv() -> [bool; IV_BITS] {
    let mut iv = [false; IV_BITS];
    for (i, slot) in iv.iter_mut().enumerate() {
        *slot = i % 2 == 0;
    }
    iv
}
