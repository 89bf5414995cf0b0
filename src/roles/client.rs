//! Client state machine: produces random integers, encrypts each under the
//! pipeline named by `Parameters.variant`, and drains every batch per
//! `Parameters.data_handling`.

use crate::config::{self, endpoints, StorageRoot};
use crate::crypto::context::TfheParams;
use crate::crypto::he_path;
use crate::crypto::kreyvium::KreyviumCipher;
use crate::crypto::tfhe_codec::{TfheCodec, TfheCtVec};
use crate::error::{Error, Result};
use crate::keystore::KeyStore;
use crate::naming::{self, stamped_filename};
use crate::params::{DataHandling, Parameters, Variant};
use crate::perf::PerfLogger;
use crate::roles::random_integer_block;
use crate::transport::queue;
use crate::transport::spool::{ByteSpoolReader, ByteSpoolWriter, TfheSpoolWriter};

/// The key material the Client loaded for its run; which variant it holds
/// follows directly from `Parameters.variant`.
enum ClientKeys {
    He(TfheParams),
    Hhe(KreyviumCipher),
}

/// One produced-and-encrypted integer, in whichever pipeline's representation.
enum CipherBlock {
    He(TfheCtVec),
    Hhe(Vec<u8>),
}

pub struct Client {
    storage: StorageRoot,
    params: Parameters,
    keys: ClientKeys,
    /// Stamped once at `load()` time, not recomputed per batch — `drain()` is
    /// called once per batch, and a fresh `stamped_filename()` each time would
    /// split a single run's spool across several files whenever two batches
    /// straddle a clock-second boundary.
    kreyvium_spool_path: std::path::PathBuf,
    tfhe_spool_path: std::path::PathBuf,
}

impl Client {
    /// Loads the key material `Parameters.variant` calls for.
    pub fn load(storage: StorageRoot, params: Parameters) -> Result<Self> {
        let keys = match params.variant {
            Variant::He => {
                ClientKeys::He(KeyStore::load_tfhe_secret(&storage.tfhe_secret_key_path())?)
            }
            Variant::Hhe => {
                let key = KeyStore::load_kreyvium_key(&storage.kreyvium_key_path())?;
                ClientKeys::Hhe(KreyviumCipher::new(key, config::default_kreyvium_iv()))
            }
        };
        let kreyvium_spool_path = storage
            .kreyvium_data_dir()
            .join(stamped_filename(&params, "data_kreyvium", "bin"));
        let tfhe_spool_path = storage
            .tfhe_data_dir()
            .join(stamped_filename(&params, "data_tfhe", "bin"));
        Ok(Self {
            storage,
            params,
            keys,
            kreyvium_spool_path,
            tfhe_spool_path,
        })
    }

    fn endpoint(&self) -> &'static str {
        match self.params.variant {
            Variant::He => endpoints::CLIENT_TO_TTP_HE,
            Variant::Hhe => endpoints::CLIENT_TO_SERVER_KREYVIUM,
        }
    }

    /// Runs the full READY/LOOP/FINALIZE state machine, logging one event per
    /// batch to `logger`.
    pub fn run(&self, logger: &mut PerfLogger) -> Result<()> {
        let endpoint = self.endpoint();
        queue::send_sof(endpoint)?;
        logger.log("sent SOF")?;

        match self.params.data_handling {
            DataHandling::TransmitKreyvium | DataHandling::TransmitTfhe => {
                self.resend_latest_spool(endpoint, logger)?;
            }
            _ => {
                for batch in 1..=self.params.batch_count {
                    let mut blocks = Vec::with_capacity(self.params.batch_size);
                    for _ in 0..self.params.batch_size {
                        let block = random_integer_block(self.params.int_bits.bytes());
                        blocks.push(self.encrypt(&block)?);
                    }
                    self.drain(&blocks)?;
                    logger.log(&format!("batch {batch} drained"))?;
                }
                if self.params.data_handling != DataHandling::SingleComponent {
                    queue::send_eof(endpoint)?;
                    logger.log("sent EOF")?;
                }
            }
        }
        Ok(())
    }

    fn encrypt(&self, block: &[u8]) -> Result<CipherBlock> {
        match &self.keys {
            ClientKeys::He(tfhe) => Ok(CipherBlock::He(he_path::encrypt_block(block, tfhe)?)),
            ClientKeys::Hhe(cipher) => Ok(CipherBlock::Hhe(cipher.encrypt_block(block))),
        }
    }

    /// Dispatches a completed batch per `Parameters.data_handling`.
    fn drain(&self, batch: &[CipherBlock]) -> Result<()> {
        match self.params.data_handling {
            DataHandling::AllAtOnce => {
                let endpoint = self.endpoint();
                for block in batch {
                    queue::send(endpoint, &self.block_bytes(block)?)?;
                }
                Ok(())
            }
            DataHandling::SingleComponent => {
                match self.params.variant {
                    Variant::He => {
                        let writer = TfheSpoolWriter::new(&self.tfhe_spool_path);
                        for block in batch {
                            let CipherBlock::He(ct_vec) = block else {
                                unreachable!("HE client only ever produces He blocks")
                            };
                            writer.append(ct_vec)?;
                        }
                    }
                    Variant::Hhe => {
                        let writer = ByteSpoolWriter::new(&self.kreyvium_spool_path);
                        for block in batch {
                            let CipherBlock::Hhe(bytes) = block else {
                                unreachable!("HHE client only ever produces Hhe blocks")
                            };
                            writer.append(bytes)?;
                        }
                    }
                }
                Ok(())
            }
            DataHandling::TransmitKreyvium | DataHandling::TransmitTfhe => {
                unreachable!("the main loop is skipped entirely for TRANSMIT_* handling")
            }
        }
    }

    fn block_bytes(&self, block: &CipherBlock) -> Result<Vec<u8>> {
        match block {
            CipherBlock::He(ct_vec) => TfheCodec::encode(ct_vec),
            CipherBlock::Hhe(bytes) => Ok(bytes.clone()),
        }
    }

    /// `TRANSMIT_KREYVIUM`/`TRANSMIT_TFHE`: re-sends the most recently written
    /// spool for the chosen variant over the queue, then EOF.
    fn resend_latest_spool(&self, endpoint: &str, logger: &mut PerfLogger) -> Result<()> {
        let dir = match self.params.data_handling {
            DataHandling::TransmitKreyvium => self.storage.kreyvium_data_dir(),
            DataHandling::TransmitTfhe => self.storage.tfhe_data_dir(),
            _ => unreachable!("only called for TRANSMIT_* handling"),
        };
        let path = naming::latest_file(&dir)
            .map_err(|source| Error::Io {
                path: dir.clone(),
                source,
            })?
            .ok_or_else(|| Error::KeyLoad {
                path: dir.clone(),
                reason: "no spool file found to re-send".into(),
            })?;

        let mut reader = ByteSpoolReader::new(&path);
        let mut resent = 0usize;
        while let Some(frame) = reader.next_frame()? {
            queue::send(endpoint, &frame)?;
            resent += 1;
        }
        logger.log(&format!("resent {resent} frames from {}", path.display()))?;

        queue::send_eof(endpoint)?;
        logger.log("sent EOF")?;
        Ok(())
    }
}
