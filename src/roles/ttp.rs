//! TTP state machine: receives or locates TFHE ciphertexts, decrypts each,
//! and appends one framed plaintext buffer per batch to the decrypted-output
//! spool.

use crate::config::{endpoints, StorageRoot};
use crate::crypto::context::TfheParams;
use crate::crypto::decryptor;
use crate::error::{Error, Result};
use crate::keystore::KeyStore;
use crate::naming::{self, stamped_filename};
use crate::params::{DataHandling, Parameters, Variant};
use crate::perf::PerfLogger;
use crate::transport::queue::Receiver;
use crate::transport::spool::{ByteSpoolWriter, TfheSpoolReader};

pub struct Ttp {
    storage: StorageRoot,
    params: Parameters,
    tfhe_params: TfheParams,
}

impl Ttp {
    pub fn load(storage: StorageRoot, params: Parameters) -> Result<Self> {
        let tfhe_params = KeyStore::load_tfhe_secret(&storage.tfhe_secret_key_path())?;
        Ok(Self {
            storage,
            params,
            tfhe_params,
        })
    }

    fn connect_endpoint(&self) -> &'static str {
        match self.params.variant {
            Variant::He => endpoints::CLIENT_TO_TTP_HE_CONNECT,
            Variant::Hhe => endpoints::SERVER_TO_TTP_HHE_CONNECT,
        }
    }

    fn encrypted_tfhe_spool_path(&self) -> std::path::PathBuf {
        self.storage
            .encrypted_tfhe_data_dir()
            .join(stamped_filename(&self.params, "data_tfhe", "bin"))
    }

    fn decrypted_spool_path(&self) -> std::path::PathBuf {
        self.storage
            .decrypted_data_dir()
            .join(stamped_filename(&self.params, "data_decrypted", "bin"))
    }

    /// Runs the full READY/LOOP state machine.
    pub fn run(&self, logger: &mut PerfLogger) -> Result<()> {
        let input_path = if self.params.data_handling == DataHandling::SingleComponent {
            naming::latest_file(&self.storage.tfhe_data_dir())
                .map_err(|source| Error::Io {
                    path: self.storage.tfhe_data_dir(),
                    source,
                })?
                .ok_or_else(|| Error::KeyLoad {
                    path: self.storage.tfhe_data_dir(),
                    reason: "no TFHE spool file found".into(),
                })?
        } else {
            let receiver = Receiver::connect(self.connect_endpoint())?;
            let path = self.encrypted_tfhe_spool_path();
            let writer = ByteSpoolWriter::new(&path);
            let persisted =
                receiver.receive_and_store(&writer, self.params.total_integers(), true)?;
            logger.log(&format!("received {persisted} TFHE frames"))?;
            path
        };

        let mut reader = TfheSpoolReader::new(&input_path);
        let decrypted_writer = ByteSpoolWriter::new(self.decrypted_spool_path());

        for batch in 1..=self.params.batch_count {
            let mut batch_bytes = Vec::new();
            for _ in 0..self.params.batch_size {
                let ct_vec = reader.next_ct_vec(&self.tfhe_params)?.ok_or_else(|| {
                    Error::CorruptedFrame(
                        "TFHE spool ended before batch_size*batch_count frames were read",
                    )
                })?;
                let plaintext = decryptor::decrypt_result(&ct_vec, &self.tfhe_params)?;
                batch_bytes.extend_from_slice(&plaintext);
            }
            decrypted_writer.append(&batch_bytes)?;
            logger.log(&format!("batch {batch} decrypted"))?;
        }
        Ok(())
    }
}
