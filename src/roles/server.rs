//! Server state machine (HHE only): transciphers Kreyvium ciphertexts into
//! TFHE ciphertexts without ever learning the Kreyvium key or any plaintext.

use crate::config::{self, endpoints, StorageRoot};
use crate::crypto::context::TfheParams;
use crate::crypto::tfhe_codec::TfheCodec;
use crate::crypto::transcipher::{HomomorphicKreyviumKey, Transcipher};
use crate::error::{Error, Result};
use crate::keystore::KeyStore;
use crate::naming::{self, stamped_filename};
use crate::params::{DataHandling, Parameters};
use crate::perf::PerfLogger;
use crate::transport::queue::{self, Receiver};
use crate::transport::spool::{ByteSpoolReader, ByteSpoolWriter, TfheSpoolWriter};

pub struct Server {
    storage: StorageRoot,
    params: Parameters,
    tfhe_params: TfheParams,
    he_key: HomomorphicKreyviumKey,
}

impl Server {
    /// Loads TFHE params+secret and the Kreyvium key, then homomorphically
    /// encrypts the Kreyvium key under TFHE.
    ///
    /// The Server loads the *full* TFHE secret key set, not only the cloud
    /// evaluation key — this is necessary, not incidental: encrypting the
    /// Kreyvium key bits into TFHE ciphertexts is an `encrypt`, which only the
    /// client (secret) key can perform. See `DESIGN.md` for the reasoning.
    pub fn load(storage: StorageRoot, params: Parameters) -> Result<Self> {
        let tfhe_params = KeyStore::load_tfhe_secret(&storage.tfhe_secret_key_path())?;
        let kreyvium_key = KeyStore::load_kreyvium_key(&storage.kreyvium_key_path())?;
        let he_key = HomomorphicKreyviumKey::encrypt(&kreyvium_key, &tfhe_params)?;
        Ok(Self {
            storage,
            params,
            tfhe_params,
            he_key,
        })
    }

    fn transcipher(&self) -> Transcipher<'_> {
        Transcipher::new(
            self.tfhe_params.server_key(),
            &self.he_key,
            config::default_kreyvium_iv(),
        )
    }

    fn kreyvium_spool_path(&self) -> std::path::PathBuf {
        self.storage
            .kreyvium_data_dir()
            .join(stamped_filename(&self.params, "data_kreyvium", "bin"))
    }

    fn tfhe_spool_path(&self) -> std::path::PathBuf {
        self.storage
            .tfhe_data_dir()
            .join(stamped_filename(&self.params, "data_tfhe", "bin"))
    }

    /// Runs the full READY/LOOP/FINALIZE state machine.
    pub fn run(&self, logger: &mut PerfLogger) -> Result<()> {
        let input_path = match self.params.data_handling {
            DataHandling::AllAtOnce | DataHandling::TransmitKreyvium => {
                let receiver = Receiver::connect(endpoints::CLIENT_TO_SERVER_KREYVIUM_CONNECT)?;
                let path = self.kreyvium_spool_path();
                let writer = ByteSpoolWriter::new(&path);
                let persisted =
                    receiver.receive_and_store(&writer, self.params.total_integers(), true)?;
                logger.log(&format!("received {persisted} Kreyvium frames"))?;
                path
            }
            DataHandling::SingleComponent | DataHandling::TransmitTfhe => naming::latest_file(
                &self.storage.kreyvium_data_dir(),
            )
            .map_err(|source| Error::Io {
                path: self.storage.kreyvium_data_dir(),
                source,
            })?
            .ok_or_else(|| Error::KeyLoad {
                path: self.storage.kreyvium_data_dir(),
                reason: "no Kreyvium spool file found".into(),
            })?,
        };

        let transcipher = self.transcipher();
        let mut reader = ByteSpoolReader::new(&input_path);
        let tfhe_writer = matches!(self.params.data_handling, DataHandling::SingleComponent)
            .then(|| TfheSpoolWriter::new(self.tfhe_spool_path()));

        for batch in 1..=self.params.batch_count {
            let mut ct_vecs = Vec::with_capacity(self.params.batch_size);
            for _ in 0..self.params.batch_size {
                let frame = reader.next_frame()?.ok_or_else(|| Error::CorruptedFrame(
                    "Kreyvium spool ended before batch_size*batch_count frames were read",
                ))?;
                ct_vecs.push(transcipher.he_decrypt(&frame));
            }

            match &tfhe_writer {
                Some(writer) => {
                    for ct_vec in &ct_vecs {
                        writer.append(ct_vec)?;
                    }
                }
                None => {
                    for ct_vec in &ct_vecs {
                        queue::send(endpoints::SERVER_TO_TTP_HHE, &TfheCodec::encode(ct_vec)?)?;
                    }
                }
            }
            logger.log(&format!("batch {batch} transciphered"))?;
        }

        if self.params.data_handling != DataHandling::SingleComponent {
            queue::send_eof(endpoints::SERVER_TO_TTP_HHE)?;
            logger.log("sent EOF")?;
        }
        Ok(())
    }
}
