//! One-shot tool that populates `KeyStore` with a fresh Kreyvium key and a
//! fresh TFHE key pair, so the Client/Server/TTP binaries have key material
//! to load on their next run.

use rand::RngCore;

use hebench::config::StorageRoot;
use hebench::crypto::context::{SecurityLevel, TfheParams};
use hebench::crypto::kreyvium::{bytes_to_bits, KEY_BITS};
use hebench::keystore::KeyStore;

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "keygen failed");
        std::process::exit(1);
    }
}

fn run() -> hebench::Result<()> {
    let storage = StorageRoot::default();

    let kreyvium_key = random_kreyvium_key();
    KeyStore::save_kreyvium_key(&storage.kreyvium_key_path(), &kreyvium_key)?;
    tracing::info!(path = %storage.kreyvium_key_path().display(), "wrote Kreyvium key");

    let level = SecurityLevel::Default;
    let tfhe_params = TfheParams::generate(level);
    KeyStore::save_tfhe_params(&storage.tfhe_params_path(), level)?;
    tracing::info!(path = %storage.tfhe_params_path().display(), "wrote TFHE parameter set");

    KeyStore::save_tfhe_secret(&storage.tfhe_secret_key_path(), &tfhe_params)?;
    tracing::info!(path = %storage.tfhe_secret_key_path().display(), "wrote TFHE secret key set");

    Ok(())
}

fn random_kreyvium_key() -> [bool; KEY_BITS] {
    let mut bytes = [0u8; KEY_BITS / 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes_to_bits(&bytes)
        .try_into()
        .expect("KEY_BITS/8 bytes yield exactly KEY_BITS bits")
}
