//! TFHE client/server key context, built on `tfhe::boolean`'s
//! gate-bootstrapped `Ciphertext` rather than the high-level integer API
//! (`FheUint*`, global thread-local server key), where every gate takes the
//! `ServerKey` by reference instead of relying on global state — `TfheCtVec`
//! is a vector of single-bit gate-bootstrapping ciphertexts, so the context
//! has to work at that granularity.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tfhe::boolean::parameters::{BooleanParameters, DEFAULT_PARAMETERS, TFHE_LIB_PARAMETERS};
use tfhe::boolean::{gen_keys_with_parameters, Ciphertext, ClientKey, ServerKey};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Maps to one of `tfhe-rs`'s two canonical boolean parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityLevel {
    /// `tfhe::boolean::parameters::DEFAULT_PARAMETERS`.
    Default,
    /// `tfhe::boolean::parameters::TFHE_LIB_PARAMETERS`, matching the
    /// original TFHE library's parameter choice.
    TfheLib,
}

impl Default for SecurityLevel {
    fn default() -> Self {
        Self::Default
    }
}

fn parameters_for(level: SecurityLevel) -> BooleanParameters {
    match level {
        SecurityLevel::Default => DEFAULT_PARAMETERS,
        SecurityLevel::TfheLib => TFHE_LIB_PARAMETERS,
    }
}

/// A TFHE client/server key pair plus the parameter handle `TfheCtVec`
/// ciphertexts are bound to. Cheaply `Clone`-able (an `Arc` around each key).
#[derive(Clone)]
pub struct TfheParams {
    client_key: Option<Arc<ClientKey>>,
    server_key: Arc<ServerKey>,
    level: SecurityLevel,
}

impl TfheParams {
    /// Generates a fresh key pair under `level`. The result holds both keys;
    /// use [`TfheParams::server_only`] to model a party (the harness's Server
    /// role) that should not retain the secret key.
    #[must_use]
    pub fn generate(level: SecurityLevel) -> Self {
        let (client_key, server_key) = gen_keys_with_parameters(parameters_for(level));
        Self {
            client_key: Some(Arc::new(client_key)),
            server_key: Arc::new(server_key),
            level,
        }
    }

    /// Strips the client (secret) key, keeping only the server (evaluation)
    /// key. Callers that want to model a minimal-trust party holding only
    /// evaluation capability should construct with this instead of
    /// [`TfheParams::generate`].
    #[must_use]
    pub fn server_only(&self) -> Self {
        Self {
            client_key: None,
            server_key: self.server_key.clone(),
            level: self.level,
        }
    }

    pub fn client_key(&self) -> Result<&ClientKey> {
        self.client_key
            .as_deref()
            .ok_or(Error::Codec("client key not bound to this context".into()))
    }

    #[must_use]
    pub fn server_key(&self) -> &ServerKey {
        &self.server_key
    }

    #[must_use]
    pub fn level(&self) -> SecurityLevel {
        self.level
    }

    pub fn encrypt_bit(&self, bit: bool) -> Result<Ciphertext> {
        Ok(self.client_key()?.encrypt(bit))
    }

    pub fn decrypt_bit(&self, ct: &Ciphertext) -> Result<bool> {
        Ok(self.client_key()?.decrypt(ct))
    }

    /// Serializes both keys to an integrity-checked byte blob (bincode
    /// payload + SHA-256 checksum envelope). Fails if this context has no
    /// client key.
    pub fn export_secret(&self) -> Result<Zeroizing<Vec<u8>>> {
        let payload = SecretPayload {
            level: self.level,
            client_key: self.client_key()?.clone(),
            server_key: self.server_key.as_ref().clone(),
        };
        envelope(&payload)
    }

    /// Reconstructs a full (client + server key) context from
    /// [`TfheParams::export_secret`]'s output.
    pub fn import_secret(bytes: &[u8]) -> Result<Self> {
        let payload: SecretPayload = open_envelope(bytes)?;
        Ok(Self {
            client_key: Some(Arc::new(payload.client_key)),
            server_key: Arc::new(payload.server_key),
            level: payload.level,
        })
    }

    /// Serializes only the server (evaluation) key, for the Server role's
    /// on-disk key material.
    pub fn export_server(&self) -> Result<Vec<u8>> {
        let payload = ServerPayload {
            level: self.level,
            server_key: self.server_key.as_ref().clone(),
        };
        Ok(envelope(&payload)?.to_vec())
    }

    pub fn import_server(bytes: &[u8]) -> Result<Self> {
        let payload: ServerPayload = open_envelope(bytes)?;
        Ok(Self {
            client_key: None,
            server_key: Arc::new(payload.server_key),
            level: payload.level,
        })
    }
}

impl fmt::Debug for TfheParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfheParams")
            .field("level", &self.level)
            .field("has_client_key", &self.client_key.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize)]
struct SecretPayload {
    level: SecurityLevel,
    client_key: ClientKey,
    server_key: ServerKey,
}

#[derive(Serialize, Deserialize)]
struct ServerPayload {
    level: SecurityLevel,
    server_key: ServerKey,
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    checksum: [u8; 32],
    payload: T,
}

fn envelope<T: Serialize>(payload: &T) -> Result<Zeroizing<Vec<u8>>> {
    let payload_bytes = Zeroizing::new(bincode::serialize(payload)?);
    let checksum: [u8; 32] = Sha256::digest(&payload_bytes).into();
    let encoded = Zeroizing::new(bincode::serialize(&RawEnvelope {
        checksum,
        payload_bytes: &payload_bytes,
    })?);
    Ok(encoded)
}

fn open_envelope<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    let raw: OwnedRawEnvelope = bincode::deserialize(bytes)?;
    let expected: [u8; 32] = Sha256::digest(&raw.payload_bytes).into();
    if raw.checksum != expected {
        return Err(Error::KeyLoad {
            path: std::path::PathBuf::new(),
            reason: "serialized key integrity check failed".into(),
        });
    }
    Ok(bincode::deserialize(&raw.payload_bytes)?)
}

#[derive(Serialize)]
struct RawEnvelope<'a> {
    checksum: [u8; 32],
    payload_bytes: &'a [u8],
}

#[derive(Deserialize)]
struct OwnedRawEnvelope {
    checksum: [u8; 32],
    payload_bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_round_trip() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let ct_true = ctx.encrypt_bit(true).unwrap();
        let ct_false = ctx.encrypt_bit(false).unwrap();
        assert!(ctx.decrypt_bit(&ct_true).unwrap());
        assert!(!ctx.decrypt_bit(&ct_false).unwrap());
    }

    #[test]
    fn server_only_cannot_encrypt_or_decrypt() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let server_only = ctx.server_only();
        assert!(server_only.encrypt_bit(true).is_err());
    }

    #[test]
    fn secret_export_import_round_trip() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let exported = ctx.export_secret().unwrap();
        let imported = TfheParams::import_secret(&exported).unwrap();

        let ct = imported.encrypt_bit(true).unwrap();
        assert!(imported.decrypt_bit(&ct).unwrap());
    }

    #[test]
    fn tampered_export_is_rejected() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let mut exported = ctx.export_secret().unwrap().to_vec();
        let mid = exported.len() / 2;
        exported[mid] ^= 0xFF;
        assert!(TfheParams::import_secret(&exported).is_err());
    }
}
