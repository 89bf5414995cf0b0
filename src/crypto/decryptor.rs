//! TTP-side decryption: turns a `TfheCtVec` back into the plaintext bytes the
//! Client originally produced, regardless of whether it arrived via the `HE`
//! or `HHE` pipeline — by the time a `TfheCtVec` reaches the TTP, both
//! pipelines look identical.

use crate::crypto::context::TfheParams;
use crate::crypto::kreyvium::bits_to_bytes;
use crate::crypto::tfhe_codec::TfheCtVec;
use crate::error::Result;

/// Decrypts `ct_vec` bit-by-bit under `params`'s client (secret) key,
/// reassembling the bits MSB-first into bytes. `ct_vec.len()` must be a
/// multiple of 8.
pub fn decrypt_result(ct_vec: &TfheCtVec, params: &TfheParams) -> Result<Vec<u8>> {
    let bits = ct_vec
        .iter()
        .map(|ct| params.decrypt_bit(ct))
        .collect::<Result<Vec<bool>>>()?;
    Ok(bits_to_bytes(&bits))
}
