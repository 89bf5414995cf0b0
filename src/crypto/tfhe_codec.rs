//! Serializes a `TfheCtVec` to a flat byte buffer and back, using `bincode`
//! over `tfhe::boolean::Ciphertext`'s own `Serialize`/`Deserialize` impl as
//! the underlying stream export/import primitive. Layout:
//!
//! ```text
//! [ uint32 BE : N ][ bincode(ct[0]) ][ bincode(ct[1]) ] … [ bincode(ct[N-1]) ]
//! ```
//!
//! Every encoded ciphertext element the library produces for a given parameter
//! set is the same number of bytes, so decoding only needs `N` plus the total
//! buffer length to know where each element starts. No TFHE parameter handle
//! is actually touched during decode; it is accepted only so the caller
//! cannot forget to bind one (an unbound decode reports [`Error::ParamsUnbound`]).
//! The codec holds no state of its own beyond what is passed in on each call.

use tfhe::boolean::Ciphertext;

use crate::crypto::context::TfheParams;
use crate::error::{Error, Result};

pub type TfheCtVec = Vec<Ciphertext>;

pub struct TfheCodec;

impl TfheCodec {
    /// Encodes `value` to the wire/spool layout described above.
    pub fn encode(value: &TfheCtVec) -> Result<Vec<u8>> {
        let n = u32::try_from(value.len())
            .map_err(|_| Error::Codec("ciphertext count exceeds u32".into()))?;

        let mut elements = Vec::with_capacity(value.len());
        for ct in value {
            elements.push(bincode::serialize(ct)?);
        }

        if let Some(first) = elements.first() {
            let expected_len = first.len();
            if elements.iter().any(|e| e.len() != expected_len) {
                return Err(Error::Codec(
                    "ciphertext elements did not serialize to a uniform size".into(),
                ));
            }
        }

        let mut out = Vec::with_capacity(4 + elements.iter().map(Vec::len).sum::<usize>());
        out.extend_from_slice(&n.to_be_bytes());
        for element in elements {
            out.extend_from_slice(&element);
        }
        Ok(out)
    }

    /// Decodes a buffer produced by [`TfheCodec::encode`]. `params` must be
    /// `Some` — a codec invoked without a bound parameter set reports
    /// [`Error::ParamsUnbound`].
    pub fn decode(bytes: &[u8], params: Option<&TfheParams>) -> Result<TfheCtVec> {
        let _params = params.ok_or(Error::ParamsUnbound)?;

        if bytes.len() < 4 {
            return Err(Error::Codec("buffer too short to contain a count".into()));
        }
        let n = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let rest = &bytes[4..];

        if n == 0 {
            return if rest.is_empty() {
                Ok(Vec::new())
            } else {
                Err(Error::Codec("non-empty buffer for zero-length vector".into()))
            };
        }
        if rest.is_empty() || rest.len() % n != 0 {
            return Err(Error::Codec(
                "buffer length is not an even multiple of the element count".into(),
            ));
        }

        let element_len = rest.len() / n;
        let mut out = Vec::with_capacity(n);
        for chunk in rest.chunks_exact(element_len) {
            let ct: Ciphertext = bincode::deserialize(chunk)?;
            out.push(ct);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::context::SecurityLevel;

    #[test]
    fn round_trip_preserves_bit_values() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let bits = [true, false, false, true, true, true, false, false];
        let vec: TfheCtVec = bits.iter().map(|&b| ctx.encrypt_bit(b).unwrap()).collect();

        let encoded = TfheCodec::encode(&vec).unwrap();
        let decoded = TfheCodec::decode(&encoded, Some(&ctx)).unwrap();

        assert_eq!(decoded.len(), bits.len());
        for (ct, &expected) in decoded.iter().zip(bits.iter()) {
            assert_eq!(ctx.decrypt_bit(ct).unwrap(), expected);
        }
    }

    #[test]
    fn decode_without_params_is_rejected() {
        let bytes = vec![0, 0, 0, 0];
        let err = TfheCodec::decode(&bytes, None).unwrap_err();
        assert!(matches!(err, Error::ParamsUnbound));
    }

    #[test]
    fn empty_vector_round_trips() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let encoded = TfheCodec::encode(&Vec::new()).unwrap();
        let decoded = TfheCodec::decode(&encoded, Some(&ctx)).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn truncated_buffer_is_a_codec_error() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let vec: TfheCtVec = vec![ctx.encrypt_bit(true).unwrap(), ctx.encrypt_bit(false).unwrap()];
        let mut encoded = TfheCodec::encode(&vec).unwrap();
        encoded.truncate(encoded.len() - 1);
        assert!(TfheCodec::decode(&encoded, Some(&ctx)).is_err());
    }
}
