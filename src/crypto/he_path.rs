//! Direct TFHE encryption capability for the `HE` variant: the Client
//! encrypts each bit of an integer directly under its own client key, with no
//! Kreyvium or transciphering involved.

use tfhe::boolean::Ciphertext;

use crate::crypto::context::TfheParams;
use crate::crypto::kreyvium::bytes_to_bits;
use crate::crypto::tfhe_codec::TfheCtVec;
use crate::error::Result;

/// Encrypts `bytes` (an [`crate::params::IntBits`]-wide `IntegerBlock`,
/// MSB-first) bit-by-bit under `params`'s client key.
pub fn encrypt_block(bytes: &[u8], params: &TfheParams) -> Result<TfheCtVec> {
    bytes_to_bits(bytes)
        .into_iter()
        .map(|bit| params.encrypt_bit(bit))
        .collect::<Result<Vec<Ciphertext>>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::context::SecurityLevel;
    use crate::crypto::kreyvium::bits_to_bytes;

    #[test]
    fn encrypts_every_bit_of_the_block() {
        let ctx = TfheParams::generate(SecurityLevel::Default);
        let block = [0x5Au8];
        let ct_vec = encrypt_block(&block, &ctx).unwrap();
        assert_eq!(ct_vec.len(), 8);

        let bits: Vec<bool> = ct_vec.iter().map(|ct| ctx.decrypt_bit(ct).unwrap()).collect();
        assert_eq!(bits_to_bytes(&bits), block);
    }
}
