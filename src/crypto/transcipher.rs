//! Server-side transciphering (GLOSSARY: "the operation by which a server
//! converts a symmetric-cipher ciphertext into an FHE ciphertext of the same
//! plaintext, without learning the plaintext, using an FHE-encrypted form of
//! the symmetric key"). This is the Server's core per-batch step: turning a
//! publicly-visible Kreyvium ciphertext into an FHE ciphertext the Server
//! itself cannot decrypt.
//!
//! The Server never holds the Kreyvium key in the clear for this operation: it
//! re-runs [`crate::crypto::kreyvium::KreyviumState`]'s register update
//! homomorphically, seeded with TFHE-encrypted key bits, producing a
//! homomorphically-encrypted keystream. Each Kreyvium ciphertext bit `c_i` is
//! public (it arrived as a plaintext `0`/`1` byte from the Client), so
//! recovering `p_i = c_i XOR k_i` from the HE keystream bit `k_i` is just a
//! conditional NOT: `p_i = if c_i == 1 { NOT k_i } else { k_i }`.

use tfhe::boolean::{Ciphertext, ServerKey};

use crate::crypto::context::TfheParams;
use crate::crypto::kreyvium::{KreyviumBit, KreyviumState, IV_BITS, KEY_BITS};
use crate::crypto::tfhe_codec::TfheCtVec;
use crate::error::Result;

/// A `tfhe::boolean::Ciphertext` wrapped so it can serve as the bit type of a
/// generic [`KreyviumState`], with every gate routed through a [`ServerKey`].
#[derive(Clone)]
struct HomomorphicBit<'a> {
    ct: Ciphertext,
    server_key: &'a ServerKey,
}

impl<'a> KreyviumBit for HomomorphicBit<'a> {
    fn xor(&self, other: &Self) -> Self {
        Self {
            ct: self.server_key.xor(&self.ct, &other.ct),
            server_key: self.server_key,
        }
    }

    fn and(&self, other: &Self) -> Self {
        Self {
            ct: self.server_key.and(&self.ct, &other.ct),
            server_key: self.server_key,
        }
    }
}

fn lift_with<'a>(server_key: &'a ServerKey) -> impl Fn(bool) -> HomomorphicBit<'a> {
    move |bit| HomomorphicBit {
        ct: server_key.trivial_encrypt(bit),
        server_key,
    }
}

/// A homomorphically-encrypted Kreyvium key: one TFHE ciphertext per key bit,
/// encrypted by whichever party holds the Kreyvium secret (the Client, in
/// this harness's key-distribution model) and handed to the Server so it can
/// run the keystream generator without ever seeing the key in the clear.
pub struct HomomorphicKreyviumKey {
    bits: Vec<Ciphertext>,
}

impl HomomorphicKreyviumKey {
    /// Encrypts `key` bit-by-bit under `params`, which must hold the TFHE
    /// client key.
    pub fn encrypt(key: &[bool; KEY_BITS], params: &TfheParams) -> Result<Self> {
        let bits = key
            .iter()
            .map(|&bit| params.encrypt_bit(bit))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bits })
    }
}

/// Runs the Kreyvium keystream generator under TFHE gates and transciphers
/// Kreyvium ciphertext blocks into `TfheCtVec`s of the same bit length.
pub struct Transcipher<'a> {
    server_key: &'a ServerKey,
    he_key: &'a HomomorphicKreyviumKey,
    /// Public per Kreyvium's design, so it is lifted with non-noisy trivial
    /// encryptions rather than carried as ciphertext key material.
    iv: [bool; IV_BITS],
}

impl<'a> Transcipher<'a> {
    #[must_use]
    pub fn new(
        server_key: &'a ServerKey,
        he_key: &'a HomomorphicKreyviumKey,
        iv: [bool; IV_BITS],
    ) -> Self {
        Self {
            server_key,
            he_key,
            iv,
        }
    }

    /// Transciphers `kreyvium_ciphertext` (one byte per bit, as produced by
    /// [`crate::crypto::kreyvium::KreyviumCipher::encrypt_bits`]) into a
    /// `TfheCtVec` that decrypts, under the TTP's secret key, to the same
    /// plaintext bits the Client originally encrypted.
    pub fn he_decrypt(&self, kreyvium_ciphertext: &[u8]) -> TfheCtVec {
        let lift = lift_with(self.server_key);
        let key_bits: Vec<HomomorphicBit<'a>> = self
            .he_key
            .bits
            .iter()
            .map(|ct| HomomorphicBit {
                ct: ct.clone(),
                server_key: self.server_key,
            })
            .collect();

        let mut state = KreyviumState::init(&key_bits, &self.iv, &lift);
        kreyvium_ciphertext
            .iter()
            .map(|&public_bit| {
                let keystream_bit = state.clock(&lift);
                if public_bit != 0 {
                    self.server_key.not(&keystream_bit.ct)
                } else {
                    keystream_bit.ct
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::decryptor::decrypt_result;
    use crate::crypto::kreyvium::KreyviumCipher;

    #[test]
    fn transciphered_bits_decrypt_to_the_original_plaintext() {
        let tfhe_params = TfheParams::generate(crate::crypto::context::SecurityLevel::Default);
        let mut kreyvium_key = [false; KEY_BITS];
        for (i, bit) in kreyvium_key.iter_mut().enumerate() {
            *bit = i % 3 == 0;
        }
        let iv = [false; IV_BITS];

        let he_key = HomomorphicKreyviumKey::encrypt(&kreyvium_key, &tfhe_params).unwrap();
        let transcipher = Transcipher::new(tfhe_params.server_key(), &he_key, iv);

        let plaintext = [0xA5u8];
        let kreyvium_ciphertext =
            KreyviumCipher::new(kreyvium_key, iv).encrypt_block(&plaintext);

        let tfhe_ct_vec = transcipher.he_decrypt(&kreyvium_ciphertext);
        let recovered = decrypt_result(&tfhe_ct_vec, &tfhe_params).unwrap();
        assert_eq!(recovered, plaintext);
    }
}
