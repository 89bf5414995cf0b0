//! Process-wide immutable configuration. All three roles of a single
//! benchmarking run must agree on a [`Parameters`] value; nothing in this
//! crate mutates one after construction.

use serde::{Deserialize, Serialize};

/// Which of the two privacy-preserving pipelines a run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Client encrypts directly under TFHE; TTP decrypts.
    He,
    /// Client encrypts under Kreyvium; Server transciphers to TFHE; TTP decrypts.
    Hhe,
}

impl Variant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::He => "HE",
            Self::Hhe => "HHE",
        }
    }
}

/// Supported plaintext integer widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntBits {
    B8 = 8,
    B16 = 16,
    B32 = 32,
    B64 = 64,
    B128 = 128,
}

impl IntBits {
    #[must_use]
    pub fn bits(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn bytes(self) -> usize {
        self.bits() / 8
    }
}

/// How a batch's ciphertexts move from producer to consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataHandling {
    /// Every ciphertext is sent over the queue as soon as it is produced.
    AllAtOnce,
    /// Every ciphertext is appended to a local spool; nothing is sent.
    SingleComponent,
    /// Skip production; re-send the most recent Kreyvium spool over the queue.
    TransmitKreyvium,
    /// Skip production; re-send the most recent TFHE spool over the queue.
    TransmitTfhe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub variant: Variant,
    pub int_bits: IntBits,
    pub batch_size: usize,
    pub batch_count: usize,
    pub data_handling: DataHandling,
}

impl Parameters {
    /// Total number of integers produced across every batch of a run.
    #[must_use]
    pub fn total_integers(&self) -> usize {
        self.batch_size * self.batch_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_bits_byte_width() {
        assert_eq!(IntBits::B8.bytes(), 1);
        assert_eq!(IntBits::B128.bytes(), 16);
    }

    #[test]
    fn total_integers_is_batch_size_times_count() {
        let params = Parameters {
            variant: Variant::Hhe,
            int_bits: IntBits::B8,
            batch_size: 3,
            batch_count: 4,
            data_handling: DataHandling::SingleComponent,
        };
        assert_eq!(params.total_integers(), 12);
    }
}
