//! The cryptographic capability surface: TFHE, Kreyvium, and the transcipher
//! are external collaborators the core calls through a small, swappable
//! interface rather than depending on their internal math.

pub mod context;
pub mod decryptor;
pub mod he_path;
pub mod kreyvium;
pub mod tfhe_codec;
pub mod transcipher;

pub use context::{SecurityLevel, TfheParams};
pub use kreyvium::{KreyviumCipher, IV_BITS, KEY_BITS};
pub use tfhe_codec::{TfheCodec, TfheCtVec};
pub use transcipher::{HomomorphicKreyviumKey, Transcipher};
