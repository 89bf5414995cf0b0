//! The Client, Server, and TTP batch state machines: the orchestration layer
//! that drives ciphertext production, transciphering, and decryption through
//! the transport/framing primitives in [`crate::transport`] and the
//! cryptographic capability surface in [`crate::crypto`].

pub mod client;
pub mod server;
pub mod ttp;

pub use client::Client;
pub use server::Server;
pub use ttp::Ttp;

use rand::RngCore;

/// Produces a uniformly random `IntegerBlock` of `byte_len` bytes.
fn random_integer_block(byte_len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}
