#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![allow(
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod keystore;
pub mod naming;
pub mod params;
pub mod perf;
pub mod roles;
pub mod transport;

pub use config::StorageRoot;
pub use error::{Error, Result};
pub use params::{DataHandling, IntBits, Parameters, Variant};
pub use perf::{MemorySnapshot, PerfLogger};
