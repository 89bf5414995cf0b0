//! Crate-wide error type. Every fallible operation in the data plane resolves to
//! one of these variants; role `main`s convert them into a log line and a
//! non-zero exit code rather than attempting recovery.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    IoBare(#[source] std::io::Error),

    #[error("corrupted frame: {0}")]
    CorruptedFrame(&'static str),

    #[error("tfhe codec error: {0}")]
    Codec(String),

    #[error("tfhe codec invoked without a bound parameter set")]
    ParamsUnbound,

    #[error("frame payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("failed to load key material from {path}: {reason}")]
    KeyLoad { path: PathBuf, reason: String },

    #[error("queue transport error on endpoint {endpoint}: {source}")]
    Queue {
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    #[error("a lock in this process was poisoned by a panicking thread")]
    LockPoisoned,
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}

impl From<bincode::Error> for Error {
    fn from(value: bincode::Error) -> Self {
        Self::Codec(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
