//! The data-plane transport and framing subsystem: the length-prefixed
//! [`framer`] shared by disk and wire, the per-path [`path_locks`] that make
//! [`spool`] safe under concurrent append/read, and the push/pull [`queue`]
//! transport.

pub mod framer;
pub mod path_locks;
pub mod queue;
pub mod spool;

pub use framer::{read_frame, write_frame, MAX_FRAME_LEN};
pub use queue::{Receiver, EOF, SOF};
pub use spool::{ByteSpoolReader, ByteSpoolWriter, TfheSpoolReader, TfheSpoolWriter};
