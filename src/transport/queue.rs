//! Persistent push/pull message-queue socket pool. A process-wide singleton
//! owns one PUSH socket per endpoint; the downstream party connects a PULL
//! socket to it. Binding (rather than connecting) on the sender side means
//! Server/TTP connect upward to whichever party bound first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// Start-of-file/stream control frame. Sent only on the wire, never appended
/// to a spool.
pub const SOF: u8 = 0xFE;
/// End-of-file/stream control frame.
pub const EOF: u8 = 0xFF;

/// Bounded linger: an orderly process exit flushes at most this much queued
/// data before the socket is dropped.
const LINGER: Duration = Duration::from_millis(1000);

struct SenderPool {
    context: zmq::Context,
    sockets: Mutex<HashMap<String, Arc<Mutex<zmq::Socket>>>>,
}

impl SenderPool {
    fn new() -> Self {
        Self {
            context: zmq::Context::new(),
            sockets: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` with the push socket bound to `endpoint`, creating and binding
    /// it on first use.
    ///
    /// The pool-wide lock (`sockets`) is held only for the map
    /// lookup/insert below; it is released before `f` runs. Serialization of
    /// concurrent sends on the *same* endpoint is then provided by that
    /// endpoint's own per-socket lock, so two threads sending to distinct
    /// endpoints proceed fully in parallel.
    fn with_socket<F>(&self, endpoint: &str, f: F) -> Result<()>
    where
        F: FnOnce(&zmq::Socket) -> Result<()>,
    {
        let handle = {
            let mut sockets = self.sockets.lock()?;
            if !sockets.contains_key(endpoint) {
                let socket =
                    self.context
                        .socket(zmq::PUSH)
                        .map_err(|source| Error::Queue {
                            endpoint: endpoint.to_string(),
                            source,
                        })?;
                socket
                    .set_linger(LINGER.as_millis() as i32)
                    .map_err(|source| Error::Queue {
                        endpoint: endpoint.to_string(),
                        source,
                    })?;
                socket.bind(endpoint).map_err(|source| Error::Queue {
                    endpoint: endpoint.to_string(),
                    source,
                })?;
                tracing::debug!(endpoint, "bound push socket");
                sockets.insert(endpoint.to_string(), Arc::new(Mutex::new(socket)));
            }
            sockets.get(endpoint).expect("just inserted").clone()
        };

        let socket = handle.lock()?;
        f(&socket)
    }
}

static SENDER_POOL: Lazy<SenderPool> = Lazy::new(SenderPool::new);

/// Sends a single queue message containing exactly `bytes`. The queue provides
/// its own message framing; the 4-byte length prefix of
/// [`crate::transport::framer`] is not applied on the wire.
pub fn send(endpoint: &str, bytes: &[u8]) -> Result<()> {
    SENDER_POOL.with_socket(endpoint, |socket| {
        socket.send(bytes, 0).map_err(|source| Error::Queue {
            endpoint: endpoint.to_string(),
            source,
        })
    })
}

/// Sends the one-byte SOF control frame.
pub fn send_sof(endpoint: &str) -> Result<()> {
    send(endpoint, &[SOF])
}

/// Sends the one-byte EOF control frame.
pub fn send_eof(endpoint: &str) -> Result<()> {
    send(endpoint, &[EOF])
}

/// A standalone PULL socket that drains messages from a bound upstream
/// endpoint and persists each data message into a byte spool.
pub struct Receiver {
    context: zmq::Context,
    socket: zmq::Socket,
}

impl Receiver {
    /// Connects to `endpoint` (the remote party's bound address).
    pub fn connect(endpoint: &str) -> Result<Self> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PULL).map_err(|source| Error::Queue {
            endpoint: endpoint.to_string(),
            source,
        })?;
        socket.connect(endpoint).map_err(|source| Error::Queue {
            endpoint: endpoint.to_string(),
            source,
        })?;
        tracing::debug!(endpoint, "connected pull socket");
        Ok(Self { context, socket })
    }

    /// Drains messages into `writer` until either `max_messages` data frames
    /// have been persisted, or (when `expect_eof_frame` is set) the EOF control
    /// frame arrives. SOF control frames are skipped and never persisted.
    ///
    /// Returns the count of persisted data frames.
    pub fn receive_and_store(
        &self,
        writer: &crate::transport::spool::ByteSpoolWriter,
        max_messages: usize,
        expect_eof_frame: bool,
    ) -> Result<usize> {
        let mut persisted = 0;
        while persisted < max_messages {
            let message = self
                .socket
                .recv_bytes(0)
                .map_err(|source| Error::Queue {
                    endpoint: String::new(),
                    source,
                })?;

            if message.len() == 1 && message[0] == SOF {
                continue;
            }
            if expect_eof_frame && message.len() == 1 && message[0] == EOF {
                break;
            }

            writer.append(&message)?;
            persisted += 1;
        }
        Ok(persisted)
    }

    #[must_use]
    pub fn context(&self) -> &zmq::Context {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::spool::ByteSpoolWriter;
    use std::thread;
    use std::time::Duration;

    // Distinct ports per test so the process-wide `SENDER_POOL` never binds
    // the same endpoint twice with conflicting expectations.
    fn endpoint(port: u16) -> (String, String) {
        (
            format!("tcp://*:{port}"),
            format!("tcp://127.0.0.1:{port}"),
        )
    }

    #[test]
    fn send_then_receive_preserves_order_and_content() {
        let (bind, connect) = endpoint(28901);
        let dir = tempfile::tempdir().unwrap();
        let spool_path = dir.path().join("spool.bin");
        let writer = ByteSpoolWriter::new(&spool_path);

        send_sof(&bind).unwrap();
        // Give the PUSH socket a moment to bind before PULL connects.
        thread::sleep(Duration::from_millis(50));
        let receiver = Receiver::connect(&connect).unwrap();

        let handle = thread::spawn(move || {
            receiver.receive_and_store(&writer, 3, false).unwrap()
        });

        thread::sleep(Duration::from_millis(50));
        send(&bind, b"one").unwrap();
        send(&bind, b"two").unwrap();
        send(&bind, b"three").unwrap();

        let persisted = handle.join().unwrap();
        assert_eq!(persisted, 3);

        let mut reader = crate::transport::spool::ByteSpoolReader::new(&spool_path);
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().unwrap() {
            frames.push(frame);
        }
        assert_eq!(
            frames,
            vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn eof_stops_reception_before_the_message_count_bound() {
        let (bind, connect) = endpoint(28902);
        let dir = tempfile::tempdir().unwrap();
        let spool_path = dir.path().join("spool.bin");
        let writer = ByteSpoolWriter::new(&spool_path);

        send_sof(&bind).unwrap();
        thread::sleep(Duration::from_millis(50));
        let receiver = Receiver::connect(&connect).unwrap();

        let handle = thread::spawn(move || receiver.receive_and_store(&writer, 10, true).unwrap());

        thread::sleep(Duration::from_millis(50));
        send(&bind, b"a").unwrap();
        send(&bind, b"b").unwrap();
        send(&bind, b"c").unwrap();
        send_eof(&bind).unwrap();

        let persisted = handle.join().unwrap();
        assert_eq!(persisted, 3, "EOF before the count bound should stop reception early");
    }
}
