//! Per-device I/O tasks.
//!
//! Every successfully opened device gets one reader task and one writer task.
//! The reader splits the incoming byte stream on `'\n'` and hands each line to
//! the bridge loop tagged with the device index it captured at spawn time.
//! Lines longer than [`MAX_LINE_BYTES`] are dropped with a warning.
//! The writer drains a queue of outgoing frames; callers never wait for it.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::bridge::Event;
use crate::port::{DeviceStream, PortError};

/// Zero-based registry position; the address used on the wire.
pub type DeviceId = usize;

/// Longest line accepted from a device, excluding the `'\n'`.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

type Stream = Box<dyn DeviceStream>;

/// Handle to an open device connection.
#[derive(Debug)]
pub struct DeviceHandle {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl DeviceHandle {
    /// Split `stream` and spawn its reader and writer tasks.
    pub fn spawn(id: DeviceId, stream: Stream, events: mpsc::UnboundedSender<Event>) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        let (tx, rx) = mpsc::unbounded_channel();

        let reader = tokio::spawn(read_lines(id, read_half, events));
        let writer = tokio::spawn(write_frames(id, write_half, rx));

        Self { tx, reader, writer }
    }

    /// Queue bytes for the device. Returns once the bytes are queued.
    pub fn write(&self, data: Vec<u8>) -> Result<(), PortError> {
        self.tx.send(data).map_err(|_| PortError::NotOpen)
    }

    /// Stop the reader, flush queued writes and release the port.
    pub async fn close(self) {
        let Self { tx, reader, writer } = self;
        reader.abort();
        drop(tx);
        let _ = writer.await;
        let _ = reader.await;
    }
}

async fn read_lines(id: DeviceId, read_half: ReadHalf<Stream>, events: mpsc::UnboundedSender<Event>) {
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();
    let mut discarding = false;

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await;
        match read {
            Ok(0) => {
                debug!(device = id, "Device stream closed");
                break;
            }
            Ok(_) => {
                let terminated = buf.last() == Some(&b'\n');
                if discarding {
                    discarding = !terminated;
                    continue;
                }
                if !terminated {
                    if buf.len() > MAX_LINE_BYTES {
                        warn!(device = id, limit = MAX_LINE_BYTES, "Dropping oversize device line");
                        discarding = true;
                        continue;
                    }
                    debug!(device = id, bytes = buf.len(), "Dropping unterminated line at end of stream");
                    break;
                }
                buf.pop();
                let line = String::from_utf8_lossy(&buf).into_owned();
                if events.send(Event::DeviceLine { device: id, line }).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(device = id, error = %e, "Device read failed");
                break;
            }
        }
    }
}

async fn write_frames(id: DeviceId, mut write_half: WriteHalf<Stream>, mut rx: mpsc::UnboundedReceiver<Vec<u8>>) {
    while let Some(data) = rx.recv().await {
        let result = match write_half.write_all(&data).await {
            Ok(()) => write_half.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(device = id, error = %e, "Device write failed");
        }
    }

    if let Err(e) = write_half.shutdown().await {
        debug!(device = id, error = %e, "Device shutdown failed");
    }
}
