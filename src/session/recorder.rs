use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

/// Finalized recording: opaque encoded audio plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioBlob {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Scoped microphone acquisition.
///
/// Release is guaranteed on every exit path: explicit stop, error, or the
/// handle simply going out of scope.
pub struct CaptureHandle {
    released: Arc<AtomicBool>,
}

impl CaptureHandle {
    pub fn acquire() -> Self {
        Self {
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    /// Observer for the release state; used where the stream's consumer
    /// outlives the handle's owner.
    pub fn monitor(&self) -> CaptureMonitor {
        CaptureMonitor {
            released: Arc::clone(&self.released),
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Clone)]
pub struct CaptureMonitor {
    released: Arc<AtomicBool>,
}

impl CaptureMonitor {
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Accumulates encoded audio chunks into a single in-memory blob.
pub struct Recorder {
    mime: String,
    chunks: Vec<Vec<u8>>,
}

impl Recorder {
    pub fn new(mime: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            chunks: Vec::new(),
        }
    }

    /// Consume chunks until the sender closes the channel, then finalize.
    /// Zero received chunks still produce a (possibly empty) blob.
    pub async fn record(mut self, mut chunk_rx: mpsc::Receiver<Vec<u8>>) -> AudioBlob {
        while let Some(chunk) = chunk_rx.recv().await {
            self.push(chunk);
        }
        self.finish()
    }

    /// Empty chunks are dropped, matching a capture source that reports
    /// zero-length data events.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    pub fn finish(self) -> AudioBlob {
        let bytes: Vec<u8> = self.chunks.concat();
        info!(
            "Recording finalized: {:.2} KB ({})",
            bytes.len() as f64 / 1024.0,
            self.mime
        );
        AudioBlob {
            bytes,
            mime: self.mime,
        }
    }
}
