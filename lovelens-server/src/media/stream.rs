use bytes::Bytes;
use lovelens_core::StreamId;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// A still image as produced by the capture device (JPEG encoded).
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub jpeg: Bytes,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("jpeg_len", &self.jpeg.len())
            .finish()
    }
}

/// Producer half of a media stream. Only the latest frame is kept.
#[derive(Clone)]
pub struct StreamSource {
    id: StreamId,
    tx: Arc<watch::Sender<Option<Frame>>>,
    ended: Arc<AtomicBool>,
}

/// Receiving half of a media stream. Cheap to clone.
#[derive(Clone)]
pub struct MediaStream {
    id: StreamId,
    frames: watch::Receiver<Option<Frame>>,
    ended: Arc<AtomicBool>,
}

/// Creates a stream with no frame yet.
pub fn media_channel() -> (StreamSource, MediaStream) {
    let id = StreamId::new();
    let (tx, frames) = watch::channel(None);
    let ended = Arc::new(AtomicBool::new(false));

    let source = StreamSource {
        id,
        tx: Arc::new(tx),
        ended: ended.clone(),
    };
    let stream = MediaStream { id, frames, ended };
    (source, stream)
}

impl StreamSource {
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Publishes a frame. Returns false once the stream has ended.
    pub fn push(&self, frame: Frame) -> bool {
        if self.ended.load(Ordering::Acquire) {
            return false;
        }
        self.tx.send_replace(Some(frame));
        true
    }

    /// Ends the stream for every receiver, immediately.
    pub fn end(&self) {
        self.ended.store(true, Ordering::Release);
    }

    pub fn stream(&self) -> MediaStream {
        MediaStream {
            id: self.id,
            frames: self.tx.subscribe(),
            ended: self.ended.clone(),
        }
    }
}

impl MediaStream {
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// False once the producer ended the stream or went away.
    pub fn is_live(&self) -> bool {
        !self.ended.load(Ordering::Acquire) && self.frames.has_changed().is_ok()
    }

    /// True when a frame can be rendered right now.
    pub fn has_enough_data(&self) -> bool {
        self.is_live() && self.frames.borrow().is_some()
    }

    /// Latest frame, if the stream is live and has produced one.
    pub fn snapshot(&self) -> Option<Frame> {
        if !self.is_live() {
            return None;
        }
        self.frames.borrow().clone()
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}
