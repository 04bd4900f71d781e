use crate::media::{MediaStream, StreamSource};
use async_trait::async_trait;
use lovelens_core::LensError;
use tokio::task::JoinHandle;

/// Which way the camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    User,
    #[default]
    Environment,
}

impl Facing {
    pub fn toggled(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }
}

/// A local video input that can be opened for a given facing.
#[async_trait]
pub trait CaptureDevice: Send + Sync + 'static {
    /// Opens the device. Permission refusals map to
    /// [`LensError::MediaPermissionDenied`].
    async fn open(&self, facing: Facing) -> Result<CaptureHandle, LensError>;
}

/// An opened capture. Dropping it ends the stream.
pub struct CaptureHandle {
    source: StreamSource,
    pump: Option<JoinHandle<()>>,
    facing: Facing,
}

impl CaptureHandle {
    pub fn new(source: StreamSource, facing: Facing) -> Self {
        Self {
            source,
            pump: None,
            facing,
        }
    }

    /// Attaches the task that feeds frames into `source`.
    pub fn with_pump(mut self, pump: JoinHandle<()>) -> Self {
        self.pump = Some(pump);
        self
    }

    pub fn stream(&self) -> MediaStream {
        self.source.stream()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.source.end();
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}
