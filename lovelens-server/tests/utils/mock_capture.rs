use async_trait::async_trait;
use lovelens_core::LensError;
use lovelens_server::{CaptureDevice, CaptureHandle, Facing, SyntheticCamera};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Wraps a [`SyntheticCamera`] and records every facing it was opened with.
#[derive(Clone)]
pub struct RecordingCamera {
    inner: SyntheticCamera,
    opens: Arc<Mutex<Vec<Facing>>>,
}

impl RecordingCamera {
    pub fn new(inner: SyntheticCamera) -> Self {
        Self {
            inner,
            opens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn opens(&self) -> Vec<Facing> {
        self.opens.lock().await.clone()
    }
}

#[async_trait]
impl CaptureDevice for RecordingCamera {
    async fn open(&self, facing: Facing) -> Result<CaptureHandle, LensError> {
        self.opens.lock().await.push(facing);
        self.inner.open(facing).await
    }
}
