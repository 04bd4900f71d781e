use crate::media::{CaptureDevice, CaptureHandle, Facing, Frame, media_channel};
use async_trait::async_trait;
use bytes::Bytes;
use lovelens_core::LensError;
use std::time::Duration;

// Smallest well-formed JPEG: SOI followed by EOI.
const BLANK_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

/// Capture device that produces a fixed frame. Used by the demo and tests.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    frame: Frame,
    interval: Option<Duration>,
    open_delay: Duration,
    denied: bool,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            frame: Frame {
                width: 640,
                height: 480,
                jpeg: Bytes::from_static(BLANK_JPEG),
            },
            interval: None,
            open_delay: Duration::ZERO,
            denied: false,
        }
    }

    /// A device whose every open is refused by the user.
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::new()
        }
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Re-publishes the frame on a fixed interval instead of once.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for SyntheticCamera {
    async fn open(&self, facing: Facing) -> Result<CaptureHandle, LensError> {
        if !self.open_delay.is_zero() {
            tokio::time::sleep(self.open_delay).await;
        }
        if self.denied {
            return Err(LensError::MediaPermissionDenied);
        }

        let (source, _) = media_channel();
        source.push(self.frame.clone());
        let handle = CaptureHandle::new(source.clone(), facing);

        let Some(interval) = self.interval else {
            return Ok(handle);
        };

        let frame = self.frame.clone();
        let pump = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if !source.push(frame.clone()) {
                    break;
                }
            }
        });
        Ok(handle.with_pump(pump))
    }
}
