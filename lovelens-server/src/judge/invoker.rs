use crate::judge::{InferenceRequest, InferenceService};
use crate::media::Frame;
use crate::transport::SlotFeeds;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lovelens_core::{Commentary, Language, Layout, LensError, Mode, Slot};
use std::sync::Arc;
use tracing::{info, warn};

/// Turns the feed currently on screen into announcer commentary.
#[derive(Clone)]
pub struct JudgeInvoker {
    service: Arc<dyn InferenceService>,
}

impl JudgeInvoker {
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self { service }
    }

    /// The slot whose stream is on screen for `layout`. Split prefers slot 1
    /// while its stream is live.
    pub fn select_slot(layout: Layout, feeds: &SlotFeeds) -> Slot {
        match layout.focused_slot() {
            Some(slot) => slot,
            None if feeds.is_online(Slot::Cam1) => Slot::Cam1,
            None => Slot::Cam2,
        }
    }

    /// Grabs one still from the selected stream. Fails with `NoActiveFeed`
    /// unless the stream can render a frame right now.
    pub fn capture(layout: Layout, feeds: &SlotFeeds) -> Result<Frame, LensError> {
        let slot = Self::select_slot(layout, feeds);
        let stream = feeds.stream(slot).ok_or(LensError::NoActiveFeed)?;
        if !stream.has_enough_data() {
            return Err(LensError::NoActiveFeed);
        }
        stream.snapshot().ok_or(LensError::NoActiveFeed)
    }

    /// Asks the service about `frame`. Any failure yields the fallback record.
    pub async fn score(&self, frame: Frame, mode: Mode, language: Language) -> Commentary {
        let request = InferenceRequest {
            image_base64: STANDARD.encode(&frame.jpeg),
            mode,
            language,
        };

        let result = self
            .service
            .analyze(request)
            .await
            .map_err(|e| LensError::InferenceFailure(e.to_string()))
            .and_then(|commentary| commentary.validate(mode));

        match result {
            Ok(commentary) => {
                info!(mood = %commentary.mood, score = commentary.score, "Judge verdict");
                commentary
            }
            Err(e) => {
                warn!(error = %e, "Judging failed, showing fallback");
                Commentary::fallback()
            }
        }
    }
}
