use async_trait::async_trait;
use lovelens_core::{Commentary, Language, Mode};
use thiserror::Error;

/// One frame to be judged, already base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub image_base64: String,
    pub mode: Mode,
    pub language: Language,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered {0}: {1}")]
    Status(u16, String),

    #[error("service returned no candidates")]
    EmptyResponse,

    #[error("unusable response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0}")]
    Service(String),
}

/// External image-analysis service producing announcer commentary.
#[async_trait]
pub trait InferenceService: Send + Sync + 'static {
    async fn analyze(&self, request: InferenceRequest) -> Result<Commentary, InferenceError>;
}
