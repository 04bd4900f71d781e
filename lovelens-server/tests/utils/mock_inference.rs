use async_trait::async_trait;
use lovelens_core::Commentary;
use lovelens_server::{InferenceError, InferenceRequest, InferenceService};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Inference service that replays scripted answers and records requests.
/// Once the script is exhausted every call fails.
#[derive(Clone, Default)]
pub struct MockInference {
    replies: Arc<Mutex<VecDeque<Result<Commentary, String>>>>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
    delay: Duration,
}

impl MockInference {
    /// A service that fails every request.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn replying(commentary: Commentary) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from([Ok(commentary)]))),
            ..Self::default()
        }
    }

    /// Each request takes `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl InferenceService for MockInference {
    async fn analyze(&self, request: InferenceRequest) -> Result<Commentary, InferenceError> {
        tracing::debug!("[MockInference] analyze in {} mode", request.mode);
        self.requests.lock().await.push(request);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.replies.lock().await.pop_front() {
            Some(Ok(commentary)) => Ok(commentary),
            Some(Err(message)) => Err(InferenceError::Service(message)),
            None => Err(InferenceError::Status(503, "model overloaded".into())),
        }
    }
}
