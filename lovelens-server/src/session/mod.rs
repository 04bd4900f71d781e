mod camera_session;
mod host_session;
mod layout_director;
mod session_command;
mod session_config;

pub use camera_session::*;
pub use host_session::*;
pub use layout_director::*;
pub use session_command::*;
pub use session_config::*;

use crate::signaling::PeerEndpoint;
use crate::transport::PeerEvent;
use std::future::pending;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

/// Next broker event. Never resolves while unregistered.
async fn next_event(endpoint: &mut Option<PeerEndpoint>) -> Option<PeerEvent> {
    match endpoint {
        Some(endpoint) => endpoint.next_event().await,
        None => pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn join_opt<T>(task: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match task {
        Some(task) => task.await,
        None => pending().await,
    }
}
