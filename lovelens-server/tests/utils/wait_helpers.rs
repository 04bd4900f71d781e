use anyhow::{Context, Result};
use lovelens_server::{CameraHandle, CameraStatus, HostHandle, HostStatus};
use std::time::Duration;
use tokio::sync::watch;

/// Timeout for a session to reach an expected state (ms, virtual time).
pub const STATE_TIMEOUT_MS: u64 = 30_000;

/// Waits until the published value satisfies `pred`.
pub async fn wait_for_status<T: Clone>(
    rx: &mut watch::Receiver<T>,
    what: &str,
    pred: impl FnMut(&T) -> bool,
) -> Result<T> {
    let status = tokio::time::timeout(Duration::from_millis(STATE_TIMEOUT_MS), rx.wait_for(pred))
        .await
        .with_context(|| format!("Timeout waiting for {what}"))?
        .with_context(|| format!("Session ended while waiting for {what}"))?;
    Ok(status.clone())
}

pub async fn wait_for_camera(
    camera: &CameraHandle,
    what: &str,
    pred: impl FnMut(&CameraStatus) -> bool,
) -> Result<CameraStatus> {
    wait_for_status(&mut camera.subscribe(), what, pred).await
}

pub async fn wait_for_host(
    host: &HostHandle,
    what: &str,
    pred: impl FnMut(&HostStatus) -> bool,
) -> Result<HostStatus> {
    wait_for_status(&mut host.subscribe(), what, pred).await
}

/// Lets every spawned task run until it blocks.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
