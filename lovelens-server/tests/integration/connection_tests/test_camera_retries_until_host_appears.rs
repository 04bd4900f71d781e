use std::time::Duration;

use lovelens_core::Slot;
use lovelens_server::{CameraState, DisconnectReason, Switchboard};
use tokio::time::Instant;

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_camera};

#[tokio::test(start_paused = true)]
async fn test_camera_retries_until_host_appears() {
    init_tracing();

    let board = Switchboard::new();
    let started = Instant::now();
    let camera = create_test_camera(&board, "PARTY", Slot::Cam2);

    let first = wait_for_camera(&camera, "host unreachable", |s| {
        s.last_disconnect == Some(DisconnectReason::HostUnreachable)
    })
    .await
    .expect("Camera never reported the missing host");
    assert_eq!(first.state, CameraState::Disconnected);
    assert_eq!(first.attempts, 1);

    // The host shows up while the camera waits out its retry delay
    let host = create_test_host(&board, "party", MockInference::failing());

    let connected = wait_for_camera(&camera, "camera connected", |s| {
        s.state == CameraState::Connected
    })
    .await
    .expect("Camera never connected after retry");

    assert_eq!(connected.attempts, 2, "Second attempt should succeed");
    assert_eq!(connected.peer_id, first.peer_id, "Identity must survive retries");
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert!(started.elapsed() < Duration::from_secs(6));

    camera.leave().await;
    host.leave().await;
}
