use lovelens_core::Slot;
use lovelens_server::{CameraState, Switchboard};

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_camera, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_camera_joins_case_insensitive_room() {
    init_tracing();

    let board = Switchboard::new();
    let host = create_test_host(&board, "AB12", MockInference::failing());
    assert_eq!(host.host_id().as_str(), "lovelens-AB12-host");

    // Camera operator typed the code in lowercase
    let camera = create_test_camera(&board, "ab12", Slot::Cam1);

    let status = wait_for_camera(&camera, "camera connected", |s| {
        s.state == CameraState::Connected
    })
    .await
    .expect("Camera never connected");

    assert_eq!(status.attempts, 1, "First attempt should succeed");
    assert_eq!(status.host_id, *host.host_id());
    assert!(status.peer_id.as_str().starts_with("lovelens-AB12-cam1-"));
    assert!(status.peer_id.matches_slot(Slot::Cam1));

    wait_for_host(&host, "one open link", |s| s.connections == 1)
        .await
        .expect("Host never tracked the camera");

    camera.leave().await;
    host.leave().await;
}
