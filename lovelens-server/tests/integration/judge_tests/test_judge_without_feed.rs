use lovelens_core::{Layout, LensError, Slot};
use lovelens_server::{CameraState, CaptureState, Switchboard, SyntheticCamera};

use crate::integration::{create_camera_with, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_camera};

#[tokio::test(start_paused = true)]
async fn test_judge_without_feed() {
    init_tracing();

    let board = Switchboard::new();
    let inference = MockInference::failing();
    let host = create_test_host(&board, "DARK", inference.clone());

    assert!(matches!(host.judge().await, Err(LensError::NoActiveFeed)));

    // A connected camera without video does not count as a feed
    let camera = create_camera_with(&board, "DARK", Slot::Cam1, SyntheticCamera::denied());
    wait_for_camera(&camera, "denied while connected", |s| {
        s.state == CameraState::Connected && s.capture == CaptureState::Denied
    })
    .await
    .expect("Camera never settled");

    host.set_layout(Layout::FullCam1).await.unwrap();
    assert!(matches!(host.judge().await, Err(LensError::NoActiveFeed)));

    assert_eq!(inference.request_count().await, 0, "Nothing to send without a frame");
    assert_eq!(host.status().commentary, None);

    camera.leave().await;
    host.leave().await;
}
