use std::time::Duration;

use lovelens_core::Slot;
use lovelens_server::{CameraState, CaptureState, Switchboard, SyntheticCamera};

use crate::integration::{create_camera_with, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_camera, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_capture_ready_after_connect() {
    init_tracing();

    let board = Switchboard::new();
    let host = create_test_host(&board, "SLOW", MockInference::failing());
    let device = SyntheticCamera::new().with_open_delay(Duration::from_secs(2));
    let camera = create_camera_with(&board, "SLOW", Slot::Cam1, device);

    let early = wait_for_camera(&camera, "connected", |s| s.state == CameraState::Connected)
        .await
        .expect("Camera never connected");
    assert_eq!(early.capture, CaptureState::Starting);
    assert_eq!(early.calls_placed, 0, "No call without a stream");

    let live = wait_for_camera(&camera, "call placed", |s| s.calls_placed == 1)
        .await
        .expect("Camera never called once capture was ready");
    assert_eq!(live.capture, CaptureState::Live);

    wait_for_host(&host, "slot 1 online", |s| s.is_online(Slot::Cam1))
        .await
        .expect("Host never received the late stream");
    assert_eq!(camera.status().calls_placed, 1);

    camera.leave().await;
    host.leave().await;
}
