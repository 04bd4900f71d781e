use lovelens_core::Slot;
use lovelens_server::{CaptureState, Facing, Switchboard, SyntheticCamera};

use crate::integration::{create_camera_with, create_test_host, init_tracing};
use crate::utils::{MockInference, RecordingCamera, wait_for_camera, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_facing_toggle_replaces_call() {
    init_tracing();

    let board = Switchboard::new();
    let host = create_test_host(&board, "FLIP", MockInference::failing());
    let device = RecordingCamera::new(SyntheticCamera::new());
    let camera = create_camera_with(&board, "FLIP", Slot::Cam1, device.clone());

    let before = wait_for_camera(&camera, "first call", |s| s.calls_placed == 1)
        .await
        .expect("Camera never called the host");
    assert_eq!(before.facing, Facing::Environment);
    wait_for_host(&host, "slot 1 online", |s| s.feeds[0] == before.stream)
        .await
        .expect("Host never received the first stream");

    camera.toggle_facing().await.unwrap();

    let after = wait_for_camera(&camera, "second call", |s| {
        s.calls_placed == 2 && s.capture == CaptureState::Live
    })
    .await
    .expect("Camera never called with the new stream");
    assert_eq!(after.facing, Facing::User);
    assert_ne!(after.stream, before.stream);

    let host_status = wait_for_host(&host, "new stream on slot 1", |s| {
        s.feeds[0] == after.stream
    })
    .await
    .expect("Host kept the old stream");
    assert!(host_status.is_online(Slot::Cam1));

    assert_eq!(device.opens().await, vec![Facing::Environment, Facing::User]);
    assert_eq!(camera.status().calls_placed, 2, "Exactly one call per stream");

    camera.leave().await;
    host.leave().await;
}
