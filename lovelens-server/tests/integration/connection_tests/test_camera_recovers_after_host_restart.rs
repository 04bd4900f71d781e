use lovelens_core::Slot;
use lovelens_server::{CameraState, DisconnectReason, Switchboard};

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_camera, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_camera_recovers_after_host_restart() {
    init_tracing();

    let board = Switchboard::new();
    let host = create_test_host(&board, "ROOM1", MockInference::failing());
    let camera = create_test_camera(&board, "room1", Slot::Cam1);

    let first = wait_for_camera(&camera, "first call placed", |s| {
        s.state == CameraState::Connected && s.calls_placed == 1
    })
    .await
    .expect("Camera never called the first host");

    host.leave().await;

    let dropped = wait_for_camera(&camera, "link loss", |s| {
        s.state == CameraState::Disconnected
    })
    .await
    .expect("Camera never noticed the host leaving");
    assert_eq!(dropped.last_disconnect, Some(DisconnectReason::ChannelClosed));

    // Keeps retrying against an empty room
    wait_for_camera(&camera, "retries against missing host", |s| {
        s.last_disconnect == Some(DisconnectReason::HostUnreachable) && s.attempts >= 3
    })
    .await
    .expect("Camera stopped retrying");

    let host = create_test_host(&board, "ROOM1", MockInference::failing());

    let reconnected = wait_for_camera(&camera, "second call placed", |s| {
        s.state == CameraState::Connected && s.calls_placed == 2
    })
    .await
    .expect("Camera never called the new host");
    assert_eq!(reconnected.peer_id, first.peer_id);
    assert_eq!(reconnected.stream, first.stream, "Capture stream is unchanged");

    let status = wait_for_host(&host, "slot 1 online", |s| s.is_online(Slot::Cam1))
        .await
        .expect("New host never received the feed");
    assert_eq!(status.feeds[0], first.stream);

    camera.leave().await;
    host.leave().await;
}
