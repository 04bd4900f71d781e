use lovelens_core::{Layout, LensError, Slot};
use lovelens_server::{CameraState, DisconnectReason, Switchboard};

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_camera, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_layout_last_command_wins() {
    init_tracing();

    let board = Switchboard::new();
    let host = create_test_host(&board, "LAYOUT", MockInference::failing());
    let cam1 = create_test_camera(&board, "LAYOUT", Slot::Cam1);
    let cam2 = create_test_camera(&board, "LAYOUT", Slot::Cam2);

    for camera in [&cam1, &cam2] {
        wait_for_camera(camera, "connected", |s| s.state == CameraState::Connected)
            .await
            .expect("Camera never connected");
    }

    // Either camera may put the other one on screen
    cam1.send_layout(Layout::FullCam2).await.unwrap();
    wait_for_host(&host, "full cam2", |s| s.layout == Layout::FullCam2)
        .await
        .expect("Host ignored cam1's command");

    cam2.send_layout(Layout::FullCam1).await.unwrap();
    wait_for_host(&host, "full cam1", |s| s.layout == Layout::FullCam1)
        .await
        .expect("Host ignored cam2's command");

    host.set_layout(Layout::Split).await.unwrap();
    wait_for_host(&host, "split", |s| s.layout == Layout::Split)
        .await
        .expect("Host ignored its own layout");

    // A camera in an empty room has no channel to send on
    let lonely = create_test_camera(&board, "EMPTY", Slot::Cam1);
    wait_for_camera(&lonely, "host unreachable", |s| {
        s.last_disconnect == Some(DisconnectReason::HostUnreachable)
    })
    .await
    .expect("Lonely camera never gave up its first attempt");
    assert!(matches!(
        lonely.send_layout(Layout::FullCam1).await,
        Err(LensError::ChannelNotOpen)
    ));
    assert_eq!(host.status().layout, Layout::Split);

    lonely.leave().await;
    cam1.leave().await;
    cam2.leave().await;
    host.leave().await;
}
