use lovelens_core::{Layout, Mode, Slot};
use lovelens_server::{CameraState, HostState, Switchboard};

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, settle, wait_for_camera, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_leave_releases_identity() {
    init_tracing();

    let board = Switchboard::new();
    let host = create_test_host(&board, "BYE", MockInference::failing());
    let camera = create_test_camera(&board, "BYE", Slot::Cam2);

    wait_for_host(&host, "slot 2 online", |s| s.is_online(Slot::Cam2))
        .await
        .expect("Feed never arrived");

    let camera_id = camera.peer_id().clone();
    let mut camera_status = camera.subscribe();
    camera.leave().await;

    assert!(!board.is_registered(&camera_id), "Camera id must be released");
    let last = camera_status.borrow_and_update().clone();
    assert_eq!(last.state, CameraState::Idle);
    assert_eq!(last.stream, None, "Capture must be released");

    let status = wait_for_host(&host, "camera gone", |s| {
        !s.is_online(Slot::Cam2) && s.connections == 0
    })
    .await
    .expect("Host kept the departed camera");
    assert_eq!(status.feeds, [None, None]);

    host.set_mode(Mode::Drink).await.unwrap();
    host.set_layout(Layout::FullCam1).await.unwrap();
    settle().await;

    let host_id = host.host_id().clone();
    let mut host_status = host.subscribe();
    host.leave().await;

    assert!(!board.is_registered(&host_id));
    let last = host_status.borrow_and_update().clone();
    assert_eq!(last.state, HostState::Idle);
    assert_eq!(last.mode, Mode::Kiss, "Mode resets with the session");
    assert_eq!(last.layout, Layout::Split, "Layout resets with the session");

    // The room can be hosted again right away
    let again = create_test_host(&board, "BYE", MockInference::failing());
    again.leave().await;
    assert_eq!(board.peer_count(), 0);
}
