use lovelens_core::{Mode, Slot};
use lovelens_server::Switchboard;

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, settle, wait_for_camera, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_late_camera_gets_current_mode() {
    init_tracing();

    let board = Switchboard::new();
    let host = create_test_host(&board, "LATE", MockInference::failing());
    host.set_mode(Mode::Drink).await.unwrap();
    settle().await;
    wait_for_host(&host, "drink mode", |s| s.mode == Mode::Drink)
        .await
        .expect("Host ignored the mode change");

    let camera = create_test_camera(&board, "LATE", Slot::Cam2);
    let status = wait_for_camera(&camera, "mode from host", |s| s.mode.is_some())
        .await
        .expect("Late camera never got a mode");
    assert_eq!(status.mode, Some(Mode::Drink));

    camera.leave().await;
    host.leave().await;
}
