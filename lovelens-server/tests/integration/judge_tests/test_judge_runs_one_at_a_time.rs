use std::time::Duration;

use lovelens_core::{Commentary, LensError, Slot};
use lovelens_server::Switchboard;

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_judge_runs_one_at_a_time() {
    init_tracing();

    let board = Switchboard::new();
    let inference = MockInference::failing().with_delay(Duration::from_secs(2));
    let host = create_test_host(&board, "BUSY", inference.clone());
    let camera = create_test_camera(&board, "BUSY", Slot::Cam2);

    wait_for_host(&host, "slot 2 online", |s| s.is_online(Slot::Cam2))
        .await
        .expect("Feed never arrived");

    let (first, second) = tokio::join!(host.judge(), host.judge());
    assert_eq!(first.unwrap(), Commentary::fallback());
    assert!(matches!(second, Err(LensError::AnalysisInProgress)));
    assert_eq!(inference.request_count().await, 1);

    // Free again once the first verdict is in
    assert!(host.judge().await.is_ok());
    assert_eq!(inference.request_count().await, 2);

    camera.leave().await;
    host.leave().await;
}
