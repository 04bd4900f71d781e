use std::time::Duration;

use lovelens_core::{Commentary, Language, Mode, Slot};
use lovelens_server::Switchboard;
use tokio::time::Instant;

use crate::integration::{create_test_camera, create_test_host, init_tracing};
use crate::utils::{MockInference, wait_for_host};

#[tokio::test(start_paused = true)]
async fn test_judge_failure_shows_fallback() {
    init_tracing();

    let board = Switchboard::new();
    let inference = MockInference::failing();
    let host = create_test_host(&board, "OOPS", inference.clone());
    let camera = create_test_camera(&board, "OOPS", Slot::Cam1);

    wait_for_host(&host, "slot 1 online", |s| s.is_online(Slot::Cam1))
        .await
        .expect("Feed never arrived");

    let verdict = host.judge().await.expect("Judge should not fail outright");
    assert_eq!(verdict, Commentary::fallback());

    let shown = wait_for_host(&host, "commentary shown", |s| s.commentary.is_some())
        .await
        .expect("Fallback never shown");
    let shown_at = Instant::now();
    assert_eq!(shown.commentary, Some(Commentary::fallback()));
    assert!(!shown.analyzing);

    let requests = inference.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].mode, Mode::Kiss);
    assert_eq!(requests[0].language, Language::Th);
    assert!(!requests[0].image_base64.is_empty());

    tokio::time::sleep(Duration::from_millis(7_900)).await;
    assert!(host.status().commentary.is_some(), "Cleared too early");

    wait_for_host(&host, "commentary cleared", |s| s.commentary.is_none())
        .await
        .expect("Commentary never cleared");
    assert!(shown_at.elapsed() >= Duration::from_secs(8));
    assert!(shown_at.elapsed() < Duration::from_secs(9));

    camera.leave().await;
    host.leave().await;
}
