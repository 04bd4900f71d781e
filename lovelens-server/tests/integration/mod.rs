pub mod connection_tests;
pub mod judge_tests;

use std::sync::Arc;

use tracing::Level;

use lovelens_core::{RoomCode, Slot};
use lovelens_server::{
    CameraHandle, CameraSession, CaptureDevice, HostHandle, HostSession, SessionConfig,
    Switchboard, SyntheticCamera,
};

use crate::utils::MockInference;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn room(code: &str) -> RoomCode {
    RoomCode::parse(code).expect("valid room code")
}

pub fn create_test_host(board: &Switchboard, code: &str, inference: MockInference) -> HostHandle {
    HostSession::spawn(board, room(code), SessionConfig::default(), Arc::new(inference))
        .expect("Failed to start host")
}

pub fn create_test_camera(board: &Switchboard, code: &str, slot: Slot) -> CameraHandle {
    create_camera_with(board, code, slot, SyntheticCamera::new())
}

pub fn create_camera_with(
    board: &Switchboard,
    code: &str,
    slot: Slot,
    device: impl CaptureDevice,
) -> CameraHandle {
    CameraSession::spawn(board, room(code), slot, SessionConfig::default(), Arc::new(device))
}
