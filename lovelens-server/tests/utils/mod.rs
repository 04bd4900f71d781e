pub mod mock_capture;
pub mod mock_inference;
pub mod probe_peer;
pub mod wait_helpers;

pub use mock_capture::*;
pub use mock_inference::*;
pub use probe_peer::*;
pub use wait_helpers::*;
