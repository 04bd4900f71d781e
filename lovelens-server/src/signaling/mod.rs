mod relay_frame;
mod switchboard;
mod ws_handler;

pub use relay_frame::*;
pub use switchboard::*;
pub use ws_handler::*;
