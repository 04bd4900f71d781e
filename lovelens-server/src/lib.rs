mod judge;
mod media;
mod session;
mod signaling;
mod transport;

pub use judge::*;
pub use media::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
