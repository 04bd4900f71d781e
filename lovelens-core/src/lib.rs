pub mod error;
pub mod model;

pub use error::{LensError, ProtocolError};
pub use model::*;
