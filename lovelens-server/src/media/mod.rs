mod capture;
mod stream;
mod synthetic;

pub use capture::*;
pub use stream::*;
pub use synthetic::*;
