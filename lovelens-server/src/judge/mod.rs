mod commentary_board;
mod gemini;
mod inference;
mod invoker;

pub use commentary_board::*;
pub use gemini::*;
pub use inference::*;
pub use invoker::*;
