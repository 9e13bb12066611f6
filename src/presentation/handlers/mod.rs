mod health;
mod index;
mod progress;
mod transcribe;

pub use health::health_handler;
pub use index::index_handler;
pub use progress::progress_handler;
pub use transcribe::{ErrorResponse, TranscribeResponse, transcribe_handler};
