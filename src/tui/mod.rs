//! Table rendering and the refresh loop.

mod app;
mod screen;

pub use app::{App, RunError};
pub use screen::{CaptureScreen, Screen, TermScreen};
