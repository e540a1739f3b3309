//! Voice capture pipelines
//!
//! Both capture sources speak the same command/event vocabulary, so the UI
//! does not care whether input comes from the timer-driven simulator or a
//! real recognizer session.

pub mod live;
pub mod simulated;

pub use live::{LiveCapture, Recognizer, RecognizerEvent};
pub use simulated::{SimulatedCapture, SimulatedCaptureConfig};

/// Commands accepted by a capture pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    /// Begin a capture session
    Start,
    /// End the session and emit its final transcript
    Stop,
    /// Abandon the session without emitting anything
    Cancel,
    /// Shut down the pipeline worker
    Shutdown,
}

/// Events emitted by a capture pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// Latest input level in [0, 1), for visualization only
    Level(f32),
    /// Latest transcript snapshot for the active session (live capture only)
    Partial(String),
    /// The session finished; carries the final transcript
    Final(String),
    /// The pipeline worker has shut down
    Shutdown,
}
