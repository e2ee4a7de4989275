//! Stepping engine - timecode math, edit-point lookup, host seam, worker.
//!
//! Nothing in here depends on the UI.

pub mod edit_points;
pub mod host;
pub mod messages;
#[cfg(feature = "resolve")]
pub mod resolve;
pub mod runner;
pub mod sim;
pub mod stepper;
pub mod timecode;

// Re-exports for convenience
pub use edit_points::{ScanOrder, TrackKind, TrackRef, next_edit_point};
pub use host::{HostConnector, HostError, Timeline};
pub use messages::{MessageQueue, StatusMessage};
pub use runner::{RunnerError, StepRunner};
pub use stepper::{CancelToken, Pacer, StepperConfig, run_session};
pub use timecode::{FrameRate, Timecode, frames_to_timecode, timecode_to_frames};
