//! CUTSTEP - edit point QC stepper library
//!
//! Re-exports all modules for use by the binary target.

// Stepping engine (timecode, edit points, host seam, worker)
pub mod core;

// App modules
pub mod app;
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod runner;

// Re-export commonly used types from core
pub use self::core::host::{HostConnector, HostError, Timeline};
pub use self::core::stepper::{CancelToken, StepperConfig, run_session};
pub use self::core::timecode::{FrameRate, frames_to_timecode, timecode_to_frames};
pub use runner::run_app;
