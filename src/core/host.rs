//! Host application seam.
//!
//! The stepper never talks to Resolve directly: it receives a
//! [`HostConnector`] and asks it for a [`Timeline`] once per run. The live
//! connector lives in `core::resolve` (feature `resolve`), an in-memory one in
//! `core::sim`.

use crate::core::edit_points::TrackRef;

/// Errors raised by the host connector and timeline calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Scripting module could not be imported
    ModuleNotFound(String),
    /// Host application is not running / refused the connection
    NotRunning,
    /// No project is open
    NoProject,
    /// Project has no current timeline
    NoTimeline,
    /// A call into an open timeline failed
    Call(String),
}

impl HostError {
    /// Environment errors are fatal: they can only be fixed outside this program.
    pub fn is_environment(&self) -> bool {
        !matches!(self, HostError::Call(_))
    }
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::ModuleNotFound(e) => write!(
                f,
                "DaVinciResolveScript module not found ({}). Make sure DaVinci Resolve is installed and scripting is configured.",
                e
            ),
            HostError::NotRunning => {
                write!(f, "Could not connect to DaVinci Resolve. Make sure Resolve is running.")
            }
            HostError::NoProject => {
                write!(f, "No current project. Open a project in DaVinci Resolve.")
            }
            HostError::NoTimeline => write!(
                f,
                "Could not get the current timeline. Make sure an open project has a timeline."
            ),
            HostError::Call(e) => write!(f, "Host call failed: {}", e),
        }
    }
}

impl std::error::Error for HostError {}

/// Live handle to the host's current timeline.
///
/// Created and used on the worker thread only, so it need not be `Send`.
pub trait Timeline {
    /// Playhead position as `HH:MM:SS:FF`
    fn current_timecode(&mut self) -> Result<String, HostError>;

    /// Move the playhead. Visible in the host immediately; there is no undo.
    fn set_current_timecode(&mut self, timecode: &str) -> Result<(), HostError>;

    /// Start frames of the items on `track`, in host order
    fn item_starts(&mut self, track: TrackRef) -> Result<Vec<i64>, HostError>;
}

/// Factory for timelines. Shared between the UI thread and the worker.
pub trait HostConnector: Send + Sync {
    /// Short name for logs ("resolve", "simulated")
    fn name(&self) -> &'static str;

    /// Cheap check that the scripting layer is reachable at all.
    /// Called once at process start.
    fn probe(&self) -> Result<(), HostError>;

    /// Resolve app -> project manager -> current project -> current timeline.
    fn connect(&self) -> Result<Box<dyn Timeline>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_classification() {
        assert!(HostError::ModuleNotFound("x".into()).is_environment());
        assert!(HostError::NotRunning.is_environment());
        assert!(HostError::NoProject.is_environment());
        assert!(HostError::NoTimeline.is_environment());
        assert!(!HostError::Call("boom".into()).is_environment());
    }
}
