//! Worker thread lifecycle: at most one stepping run at a time.

use std::sync::Arc;
use std::thread;

use log::{debug, error, info};

use crate::core::host::HostConnector;
use crate::core::messages::StatusSender;
use crate::core::stepper::{CancelToken, StepperConfig, ThreadPacer, run_session};

#[derive(Debug)]
pub enum RunnerError {
    /// A run is still active; two workers would fight over one playhead
    AlreadyRunning,
    Spawn(std::io::Error),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerError::AlreadyRunning => write!(f, "Stepping is already running. Stop it first."),
            RunnerError::Spawn(e) => write!(f, "Failed to spawn worker thread: {}", e),
        }
    }
}

impl std::error::Error for RunnerError {}

/// Owns the stepping worker thread and its cancel token.
pub struct StepRunner {
    connector: Arc<dyn HostConnector>,
    handle: Option<thread::JoinHandle<()>>,
    cancel: CancelToken,
}

impl StepRunner {
    pub fn new(connector: Arc<dyn HostConnector>) -> Self {
        Self {
            connector,
            handle: None,
            cancel: CancelToken::new(),
        }
    }

    /// Worker exists and has not returned yet
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn a run with a fresh cancel token.
    pub fn start(&mut self, config: StepperConfig, status: StatusSender) -> Result<(), RunnerError> {
        if self.is_running() {
            return Err(RunnerError::AlreadyRunning);
        }
        self.reap();

        let cancel = CancelToken::new();
        let connector = Arc::clone(&self.connector);
        let worker_cancel = cancel.clone();

        info!(
            "Starting run: {}, interval {:?}, {} track",
            config.frame_rate, config.interval, config.track
        );

        let handle = thread::Builder::new()
            .name("cutstep-worker".to_string())
            .spawn(move || {
                debug!("Worker started");
                let mut pacer = ThreadPacer;
                run_session(connector.as_ref(), config, worker_cancel, &mut pacer, &status);
                debug!("Worker stopped");
            })
            .map_err(RunnerError::Spawn)?;

        self.cancel = cancel;
        self.handle = Some(handle);
        Ok(())
    }

    /// Raise the cancel token and block until the worker exits.
    ///
    /// No timeout: returns after at most one iteration unless the worker is
    /// stuck inside a host call. Returns `true` if a live worker was stopped.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        if was_running {
            info!("Stop requested, waiting for worker...");
            self.cancel.cancel();
        }
        self.reap();
        was_running
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Stepping worker panicked");
            }
        }
    }
}

impl Drop for StepRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
