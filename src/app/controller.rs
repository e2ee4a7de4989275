//! Shell logic behind the form: start, stop and the status poll.
//!
//! Kept free of egui so it can be driven from tests.

use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::app::form::FormState;
use crate::core::edit_points::{ScanOrder, TrackRef};
use crate::core::messages::MessageQueue;
use crate::core::runner::StepRunner;
use crate::core::stepper::StepperConfig;
use crate::dialogs::{DialogLevel, Notifier};

/// Status queue poll period
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Process exit code when the host cannot be reached
pub const EXIT_HOST_UNAVAILABLE: i32 = 1;

const TITLE_INFO: &str = "Info";
const TITLE_INVALID: &str = "Invalid input";

/// Fixed-period schedule for the status poll
#[derive(Debug, Clone)]
pub struct PollTimer {
    period: Duration,
    last: Option<Instant>,
}

impl PollTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// True at most once per period; the first call is always due.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// What the UI loop should do after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Continue,
    /// Host went away at run start: terminate with this code
    Exit(i32),
}

pub struct Controller<N: Notifier> {
    pub form: FormState,
    track: TrackRef,
    scan_order: ScanOrder,
    runner: StepRunner,
    queue: MessageQueue,
    notifier: N,
}

impl<N: Notifier> Controller<N> {
    pub fn new(runner: StepRunner, notifier: N, form: FormState) -> Self {
        Self {
            form,
            track: TrackRef::default(),
            scan_order: ScanOrder::default(),
            runner,
            queue: MessageQueue::new(),
            notifier,
        }
    }

    /// Track and scan order used for every run (CLI only, not on the form)
    pub fn with_target(mut self, track: TrackRef, scan_order: ScanOrder) -> Self {
        self.track = track;
        self.scan_order = scan_order;
        self
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Validate the form and spawn a worker. Returns `true` if a run started.
    pub fn start(&mut self) -> bool {
        let (frame_rate, interval) = match self.form.validate() {
            Ok(v) => v,
            Err(e) => {
                warn!("Rejected start: {}", e);
                self.notifier.warning(TITLE_INVALID, &format!("Please enter a valid frame rate and interval.\n{}", e));
                return false;
            }
        };

        let config = StepperConfig {
            frame_rate,
            interval,
            track: self.track,
            scan_order: self.scan_order,
        };

        match self.runner.start(config, self.queue.sender()) {
            Ok(()) => true,
            Err(e) => {
                warn!("Rejected start: {}", e);
                self.notifier.warning(TITLE_INFO, &e.to_string());
                false
            }
        }
    }

    /// Cancel and join the worker, then confirm to the operator.
    pub fn stop(&mut self) {
        self.runner.stop();
        self.notifier.info(TITLE_INFO, "Processing finished or paused.");
    }

    /// Drain every pending status message and show each one.
    pub fn poll(&mut self) -> PollOutcome {
        for msg in self.queue.drain() {
            if msg.is_fatal() {
                error!("{}", msg);
                self.notifier.notify(DialogLevel::Error, "Host unavailable", &msg.to_string());
                return PollOutcome::Exit(EXIT_HOST_UNAVAILABLE);
            }
            info!("Status: {}", msg);
            self.notifier.info(TITLE_INFO, &msg.to_string());
        }
        PollOutcome::Continue
    }
}
