//! Edit-point stepping loop.
//!
//! For every edit point `E` after the cursor: playhead to `E`, wait, playhead
//! to `E-1`, wait, cursor = `E`. Ends when no edit point is left.
//!
//! Cancellation is cooperative and sampled only at iteration boundaries. The
//! two waits inside an iteration are not interrupted, so a stop request takes
//! effect after at most one full iteration (`2 x interval` plus host calls).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, error, info};

use crate::core::edit_points::{ScanOrder, TrackRef, next_edit_point};
use crate::core::host::{HostConnector, HostError, Timeline};
use crate::core::messages::{StatusMessage, StatusSender};
use crate::core::timecode::{FrameRate, TimecodeError, frames_to_timecode, timecode_to_frames};

/// Stop request shared between the UI thread and one worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Performs the pause after each playhead move
pub trait Pacer {
    fn wait(&mut self, duration: Duration);
}

/// Real pacer: blocks the worker thread.
#[derive(Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn wait(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Per-run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct StepperConfig {
    pub frame_rate: FrameRate,
    pub interval: Duration,
    pub track: TrackRef,
    pub scan_order: ScanOrder,
}

impl StepperConfig {
    pub fn new(frame_rate: FrameRate, interval: Duration) -> Self {
        Self {
            frame_rate,
            interval,
            track: TrackRef::default(),
            scan_order: ScanOrder::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Running,
    Stopping,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Walked past the last edit point
    Finished,
    /// Stop requested before the next iteration
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub edits_visited: usize,
    /// Last edit point processed (or the starting playhead)
    pub cursor: i64,
}

/// Errors that end a run after setup succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    Host(HostError),
    /// Host reported a playhead we cannot parse (e.g. drop-frame `;`)
    Timecode(TimecodeError),
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepError::Host(e) => write!(f, "{}", e),
            StepError::Timecode(e) => write!(f, "Unreadable playhead timecode: {}", e),
        }
    }
}

impl std::error::Error for StepError {}

impl From<HostError> for StepError {
    fn from(e: HostError) -> Self {
        StepError::Host(e)
    }
}

impl From<TimecodeError> for StepError {
    fn from(e: TimecodeError) -> Self {
        StepError::Timecode(e)
    }
}

/// One stepping run over an already-connected timeline
pub struct Stepper<'a> {
    config: StepperConfig,
    cancel: CancelToken,
    pacer: &'a mut dyn Pacer,
    state: StepState,
}

impl<'a> Stepper<'a> {
    pub fn new(config: StepperConfig, cancel: CancelToken, pacer: &'a mut dyn Pacer) -> Self {
        Self {
            config,
            cancel,
            pacer,
            state: StepState::Running,
        }
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    /// Step through every edit point after the current playhead.
    pub fn run(&mut self, timeline: &mut dyn Timeline) -> Result<RunReport, StepError> {
        let result = self.run_inner(timeline);
        self.state = StepState::Done;
        result
    }

    fn run_inner(&mut self, timeline: &mut dyn Timeline) -> Result<RunReport, StepError> {
        let fps = self.config.frame_rate;
        let start_tc = timeline.current_timecode()?;
        let mut cursor = timecode_to_frames(&start_tc, fps)?;
        let mut edits_visited = 0;

        info!(
            "Stepping from {} (frame {}) on {} track, {} every {:?}",
            start_tc, cursor, self.config.track, fps, self.config.interval
        );

        let outcome = loop {
            if self.cancel.is_cancelled() {
                self.state = StepState::Stopping;
                info!("Stop requested, leaving at frame {}", cursor);
                break RunOutcome::Cancelled;
            }

            let starts = timeline.item_starts(self.config.track)?;
            let Some(edit) = next_edit_point(starts, cursor, self.config.scan_order) else {
                info!("No edit point after frame {}", cursor);
                break RunOutcome::Finished;
            };

            self.visit(timeline, edit)?;
            edits_visited += 1;
            cursor = edit;
            debug!("Next lookup starts at frame {}", edit + 1);
        };

        Ok(RunReport { outcome, edits_visited, cursor })
    }

    /// Show the cut, then the frame before it.
    fn visit(&mut self, timeline: &mut dyn Timeline, edit: i64) -> Result<(), StepError> {
        let fps = self.config.frame_rate;

        timeline.set_current_timecode(&frames_to_timecode(edit, fps))?;
        info!("Moved to next edit point at frame: {}", edit);
        self.pacer.wait(self.config.interval);

        let previous = edit - 1;
        timeline.set_current_timecode(&frames_to_timecode(previous, fps))?;
        info!("Moved back one frame to: {}", previous);
        self.pacer.wait(self.config.interval);

        Ok(())
    }
}

/// Worker body: connect, step, report the terminal status.
///
/// Environment errors at connect time are printed to the console and queued
/// as [`StatusMessage::HostUnavailable`]; the shell treats that as fatal.
/// A cancelled run queues nothing.
pub fn run_session(
    connector: &dyn HostConnector,
    config: StepperConfig,
    cancel: CancelToken,
    pacer: &mut dyn Pacer,
    status: &StatusSender,
) -> Option<RunReport> {
    let mut timeline = match connector.connect() {
        Ok(t) => t,
        Err(e) => {
            error!("Host setup failed ({}): {}", connector.name(), e);
            eprintln!("{}", e);
            let _ = status.send(StatusMessage::HostUnavailable(e.to_string()));
            return None;
        }
    };

    let mut stepper = Stepper::new(config, cancel, pacer);
    match stepper.run(timeline.as_mut()) {
        Ok(report) => {
            info!(
                "Run ended: {:?} after {} edit point(s)",
                report.outcome, report.edits_visited
            );
            if report.outcome == RunOutcome::Finished {
                let _ = status.send(StatusMessage::Finished);
            }
            Some(report)
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            let _ = status.send(StatusMessage::Failed(e.to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::messages::MessageQueue;
    use crate::core::sim::{SimFailure, SimTimeline, SimulatedHost};

    fn fps25() -> FrameRate {
        FrameRate::new(25).unwrap()
    }

    fn config() -> StepperConfig {
        StepperConfig::new(fps25(), Duration::from_millis(500))
    }

    /// Records waits (with the number of moves seen so far) and can raise
    /// a cancel token after the n-th wait.
    struct RecordingPacer {
        host: SimulatedHost,
        waits: Vec<(Duration, usize)>,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl RecordingPacer {
        fn new(host: &SimulatedHost) -> Self {
            Self { host: host.clone(), waits: Vec::new(), cancel_after: None }
        }
    }

    impl Pacer for RecordingPacer {
        fn wait(&mut self, duration: Duration) {
            self.waits.push((duration, self.host.moves().len()));
            if let Some((n, token)) = &self.cancel_after {
                if self.waits.len() == *n {
                    token.cancel();
                }
            }
        }
    }

    fn move_frames(host: &SimulatedHost) -> Vec<i64> {
        host.moves()
            .iter()
            .map(|tc| timecode_to_frames(tc, fps25()).unwrap())
            .collect()
    }

    #[test]
    fn test_steps_each_edit_and_frame_before() {
        let host = SimulatedHost::new(SimTimeline::with_video_starts(vec![120, 300]));
        let queue = MessageQueue::new();
        let mut pacer = RecordingPacer::new(&host);

        let report = run_session(&host, config(), CancelToken::new(), &mut pacer, &queue.sender())
            .unwrap();

        assert_eq!(move_frames(&host), vec![120, 119, 300, 299]);
        let half = Duration::from_millis(500);
        assert_eq!(pacer.waits, vec![(half, 1), (half, 2), (half, 3), (half, 4)]);
        assert_eq!(report.outcome, RunOutcome::Finished);
        assert_eq!(report.edits_visited, 2);
        assert_eq!(report.cursor, 300);
        assert_eq!(queue.drain(), vec![StatusMessage::Finished]);
    }

    #[test]
    fn test_starts_from_current_playhead() {
        let mut tl = SimTimeline::with_video_starts(vec![0, 120, 300, 600]);
        tl.playhead = "00:00:04:20".to_string(); // frame 120
        let host = SimulatedHost::new(tl);
        let queue = MessageQueue::new();
        let mut pacer = RecordingPacer::new(&host);

        run_session(&host, config(), CancelToken::new(), &mut pacer, &queue.sender());

        assert_eq!(move_frames(&host), vec![300, 299, 600, 599]);
        assert_eq!(queue.drain(), vec![StatusMessage::Finished]);
    }

    #[test]
    fn test_no_edits_left_finishes_without_moves() {
        let mut tl = SimTimeline::with_video_starts(vec![0, 120]);
        tl.playhead = "00:00:10:00".to_string();
        let host = SimulatedHost::new(tl);
        let queue = MessageQueue::new();
        let mut pacer = RecordingPacer::new(&host);

        let report = run_session(&host, config(), CancelToken::new(), &mut pacer, &queue.sender())
            .unwrap();

        assert!(host.moves().is_empty());
        assert!(pacer.waits.is_empty());
        assert_eq!(report.edits_visited, 0);
        assert_eq!(queue.drain(), vec![StatusMessage::Finished]);
    }

    #[test]
    fn test_cancel_mid_iteration_finishes_iteration_then_stops() {
        let host = SimulatedHost::new(SimTimeline::with_video_starts(vec![120, 300, 600]));
        let queue = MessageQueue::new();
        let cancel = CancelToken::new();
        let mut pacer = RecordingPacer::new(&host);
        pacer.cancel_after = Some((1, cancel.clone()));

        let report = run_session(&host, config(), cancel, &mut pacer, &queue.sender()).unwrap();

        // Cancel raised during the first wait: the back-step still happens
        assert_eq!(move_frames(&host), vec![120, 119]);
        assert_eq!(pacer.waits.len(), 2);
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_cancel_before_start_moves_nothing() {
        let host = SimulatedHost::new(SimTimeline::with_video_starts(vec![120]));
        let queue = MessageQueue::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut pacer = RecordingPacer::new(&host);

        let report = run_session(&host, config(), cancel, &mut pacer, &queue.sender()).unwrap();

        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert!(host.moves().is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_setup_failure_is_host_unavailable() {
        let host = SimulatedHost::new(SimTimeline::with_video_starts(vec![120]));
        host.set_failure(Some(SimFailure::NoProject));
        let queue = MessageQueue::new();
        let mut pacer = RecordingPacer::new(&host);

        let report = run_session(&host, config(), CancelToken::new(), &mut pacer, &queue.sender());

        assert!(report.is_none());
        let msgs = queue.drain();
        assert_eq!(msgs, vec![StatusMessage::HostUnavailable(HostError::NoProject.to_string())]);
        assert!(msgs[0].is_fatal());
    }

    #[test]
    fn test_unparseable_playhead_fails_run() {
        let mut tl = SimTimeline::with_video_starts(vec![120]);
        tl.playhead = "00:00:00;00".to_string();
        let host = SimulatedHost::new(tl);
        let queue = MessageQueue::new();
        let mut pacer = RecordingPacer::new(&host);

        assert!(run_session(&host, config(), CancelToken::new(), &mut pacer, &queue.sender()).is_none());

        let msgs = queue.drain();
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0], StatusMessage::Failed(_)));
        assert!(!msgs[0].is_fatal());
    }

    #[test]
    fn test_stepper_state_transitions() {
        let host = SimulatedHost::new(SimTimeline::with_video_starts(vec![120]));
        let mut pacer = RecordingPacer::new(&host);
        let mut timeline = host.connect().unwrap();

        let mut stepper = Stepper::new(config(), CancelToken::new(), &mut pacer);
        assert_eq!(stepper.state(), StepState::Running);
        stepper.run(timeline.as_mut()).unwrap();
        assert_eq!(stepper.state(), StepState::Done);
    }

    #[test]
    fn test_sorted_scan_order_and_other_track() {
        use crate::core::edit_points::{TrackKind, TrackRef};
        use crate::core::sim::SimTrack;

        let tl = SimTimeline {
            playhead: "00:00:00:00".to_string(),
            tracks: vec![SimTrack { kind: TrackKind::Video, index: 2, starts: vec![300, 120] }],
            failure: None,
        };
        let host = SimulatedHost::new(tl);
        let queue = MessageQueue::new();
        let mut pacer = RecordingPacer::new(&host);
        let mut cfg = config();
        cfg.track = TrackRef::new(TrackKind::Video, 2);
        cfg.scan_order = ScanOrder::Sorted;

        run_session(&host, cfg, CancelToken::new(), &mut pacer, &queue.sender());

        assert_eq!(move_frames(&host), vec![120, 119, 300, 299]);
    }
}
