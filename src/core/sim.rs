//! In-memory host for rehearsal runs (`--simulate FILE`) and tests.
//!
//! The timeline lives behind `Arc<Mutex<..>>` so the UI thread, the worker
//! and tests can all look at the same playhead and move log.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::edit_points::{TrackKind, TrackRef};
use crate::core::host::{HostConnector, HostError, Timeline};

/// Setup failure to inject into [`SimulatedHost::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimFailure {
    NotRunning,
    NoProject,
    NoTimeline,
}

/// One track in a simulated timeline file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTrack {
    #[serde(default)]
    pub kind: TrackKind,
    #[serde(default = "default_track_index")]
    pub index: u32,
    /// Item start frames in the order the "host" reports them
    pub starts: Vec<i64>,
}

fn default_track_index() -> u32 {
    1
}

fn default_playhead() -> String {
    "00:00:00:00".to_string()
}

/// Simulated timeline document, as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTimeline {
    #[serde(default = "default_playhead")]
    pub playhead: String,
    #[serde(default)]
    pub tracks: Vec<SimTrack>,
    #[serde(default)]
    pub failure: Option<SimFailure>,
}

impl SimTimeline {
    /// Single video track 1 with the given start frames.
    pub fn with_video_starts(starts: Vec<i64>) -> Self {
        Self {
            playhead: default_playhead(),
            tracks: vec![SimTrack { kind: TrackKind::Video, index: 1, starts }],
            failure: None,
        }
    }

    pub fn from_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read simulated timeline: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid simulated timeline: {}", path.display()))
    }
}

#[derive(Debug)]
struct SimState {
    playhead: String,
    tracks: HashMap<TrackRef, Vec<i64>>,
    failure: Option<SimFailure>,
    moves: Vec<String>,
}

/// Shared in-memory host. Cloning shares the same document.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedHost {
    pub fn new(timeline: SimTimeline) -> Self {
        let tracks = timeline
            .tracks
            .into_iter()
            .map(|t| (TrackRef::new(t.kind, t.index), t.starts))
            .collect();
        Self {
            state: Arc::new(Mutex::new(SimState {
                playhead: timeline.playhead,
                tracks,
                failure: timeline.failure,
                moves: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Every timecode passed to `set_current_timecode`, oldest first
    pub fn moves(&self) -> Vec<String> {
        self.lock().moves.clone()
    }

    pub fn playhead(&self) -> String {
        self.lock().playhead.clone()
    }

    pub fn set_failure(&self, failure: Option<SimFailure>) {
        self.lock().failure = failure;
    }
}

impl HostConnector for SimulatedHost {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn probe(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn connect(&self) -> Result<Box<dyn Timeline>, HostError> {
        match self.lock().failure {
            Some(SimFailure::NotRunning) => return Err(HostError::NotRunning),
            Some(SimFailure::NoProject) => return Err(HostError::NoProject),
            Some(SimFailure::NoTimeline) => return Err(HostError::NoTimeline),
            None => {}
        }
        Ok(Box::new(SimHandle { host: self.clone() }))
    }
}

struct SimHandle {
    host: SimulatedHost,
}

impl Timeline for SimHandle {
    fn current_timecode(&mut self) -> Result<String, HostError> {
        Ok(self.host.playhead())
    }

    fn set_current_timecode(&mut self, timecode: &str) -> Result<(), HostError> {
        debug!("sim: playhead -> {}", timecode);
        let mut state = self.host.lock();
        state.playhead = timecode.to_string();
        state.moves.push(timecode.to_string());
        Ok(())
    }

    fn item_starts(&mut self, track: TrackRef) -> Result<Vec<i64>, HostError> {
        Ok(self.host.lock().tracks.get(&track).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeline_json() {
        let json = r#"{
            "playhead": "00:00:01:00",
            "tracks": [
                { "starts": [0, 120, 300] },
                { "kind": "audio", "index": 2, "starts": [50] }
            ]
        }"#;
        let tl: SimTimeline = serde_json::from_str(json).unwrap();
        assert_eq!(tl.playhead, "00:00:01:00");
        assert_eq!(tl.tracks[0].kind, TrackKind::Video);
        assert_eq!(tl.tracks[0].index, 1);
        assert_eq!(tl.tracks[1].kind, TrackKind::Audio);
        assert_eq!(tl.failure, None);
    }

    #[test]
    fn test_bundled_demo_timeline() {
        let tl: SimTimeline = serde_json::from_str(include_str!("../../demos/timeline.json")).unwrap();
        let host = SimulatedHost::new(tl);
        let mut timeline = host.connect().unwrap();
        let v2 = timeline.item_starts(TrackRef::new(TrackKind::Video, 2)).unwrap();
        assert_eq!(v2, vec![450, 200]);
    }

    #[test]
    fn test_failure_injection() {
        let host = SimulatedHost::new(SimTimeline::with_video_starts(vec![0]));
        host.set_failure(Some(SimFailure::NoTimeline));
        assert_eq!(host.connect().err(), Some(HostError::NoTimeline));
        host.set_failure(None);
        assert!(host.connect().is_ok());
    }

    #[test]
    fn test_moves_recorded_and_shared() {
        let host = SimulatedHost::new(SimTimeline::with_video_starts(vec![0, 10]));
        let mut tl = host.connect().unwrap();
        tl.set_current_timecode("00:00:00:10").unwrap();
        assert_eq!(host.playhead(), "00:00:00:10");
        assert_eq!(host.moves(), vec!["00:00:00:10".to_string()]);
        assert_eq!(tl.item_starts(TrackRef::default()).unwrap(), vec![0, 10]);
        assert!(tl.item_starts(TrackRef::new(TrackKind::Audio, 1)).unwrap().is_empty());
    }
}
