//! Non-drop-frame timecode <-> absolute frame conversion.
//!
//! Timecodes are `HH:MM:SS:FF` with every field zero-padded to two digits.
//! `FF < fps` is assumed but never enforced: out-of-range input converts to
//! an out-of-range (yet non-panicking) result instead of an error.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Integer frames-per-second. Zero is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate(NonZeroU32);

impl FrameRate {
    pub fn new(fps: u32) -> Option<Self> {
        NonZeroU32::new(fps).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn per_second(self) -> i64 {
        i64::from(self.0.get())
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.0)
    }
}

/// Timecode parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimecodeError {
    /// String did not split into exactly four `:`-separated fields
    FieldCount(usize),
    /// A field was not an integer
    InvalidField { field: &'static str, value: String },
    /// Frame count does not fit in 64 bits
    Overflow,
}

impl fmt::Display for TimecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimecodeError::FieldCount(n) => {
                write!(f, "Expected 4 timecode fields (HH:MM:SS:FF), got {}", n)
            }
            TimecodeError::InvalidField { field, value } => {
                write!(f, "Invalid {} field in timecode: {:?}", field, value)
            }
            TimecodeError::Overflow => write!(f, "Timecode overflows frame counter"),
        }
    }
}

impl std::error::Error for TimecodeError {}

const FIELD_NAMES: [&str; 4] = ["hours", "minutes", "seconds", "frames"];

/// Decomposed timecode. Fields are signed so that any frame count maps to
/// *some* timecode; valid timecodes have all fields non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timecode {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub frames: i64,
}

impl Timecode {
    pub fn new(hours: i64, minutes: i64, seconds: i64, frames: i64) -> Self {
        Self { hours, minutes, seconds, frames }
    }

    /// Absolute frame offset at `fps`: `((h*3600 + m*60 + s) * fps) + f`.
    pub fn to_frames(&self, fps: FrameRate) -> Result<i64, TimecodeError> {
        let fps = fps.per_second();
        self.hours
            .checked_mul(3600)
            .and_then(|h| self.minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(self.seconds))
            .and_then(|secs| secs.checked_mul(fps))
            .and_then(|f| f.checked_add(self.frames))
            .ok_or(TimecodeError::Overflow)
    }

    /// Split an absolute frame count by successive floor division.
    ///
    /// Negative input never panics; it produces a negative hours field
    /// (e.g. `-1` at 25 fps is `-1:59:59:24`).
    pub fn from_frames(frames: i64, fps: FrameRate) -> Self {
        let fps = fps.per_second();
        let per_hour = 3600 * fps;
        let per_minute = 60 * fps;

        let hours = frames.div_euclid(per_hour);
        let rest = frames.rem_euclid(per_hour);
        let minutes = rest / per_minute;
        let rest = rest % per_minute;

        Self {
            hours,
            minutes,
            seconds: rest / fps,
            frames: rest % fps,
        }
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 {
            return Err(TimecodeError::FieldCount(parts.len()));
        }

        let mut fields = [0i64; 4];
        for (i, part) in parts.iter().enumerate() {
            fields[i] = part.trim().parse().map_err(|_| TimecodeError::InvalidField {
                field: FIELD_NAMES[i],
                value: part.to_string(),
            })?;
        }

        let [hours, minutes, seconds, frames] = fields;
        Ok(Self { hours, minutes, seconds, frames })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Parse `HH:MM:SS:FF` and convert to an absolute frame count.
pub fn timecode_to_frames(timecode: &str, fps: FrameRate) -> Result<i64, TimecodeError> {
    timecode.parse::<Timecode>()?.to_frames(fps)
}

/// Format an absolute frame count as `HH:MM:SS:FF`.
pub fn frames_to_timecode(frames: i64, fps: FrameRate) -> String {
    Timecode::from_frames(frames, fps).to_string()
}
