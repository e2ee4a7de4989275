//! Start form: raw text fields and their validation.

use std::time::Duration;

use crate::core::timecode::FrameRate;

/// Field validation failure. The shell shows one warning per failed start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    FrameRate(String),
    Interval(String),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::FrameRate(v) => {
                write!(f, "Frame rate must be a positive whole number (got {:?}).", v)
            }
            FormError::Interval(v) => {
                write!(f, "Interval must be a positive number of seconds (got {:?}).", v)
            }
        }
    }
}

impl std::error::Error for FormError {}

/// Text as typed by the operator. Not persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub frame_rate: String,
    pub interval: String,
}

impl FormState {
    pub fn new(frame_rate: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            frame_rate: frame_rate.into(),
            interval: interval.into(),
        }
    }

    /// Parse both fields; frame rate is checked first.
    pub fn validate(&self) -> Result<(FrameRate, Duration), FormError> {
        let frame_rate = self
            .frame_rate
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(FrameRate::new)
            .ok_or_else(|| FormError::FrameRate(self.frame_rate.clone()))?;

        let interval = self
            .interval
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .ok_or_else(|| FormError::Interval(self.interval.clone()))?;

        Ok((frame_rate, interval))
    }
}
