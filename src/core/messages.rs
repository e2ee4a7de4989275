//! Worker -> UI status channel.
//!
//! Single producer (the stepping worker), single consumer (the UI poll).
//! Unbounded FIFO: the worker never blocks on send.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use log::warn;

/// Terminal status of a run, shown to the operator as a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    /// No edit point left after the cursor
    Finished,
    /// Run aborted by a host call or timecode error
    Failed(String),
    /// Host/project/timeline unavailable at run start. Fatal.
    HostUnavailable(String),
}

impl StatusMessage {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StatusMessage::HostUnavailable(_))
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusMessage::Finished => write!(f, "Done! Reached the last edit point."),
            StatusMessage::Failed(e) => write!(f, "Stepping stopped: {}", e),
            StatusMessage::HostUnavailable(e) => f.write_str(e),
        }
    }
}

/// Cloneable producer half handed to the worker
pub type StatusSender = Sender<StatusMessage>;

/// Consumer half owned by the shell
pub struct MessageQueue {
    tx: StatusSender,
    rx: Receiver<StatusMessage>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> StatusSender {
        self.tx.clone()
    }

    /// Take every message queued so far, oldest first, without blocking.
    pub fn drain(&self) -> Vec<StatusMessage> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(msg) => out.push(msg),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Unreachable while we hold `tx`
                    warn!("Status channel disconnected");
                    break;
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
