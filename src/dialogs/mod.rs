//! Modal message dialogs.
//!
//! The shell reports through [`Notifier`] so tests can count dialogs without
//! opening native windows.

use rfd::{MessageButtons, MessageDialog, MessageLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogLevel {
    Info,
    Warning,
    Error,
}

/// Blocking user notification
pub trait Notifier {
    fn notify(&self, level: DialogLevel, title: &str, text: &str);

    fn info(&self, title: &str, text: &str) {
        self.notify(DialogLevel::Info, title, text);
    }

    fn warning(&self, title: &str, text: &str) {
        self.notify(DialogLevel::Warning, title, text);
    }
}

/// Native message box. Blocks the calling (UI) thread until dismissed.
#[derive(Debug, Default)]
pub struct RfdNotifier;

impl Notifier for RfdNotifier {
    fn notify(&self, level: DialogLevel, title: &str, text: &str) {
        let level = match level {
            DialogLevel::Info => MessageLevel::Info,
            DialogLevel::Warning => MessageLevel::Warning,
            DialogLevel::Error => MessageLevel::Error,
        };
        let _ = MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(text)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
