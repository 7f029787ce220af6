use std::io::{self, Write};

use smartdoc_core::{AlertTone, DeviceFeedback, FeedbackError};

/// A terminal has no vibration motor; the alert tone becomes the terminal bell.
#[derive(Debug, Default)]
pub struct TerminalFeedback {
    pub muted: bool,
}

impl DeviceFeedback for TerminalFeedback {
    fn vibrate(&mut self, _pattern_ms: &[u64]) -> Result<(), FeedbackError> {
        Err(FeedbackError::Unavailable("vibration"))
    }

    fn play_alert_tone(&mut self, tone: AlertTone) -> Result<(), FeedbackError> {
        if self.muted {
            return Err(FeedbackError::Unavailable("audio"));
        }
        tracing::debug!(frequency_hz = tone.frequency_hz, duration_ms = tone.duration_ms, "ringing terminal bell");

        // stderr is the ratatui backend; BEL doesn't move the cursor
        let mut stderr = io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|_| FeedbackError::Unavailable("audio"))
    }
}
