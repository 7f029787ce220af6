//! Device feedback used after an emergency has been acknowledged.
//!
//! Both effects are best-effort. Callers log and drop any [`FeedbackError`].

use crate::error::FeedbackError;

/// Vibrate / pause / vibrate ... in milliseconds.
pub const EMERGENCY_VIBRATION_MS: [u64; 5] = [200, 100, 200, 100, 200];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertTone {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub gain: f32,
}

pub const EMERGENCY_TONE: AlertTone = AlertTone {
    frequency_hz: 800.0,
    duration_ms: 500,
    gain: 0.3,
};

pub trait DeviceFeedback: Send {
    fn vibrate(&mut self, pattern_ms: &[u64]) -> Result<(), FeedbackError>;
    fn play_alert_tone(&mut self, tone: AlertTone) -> Result<(), FeedbackError>;
}

/// For targets without a vibration motor or speaker.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedback;

impl DeviceFeedback for NoopFeedback {
    fn vibrate(&mut self, _pattern_ms: &[u64]) -> Result<(), FeedbackError> {
        Ok(())
    }

    fn play_alert_tone(&mut self, _tone: AlertTone) -> Result<(), FeedbackError> {
        Ok(())
    }
}
