//! Call controller configuration

use std::time::Duration;

/// Configuration for the call session controller
///
/// Defaults: one-second duration ticks, and transcription result polling
/// bounded at 30 attempts two seconds apart (about a minute) before the
/// job is abandoned with a timeout error.
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// Interval of the duration counter while a call is connected
    pub tick_interval: Duration,
    /// Delay between transcription result polls
    pub transcription_poll_interval: Duration,
    /// Maximum number of transcription result polls per job
    pub transcription_max_attempts: u32,
}

impl Default for CallConfig {
    fn default() -> Self {
        CallConfig {
            tick_interval: Duration::from_secs(1),
            transcription_poll_interval: Duration::from_secs(2),
            transcription_max_attempts: 30,
        }
    }
}

impl CallConfig {
    /// Override the duration tick interval
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Override the transcription poll interval
    pub fn with_transcription_poll_interval(mut self, interval: Duration) -> Self {
        self.transcription_poll_interval = interval;
        self
    }

    /// Override the transcription poll attempt bound
    pub fn with_transcription_max_attempts(mut self, attempts: u32) -> Self {
        self.transcription_max_attempts = attempts;
        self
    }
}
