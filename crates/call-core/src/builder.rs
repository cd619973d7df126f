//! Builder for [`CallController`]

use std::sync::Arc;

use lingua_infra_common::time::{Clock, SystemClock};
use lingua_relay_core::UserId;

use crate::config::CallConfig;
use crate::controller::CallController;
use crate::providers::{RtcProvider, Transcriber, Translator};

/// Default capacity of the controller's event broadcast channel
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Builds a [`CallController`]
///
/// The RTC provider is mandatory; translation and transcription services
/// are optional, and the corresponding controller operations fail with a
/// configuration error when they are missing.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use lingua_call_core::{CallController, CallConfig, RtcProvider};
/// # use lingua_relay_core::UserId;
/// # fn example(rtc: Arc<dyn RtcProvider>) {
/// let controller = CallController::builder(UserId(1), rtc)
///     .with_config(CallConfig::default())
///     .build();
/// # }
/// ```
pub struct CallControllerBuilder {
    local_user: UserId,
    rtc: Arc<dyn RtcProvider>,
    translator: Option<Arc<dyn Translator>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    config: CallConfig,
    clock: Arc<dyn Clock>,
    event_capacity: usize,
}

impl CallControllerBuilder {
    pub fn new(local_user: UserId, rtc: Arc<dyn RtcProvider>) -> Self {
        CallControllerBuilder {
            local_user,
            rtc,
            translator: None,
            transcriber: None,
            config: CallConfig::default(),
            clock: SystemClock::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Attach a translation service
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Attach a speech-to-text service
    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Override the controller configuration
    pub fn with_config(mut self, config: CallConfig) -> Self {
        self.config = config;
        self
    }

    /// Inject a clock (tests use a manual clock for timestamps)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the event broadcast channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn build(self) -> Arc<CallController> {
        CallController::from_parts(
            self.local_user,
            self.rtc,
            self.translator,
            self.transcriber,
            self.config,
            self.clock,
            self.event_capacity,
        )
    }
}
