//! Call session lifecycle for LinguaCall
//!
//! This crate owns the client-side call state machine: one session at a
//! time moving through `Idle -> Calling -> Connected -> Ended`, driven by
//! local actions (start, end) and by typed events reported by the external
//! real-time-communication provider (remote joined, remote left, fatal
//! error). It also owns the per-call transcript of original/translated
//! utterance pairs and the one-second duration counter that runs while the
//! call is connected.
//!
//! The RTC provider, translation service, and transcription service are
//! consumed through narrow async traits ([`RtcProvider`], [`Translator`],
//! [`Transcriber`]); nothing in this crate talks to a real media stack or
//! vendor API, which is what makes the state machine unit-testable.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lingua_call_core::{CallController, CallPhase, RtcEvent, RtcProvider};
//! use lingua_relay_core::UserId;
//!
//! # async fn example(rtc: Arc<dyn RtcProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let controller = CallController::builder(UserId(1), rtc).build();
//!
//! controller.start(UserId(2), "en", "es").await?;
//! assert_eq!(controller.phase().await, CallPhase::Calling);
//!
//! // The wiring layer feeds provider callbacks in as typed events.
//! controller.handle_rtc_event(RtcEvent::RemoteJoined { remote_user: Some(UserId(2)) }).await;
//! assert_eq!(controller.phase().await, CallPhase::Connected);
//!
//! controller.end().await;
//! assert_eq!(controller.phase().await, CallPhase::Idle);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod providers;
pub mod transcript;
pub mod types;

pub use builder::CallControllerBuilder;
pub use config::CallConfig;
pub use controller::CallController;
pub use error::{CallError, Result};
pub use events::{CallEvent, RtcEvent};
pub use providers::{
    JoinCredentials, MediaHandle, RtcProvider, Transcriber, TranscriptionJobId,
    TranscriptionStatus, Translator,
};
pub use transcript::TranscriptEntry;
pub use types::{CallPhase, CallSessionState, SessionId};

// The relay and the call controller share one user-id space.
pub use lingua_relay_core::UserId;
