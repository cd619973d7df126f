//! Collaborator seams
//!
//! The RTC session provider, translation service, and transcription
//! service are external black boxes consumed through these narrow async
//! traits. Implementations adapt a vendor SDK; tests substitute mocks.
//!
//! Providers report failures using the crate error taxonomy: credential
//! retrieval fails with [`CallError::Signaling`], joining fails with
//! [`CallError::MediaAccess`], and the language services fail with
//! [`CallError::Translation`] / [`CallError::Transcription`].
//!
//! [`CallError::Signaling`]: crate::error::CallError::Signaling
//! [`CallError::MediaAccess`]: crate::error::CallError::MediaAccess
//! [`CallError::Translation`]: crate::error::CallError::Translation
//! [`CallError::Transcription`]: crate::error::CallError::Transcription

use async_trait::async_trait;
use lingua_relay_core::UserId;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::SessionId;

/// Credentials required to join an RTC channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCredentials {
    /// Vendor application identifier
    pub app_id: String,
    /// Short-lived join token scoped to one channel
    pub token: String,
}

/// Handle to the local published media after a successful join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    /// Whether the local audio track is currently published
    pub audio_enabled: bool,
    /// Whether the local video track is currently published
    pub video_enabled: bool,
}

impl Default for MediaHandle {
    fn default() -> Self {
        MediaHandle {
            audio_enabled: true,
            video_enabled: true,
        }
    }
}

/// External real-time audio/video session provider
///
/// Join/leave/publish semantics only; remote-party activity comes back
/// through the event stream the wiring layer feeds into
/// [`CallController::handle_rtc_event`].
///
/// [`CallController::handle_rtc_event`]: crate::controller::CallController::handle_rtc_event
#[async_trait]
pub trait RtcProvider: Send + Sync + std::fmt::Debug {
    /// Obtain join credentials for a channel
    async fn get_join_credentials(
        &self,
        channel: &SessionId,
        user: UserId,
    ) -> Result<JoinCredentials>;

    /// Join the channel and begin publishing local media
    async fn join(
        &self,
        credentials: &JoinCredentials,
        channel: &SessionId,
        user: UserId,
    ) -> Result<MediaHandle>;

    /// Leave the current channel and release local media devices
    async fn leave(&self) -> Result<()>;

    /// Enable or disable the local audio track
    async fn set_local_audio_enabled(&self, enabled: bool) -> Result<()>;

    /// Enable or disable the local video track
    async fn set_local_video_enabled(&self, enabled: bool) -> Result<()>;
}

/// External text translation service
#[async_trait]
pub trait Translator: Send + Sync + std::fmt::Debug {
    /// Translate `text` into `target_language`
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

/// Identifier of a submitted transcription job
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionJobId(pub String);

impl std::fmt::Display for TranscriptionJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a transcription job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionStatus {
    /// Still processing; poll again later
    Pending,
    /// Finished with the recognized text
    Completed(String),
    /// The job failed upstream
    Failed(String),
}

/// External speech-to-text service
///
/// Submit-then-poll contract; the controller bounds the polling loop (see
/// [`CallConfig`](crate::config::CallConfig)).
#[async_trait]
pub trait Transcriber: Send + Sync + std::fmt::Debug {
    /// Submit recorded audio for transcription
    async fn submit(&self, audio: Vec<u8>) -> Result<TranscriptionJobId>;

    /// Check a submitted job
    async fn poll_result(&self, job: &TranscriptionJobId) -> Result<TranscriptionStatus>;
}
