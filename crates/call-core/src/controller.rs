//! The call session controller
//!
//! One controller manages one call at a time for the local user, from
//! initiation through teardown. Lifecycle transitions happen in exactly
//! two places: local actions ([`CallController::start`] /
//! [`CallController::end`]) and provider events fed through
//! [`CallController::handle_rtc_event`]. Stray events outside their legal
//! phase are ignored.
//!
//! Teardown is idempotent and runs every cleanup step even when one of
//! them fails: the duration timer is owned by a guard whose drop aborts
//! the tick task, and a failed RTC leave is logged rather than allowed to
//! block the transcript clear and phase reset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lingua_infra_common::time::Clock;
use lingua_relay_core::UserId;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::CallConfig;
use crate::error::{CallError, Result};
use crate::events::{CallEvent, RtcEvent};
use crate::providers::{
    MediaHandle, RtcProvider, Transcriber, TranscriptionStatus, Translator,
};
use crate::transcript::TranscriptEntry;
use crate::types::{CallPhase, CallSessionState, SessionId};

/// Owns the duration tick task; dropping the guard aborts it
///
/// Every teardown path releases the timer by dropping this guard, so the
/// periodic work cannot leak past the call that started it.
struct TimerGuard {
    handle: JoinHandle<()>,
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Inner {
    session: CallSessionState,
    transcript: Vec<TranscriptEntry>,
    media: Option<MediaHandle>,
    timer: Option<TimerGuard>,
    /// Bumped by every `start` and `end`; an in-flight `start` that
    /// resumes to find a different generation was cancelled and must
    /// abandon the attempt.
    generation: u64,
}

/// Client-side call lifecycle state machine
///
/// See the crate docs for the phase diagram. Constructed through
/// [`CallController::builder`].
pub struct CallController {
    pub(crate) local_user: UserId,
    pub(crate) rtc: Arc<dyn RtcProvider>,
    pub(crate) translator: Option<Arc<dyn Translator>>,
    pub(crate) transcriber: Option<Arc<dyn Transcriber>>,
    pub(crate) config: CallConfig,
    pub(crate) clock: Arc<dyn Clock>,
    inner: RwLock<Inner>,
    elapsed: Arc<AtomicU64>,
    event_tx: broadcast::Sender<CallEvent>,
}

impl CallController {
    /// Start building a controller for `local_user`
    pub fn builder(
        local_user: UserId,
        rtc: Arc<dyn RtcProvider>,
    ) -> crate::builder::CallControllerBuilder {
        crate::builder::CallControllerBuilder::new(local_user, rtc)
    }

    pub(crate) fn from_parts(
        local_user: UserId,
        rtc: Arc<dyn RtcProvider>,
        translator: Option<Arc<dyn Translator>>,
        transcriber: Option<Arc<dyn Transcriber>>,
        config: CallConfig,
        clock: Arc<dyn Clock>,
        event_capacity: usize,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(event_capacity);
        Arc::new(CallController {
            local_user,
            rtc,
            translator,
            transcriber,
            config,
            clock,
            inner: RwLock::new(Inner {
                session: CallSessionState::idle(local_user),
                transcript: Vec::new(),
                media: None,
                timer: None,
                generation: 0,
            }),
            elapsed: Arc::new(AtomicU64::new(0)),
            event_tx,
        })
    }

    /// Subscribe to controller notifications
    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.event_tx.subscribe()
    }

    /// Current lifecycle phase
    pub async fn phase(&self) -> CallPhase {
        self.inner.read().await.session.phase
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> CallSessionState {
        let inner = self.inner.read().await;
        let mut snapshot = inner.session.clone();
        if snapshot.phase == CallPhase::Connected {
            snapshot.elapsed_seconds = self.elapsed.load(Ordering::Relaxed);
        }
        snapshot
    }

    /// Seconds of connected call time so far
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// Snapshot of the current transcript
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.inner.read().await.transcript.clone()
    }

    /// Initiate (or accept) a call to `remote`
    ///
    /// Forces any existing non-idle session down first; only one active
    /// session exists per client. Transitions to `Calling`, then awaits
    /// join credentials and local media from the RTC provider. Both waits
    /// are cancellable: if [`end`](Self::end) runs while this is
    /// suspended, the attempt is abandoned (releasing any media already
    /// acquired) and `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// * [`CallError::Signaling`] - credential/token retrieval failed
    /// * [`CallError::MediaAccess`] - camera/microphone denied or join failed
    ///
    /// Both are terminal for this attempt; the session is torn back down
    /// to `Idle` before the error is returned, and no automatic retry is
    /// made.
    pub async fn start(
        &self,
        remote: UserId,
        initiator_language: &str,
        receiver_language: &str,
    ) -> Result<()> {
        if self.phase().await != CallPhase::Idle {
            debug!("start() while a session is active; forcing it down first");
            self.end().await;
        }

        let now = self.clock.now();
        let session_id = SessionId::generate(now);
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.session = CallSessionState {
                session_id: session_id.clone(),
                local_user: self.local_user,
                remote_user: Some(remote),
                initiator_language: initiator_language.to_string(),
                receiver_language: receiver_language.to_string(),
                phase: CallPhase::Calling,
                connected_at: None,
                elapsed_seconds: 0,
            };
            inner.transcript.clear();
            inner.generation
        };
        self.elapsed.store(0, Ordering::Relaxed);
        self.emit_state_change(CallPhase::Idle, CallPhase::Calling);
        info!("Starting call {} to {}", session_id, remote);

        let credentials = match self
            .rtc
            .get_join_credentials(&session_id, self.local_user)
            .await
        {
            Ok(credentials) => credentials,
            Err(e) => {
                error!("Credential retrieval for call {} failed: {}", session_id, e);
                self.end().await;
                return Err(match e {
                    CallError::Signaling { .. } => e,
                    other => CallError::signaling(other.to_string()),
                });
            }
        };

        if self.current_generation().await != generation {
            debug!("Call {} aborted while fetching credentials", session_id);
            return Ok(());
        }

        let media = match self
            .rtc
            .join(&credentials, &session_id, self.local_user)
            .await
        {
            Ok(media) => media,
            Err(e) => {
                error!("Joining call {} failed: {}", session_id, e);
                self.end().await;
                return Err(match e {
                    CallError::MediaAccess { .. } => e,
                    other => CallError::media_access(other.to_string()),
                });
            }
        };

        let mut inner = self.inner.write().await;
        if inner.generation != generation || inner.session.phase != CallPhase::Calling {
            // Cancelled while joining; the device is already held, so it
            // must be released before the attempt is abandoned.
            drop(inner);
            debug!("Call {} aborted while joining; releasing media", session_id);
            if let Err(e) = self.rtc.leave().await {
                warn!("Failed to release media after aborted start: {}", e);
            }
            return Ok(());
        }
        inner.media = Some(media);
        drop(inner);

        info!("Call {} is up; waiting for the remote party", session_id);
        Ok(())
    }

    /// Feed one provider event into the state machine
    pub async fn handle_rtc_event(&self, event: RtcEvent) {
        match event {
            RtcEvent::RemoteJoined { remote_user } => {
                let connected = {
                    let mut inner = self.inner.write().await;
                    if inner.session.phase != CallPhase::Calling {
                        debug!(
                            "Ignoring RemoteJoined while {:?}",
                            inner.session.phase
                        );
                        false
                    } else {
                        inner.session.phase = CallPhase::Connected;
                        inner.session.connected_at = Some(self.clock.now());
                        inner.session.elapsed_seconds = 0;
                        if remote_user.is_some() {
                            inner.session.remote_user = remote_user;
                        }
                        // Restarting the timer resets the counter to zero.
                        inner.timer = Some(self.start_timer());
                        true
                    }
                };
                if connected {
                    info!("Remote party joined; call connected");
                    self.emit_state_change(CallPhase::Calling, CallPhase::Connected);
                }
            }
            RtcEvent::RemoteLeft => {
                if self.phase().await.is_in_call() {
                    info!("Remote party left; ending call");
                    self.end().await;
                } else {
                    debug!("Ignoring RemoteLeft with no call in progress");
                }
            }
            RtcEvent::Fatal { reason } => {
                if self.phase().await.is_in_call() {
                    error!("Fatal RTC error: {}", reason);
                    let _ = self.event_tx.send(CallEvent::CallFailed {
                        message: format!("Could not continue call: {}", reason),
                    });
                    self.end().await;
                } else {
                    debug!("Ignoring fatal RTC error with no call in progress: {}", reason);
                }
            }
        }
    }

    /// Spawn a task pumping provider events into the controller
    ///
    /// Convenience for wiring layers that receive provider callbacks on a
    /// channel. The task ends when the sender side is dropped.
    pub fn spawn_event_pump(
        controller: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<RtcEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                controller.handle_rtc_event(event).await;
            }
            debug!("RTC event pump stopped");
        })
    }

    /// Tear the current session down
    ///
    /// Valid from any phase and safe to call repeatedly; a call while
    /// already `Idle` is a no-op. Stops the timer, leaves the RTC channel
    /// (when one was actually joined), clears the transcript, and moves
    /// `Ended -> Idle` so the controller can be reused. Each cleanup step
    /// runs even if another fails.
    pub async fn end(&self) {
        let (previous, joined) = {
            let mut inner = self.inner.write().await;
            if inner.session.phase == CallPhase::Idle {
                debug!("end() while idle; nothing to do");
                return;
            }
            let previous = inner.session.phase;
            inner.generation += 1;
            inner.session.phase = CallPhase::Ended;
            // Dropping the guard aborts the tick task.
            inner.timer.take();
            let joined = inner.media.take().is_some();
            inner.transcript.clear();
            (previous, joined)
        };
        self.emit_state_change(previous, CallPhase::Ended);

        // Only a session that actually joined has a channel to leave; a
        // start that failed (or is still in flight) before join holds no
        // media here.
        if joined {
            if let Err(e) = self.rtc.leave().await {
                warn!("Failed to leave RTC session cleanly: {}", e);
            }
        }

        {
            let mut inner = self.inner.write().await;
            inner.session = CallSessionState::idle(self.local_user);
        }
        self.elapsed.store(0, Ordering::Relaxed);
        self.emit_state_change(CallPhase::Ended, CallPhase::Idle);
        info!("Call ended");
    }

    /// Enable or disable the local audio track
    ///
    /// Best-effort: a no-op outside `Connected`, and a provider failure is
    /// logged rather than returned. Never changes the call phase.
    pub async fn toggle_audio(&self, enabled: bool) -> Result<()> {
        {
            let mut inner = self.inner.write().await;
            if inner.session.phase != CallPhase::Connected {
                debug!("toggle_audio outside Connected; ignoring");
                return Ok(());
            }
            if let Some(media) = inner.media.as_mut() {
                media.audio_enabled = enabled;
            }
        }
        if let Err(e) = self.rtc.set_local_audio_enabled(enabled).await {
            warn!("Failed to set local audio to {}: {}", enabled, e);
        }
        Ok(())
    }

    /// Enable or disable the local video track
    ///
    /// Same best-effort contract as [`toggle_audio`](Self::toggle_audio).
    pub async fn toggle_video(&self, enabled: bool) -> Result<()> {
        {
            let mut inner = self.inner.write().await;
            if inner.session.phase != CallPhase::Connected {
                debug!("toggle_video outside Connected; ignoring");
                return Ok(());
            }
            if let Some(media) = inner.media.as_mut() {
                media.video_enabled = enabled;
            }
        }
        if let Err(e) = self.rtc.set_local_video_enabled(enabled).await {
            warn!("Failed to set local video to {}: {}", enabled, e);
        }
        Ok(())
    }

    /// Append an utterance to the transcript
    ///
    /// Legal while a call attempt is underway (`Calling` or `Connected`);
    /// rejected with [`CallError::InvalidState`] otherwise.
    pub async fn append_utterance(
        &self,
        sender: UserId,
        original_text: &str,
        translated_text: Option<String>,
    ) -> Result<TranscriptEntry> {
        let entry = {
            let mut inner = self.inner.write().await;
            if !inner.session.phase.is_in_call() {
                return Err(CallError::invalid_state(
                    "append_utterance",
                    inner.session.phase,
                ));
            }
            let entry = TranscriptEntry::new(
                sender,
                original_text,
                translated_text,
                self.clock.now(),
            );
            inner.transcript.push(entry.clone());
            entry
        };
        let _ = self.event_tx.send(CallEvent::TranscriptUpdated {
            entry: entry.clone(),
        });
        Ok(entry)
    }

    /// Translate `text` and append the original/translated pair
    ///
    /// The session is unaffected when translation fails; the caller may
    /// retry or append untranslated.
    pub async fn translate_and_append(
        &self,
        sender: UserId,
        text: &str,
        target_language: &str,
    ) -> Result<TranscriptEntry> {
        let translator = self
            .translator
            .as_ref()
            .ok_or_else(|| CallError::translation("no translation service configured"))?;
        let translated = translator.translate(text, target_language).await?;
        self.append_utterance(sender, text, Some(translated)).await
    }

    /// Transcribe recorded audio via the speech-to-text collaborator
    ///
    /// Submit-then-poll with a fixed bound (see [`CallConfig`]); fails
    /// with a timeout error once the bound is exhausted rather than
    /// polling indefinitely.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or_else(|| CallError::transcription("no transcription service configured"))?;

        let job = transcriber.submit(audio).await?;
        debug!("Submitted transcription job {}", job);

        let attempts = self.config.transcription_max_attempts;
        for attempt in 1..=attempts {
            match transcriber.poll_result(&job).await? {
                TranscriptionStatus::Completed(text) => {
                    debug!("Transcription job {} completed on attempt {}", job, attempt);
                    return Ok(text);
                }
                TranscriptionStatus::Failed(reason) => {
                    return Err(CallError::transcription(reason));
                }
                TranscriptionStatus::Pending => {
                    if attempt < attempts {
                        tokio::time::sleep(self.config.transcription_poll_interval).await;
                    }
                }
            }
        }
        Err(CallError::transcription(format!(
            "job {} produced no result after {} attempts",
            job, attempts
        )))
    }

    async fn current_generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    fn start_timer(&self) -> TimerGuard {
        self.elapsed.store(0, Ordering::Relaxed);
        let elapsed = self.elapsed.clone();
        let event_tx = self.event_tx.clone();
        let interval = self.config.tick_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Consume the immediate first tick; the first counted second
            // elapses one interval after connecting.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let seconds = elapsed.fetch_add(1, Ordering::Relaxed) + 1;
                let _ = event_tx.send(CallEvent::DurationTick {
                    elapsed_seconds: seconds,
                });
            }
        });
        TimerGuard { handle }
    }

    fn emit_state_change(&self, previous: CallPhase, current: CallPhase) {
        debug!("Call phase {:?} -> {:?}", previous, current);
        let _ = self.event_tx.send(CallEvent::StateChanged { previous, current });
    }
}

impl std::fmt::Debug for CallController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallController")
            .field("local_user", &self.local_user)
            .field("elapsed_seconds", &self.elapsed.load(Ordering::Relaxed))
            .finish()
    }
}
