//! End-to-end call setup scenario
//!
//! Exercises the two core components together the way the application
//! uses them: the caller invites the callee through the mailbox relay,
//! the callee discovers the invite on its next poll, and the call
//! controller brings the session up against a mock RTC provider.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lingua_call_core::{
    CallController, CallPhase, JoinCredentials, MediaHandle, Result as CallResult, RtcEvent,
    RtcProvider, SessionId,
};
use lingua_relay_core::{MailboxRelay, RelayConfig, UserId};
use serde_json::json;

#[derive(Debug, Default)]
struct ScriptedRtc {
    credential_requests: AtomicU32,
}

#[async_trait]
impl RtcProvider for ScriptedRtc {
    async fn get_join_credentials(
        &self,
        _channel: &SessionId,
        _user: UserId,
    ) -> CallResult<JoinCredentials> {
        self.credential_requests.fetch_add(1, Ordering::Relaxed);
        Ok(JoinCredentials {
            app_id: "X".to_string(),
            token: "Y".to_string(),
        })
    }

    async fn join(
        &self,
        credentials: &JoinCredentials,
        _channel: &SessionId,
        _user: UserId,
    ) -> CallResult<MediaHandle> {
        assert_eq!(credentials.app_id, "X");
        assert_eq!(credentials.token, "Y");
        Ok(MediaHandle::default())
    }

    async fn leave(&self) -> CallResult<()> {
        Ok(())
    }

    async fn set_local_audio_enabled(&self, _enabled: bool) -> CallResult<()> {
        Ok(())
    }

    async fn set_local_video_enabled(&self, _enabled: bool) -> CallResult<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn invite_poll_start_connect_flow() {
    let alice = UserId(1);
    let bob = UserId(2);

    // Both clients register with the relay when they come online.
    let relay = MailboxRelay::new(RelayConfig::default());
    relay.register(alice);
    relay.register(bob);

    // Alice invites Bob to a channel over the relay.
    relay
        .send(alice, bob, "invite", json!({ "channel": "call-123" }))
        .unwrap();

    // Bob's next poll returns exactly that invitation.
    let pending = relay.poll(bob);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].msg_type, "invite");
    assert_eq!(pending[0].from, alice);
    assert_eq!(pending[0].payload["channel"], "call-123");
    assert!(relay.poll(bob).is_empty());

    // Alice brings up her side of the call.
    let rtc = Arc::new(ScriptedRtc::default());
    let controller = CallController::builder(alice, rtc.clone()).build();
    controller.start(bob, "en", "es").await.unwrap();
    assert_eq!(controller.phase().await, CallPhase::Calling);
    assert_eq!(rtc.credential_requests.load(Ordering::Relaxed), 1);

    // Bob's media starts flowing: connected, duration counting from zero.
    controller
        .handle_rtc_event(RtcEvent::RemoteJoined {
            remote_user: Some(bob),
        })
        .await;
    assert_eq!(controller.phase().await, CallPhase::Connected);
    assert_eq!(controller.elapsed_seconds(), 0);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(controller.elapsed_seconds(), 2);

    // The conversation flows into the transcript while connected.
    controller
        .append_utterance(alice, "hello", Some("hola".to_string()))
        .await
        .unwrap();
    assert_eq!(controller.transcript().await.len(), 1);

    // Hanging up returns to idle; the mailbox survives the call.
    controller.end().await;
    assert_eq!(controller.phase().await, CallPhase::Idle);
    assert!(controller.transcript().await.is_empty());
    assert!(relay.is_registered(bob));
    assert!(relay.is_registered(alice));
}

#[tokio::test]
async fn decline_flows_back_over_the_relay() {
    let alice = UserId(1);
    let bob = UserId(2);
    let relay = MailboxRelay::new(RelayConfig::default());

    relay
        .send(alice, bob, "invite", json!({ "channel": "call-9" }))
        .unwrap();
    let invite = relay.poll(bob);
    assert_eq!(invite.len(), 1);

    // Bob declines; Alice learns of it on her next poll and never starts.
    relay
        .send(bob, alice, "decline", json!({ "channel": "call-9" }))
        .unwrap();
    let answer = relay.poll(alice);
    assert_eq!(answer.len(), 1);
    assert_eq!(answer[0].msg_type, "decline");
    assert_eq!(answer[0].from, bob);
}
