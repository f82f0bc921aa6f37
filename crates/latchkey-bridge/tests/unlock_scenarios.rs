#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! End-to-end `biometricUnlock` scenarios through the dispatcher.

mod common;

use common::{Harness, RecordingStore, ScriptedGate};
use latchkey_bridge::{
    channel, AccessPolicy, BridgeConfig, Capability, ChallengeFailurePolicy, Dispatched,
    GateError,
};
use latchkey_protocol::Reply;
use serde_json::{json, Value};

async fn unlock(harness: &Harness, user_id: &str) -> Option<Reply> {
    let (responder, pending) = channel();
    let result = harness.dispatcher.dispatch(
        &json!({"command": "biometricUnlock", "userId": user_id}),
        responder,
    );
    assert_eq!(result, Dispatched::Deferred);
    pending.wait().await
}

/// The inner unlock message as the extension receives it.
fn unlock_message(reply: Reply) -> Value {
    let user_info = reply.into_user_info().unwrap();
    user_info["message"]["message"].clone()
}

fn config_with(on_failure: ChallengeFailurePolicy) -> BridgeConfig {
    BridgeConfig {
        on_challenge_failure: on_failure,
        ..BridgeConfig::default()
    }
}

#[tokio::test]
async fn unsupported_device_replies_not_supported_without_prompt() {
    let gate = ScriptedGate::passing().with_capability(Capability::Unsupported {
        reason: "no biometric hardware".into(),
    });
    let harness = Harness::new(gate, RecordingStore::default(), &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["command"], "biometricUnlock");
    assert_eq!(message["response"], "not supported");
    assert!(message["timestamp"].as_i64().unwrap() > 0);
    assert!(message.get("userKeyB64").is_none());
    assert_eq!(harness.gate.challenge_count(), 0);
    assert!(harness.store.accounts_looked_up().is_empty());
}

#[tokio::test]
async fn lockout_still_presents_the_challenge() {
    let gate = ScriptedGate::passing().with_capability(Capability::LockedOut);
    let store = RecordingStore::seeded(&[("U1_user_biometric", "k1")]);
    let harness = Harness::new(gate, store, &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(harness.gate.challenge_count(), 1);
    assert_eq!(message["response"], "unlocked");
    assert_eq!(message["userKeyB64"], "k1");
}

#[tokio::test]
async fn lockout_challenge_requires_user_presence() {
    let gate = ScriptedGate::passing().with_capability(Capability::LockedOut);
    let store = RecordingStore::seeded(&[("U1_user_biometric", "k1")]);
    let harness = Harness::new(gate, store, &BridgeConfig::default());

    unlock(&harness, "U1").await.unwrap();

    let policies = harness.gate.policies.lock().unwrap().clone();
    assert_eq!(policies, vec![AccessPolicy::device_owner_presence()]);
    assert!(policies[0].user_presence);
}

#[tokio::test]
async fn challenge_receives_the_gate_policy() {
    let policy = AccessPolicy {
        private_key_usage: false,
        ..AccessPolicy::device_owner_presence()
    };
    let gate = ScriptedGate::passing().with_policy(Ok(policy));
    let store = RecordingStore::seeded(&[("U1_user_biometric", "k1")]);
    let harness = Harness::new(gate, store, &BridgeConfig::default());

    unlock(&harness, "U1").await.unwrap();

    assert_eq!(*harness.gate.policies.lock().unwrap(), vec![policy]);
}

#[tokio::test]
async fn policy_unavailable_replies_not_supported() {
    let gate = ScriptedGate::passing()
        .with_policy(Err(GateError::PolicyUnavailable("access control rejected".into())));
    let harness = Harness::new(gate, RecordingStore::default(), &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["response"], "not supported");
    assert_eq!(harness.gate.challenge_count(), 0);
    assert!(harness.store.accounts_looked_up().is_empty());
}

#[tokio::test]
async fn challenge_uses_configured_reason() {
    let harness = Harness::with_defaults();
    let _ = unlock(&harness, "U1").await;
    assert_eq!(
        *harness.gate.reasons.lock().unwrap(),
        vec!["Bitwarden Safari Extension".to_string()]
    );
}

#[tokio::test]
async fn all_candidates_miss_replies_not_enabled() {
    let harness = Harness::with_defaults();

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["response"], "not enabled");
    assert!(message.get("userKeyB64").is_none());
    assert_eq!(
        harness.store.accounts_looked_up(),
        vec!["U1_user_biometric", "key", "U1_masterkey_biometric"]
    );
}

#[tokio::test]
async fn second_candidate_is_used_when_first_misses() {
    let store = RecordingStore::seeded(&[("key", "secretkey123")]);
    let harness = Harness::new(ScriptedGate::passing(), store, &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["response"], "unlocked");
    assert_eq!(message["userKeyB64"], "secretkey123");
    assert_eq!(
        harness.store.accounts_looked_up(),
        vec!["U1_user_biometric", "key"]
    );
}

#[tokio::test]
async fn first_hit_wins_and_stops_the_search() {
    let store = RecordingStore::seeded(&[
        ("U1_user_biometric", "primary"),
        ("key", "legacy"),
        ("U1_masterkey_biometric", "older"),
    ]);
    let harness = Harness::new(ScriptedGate::passing(), store, &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["userKeyB64"], "primary");
    assert_eq!(harness.store.accounts_looked_up(), vec!["U1_user_biometric"]);
}

#[tokio::test]
async fn third_candidate_is_user_scoped() {
    let store = RecordingStore::seeded(&[
        ("U2_masterkey_biometric", "someone else"),
        ("U1_masterkey_biometric", "mine"),
    ]);
    let harness = Harness::new(ScriptedGate::passing(), store, &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["userKeyB64"], "mine");
}

#[tokio::test]
async fn quotes_are_stripped_from_the_key() {
    let store = RecordingStore::seeded(&[("U1_user_biometric", "\"abc\"")]);
    let harness = Harness::new(ScriptedGate::passing(), store, &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["userKeyB64"], "abc");
}

#[tokio::test]
async fn undecodable_entry_falls_through_to_next_candidate() {
    let store = RecordingStore::default();
    store
        .inner
        .insert(common::SERVICE, "U1_user_biometric", [0xc3, 0x28])
        .unwrap();
    store.inner.insert(common::SERVICE, "key", "fallback").unwrap();
    let harness = Harness::new(ScriptedGate::passing(), store, &BridgeConfig::default());

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["userKeyB64"], "fallback");
}

#[tokio::test]
async fn custom_service_is_queried() {
    let store = RecordingStore::default();
    store.inner.insert("Other_service", "key", "k").unwrap();
    let config = BridgeConfig {
        keychain_service: "Other_service".into(),
        ..BridgeConfig::default()
    };
    let harness = Harness::new(ScriptedGate::passing(), store, &config);

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());

    assert_eq!(message["userKeyB64"], "k");
}

// -------------------------------------------------------------------------
// Challenge failure policies
// -------------------------------------------------------------------------

fn failing_gate() -> ScriptedGate {
    ScriptedGate::passing().with_challenge(Err(GateError::UserCancelled))
}

#[tokio::test]
async fn failed_challenge_is_silent_by_default() {
    let store = RecordingStore::seeded(&[("U1_user_biometric", "k1")]);
    let harness = Harness::new(failing_gate(), store, &BridgeConfig::default());

    assert_eq!(unlock(&harness, "U1").await, None);
    assert_eq!(harness.gate.challenge_count(), 1);
    assert!(harness.store.accounts_looked_up().is_empty());
}

#[tokio::test]
async fn failed_challenge_can_reply_empty() {
    let harness = Harness::new(
        failing_gate(),
        RecordingStore::default(),
        &config_with(ChallengeFailurePolicy::EmptyReply),
    );

    assert_eq!(unlock(&harness, "U1").await, Some(Reply::empty()));
    assert!(harness.store.accounts_looked_up().is_empty());
}

#[tokio::test]
async fn failed_challenge_can_reply_not_supported() {
    let harness = Harness::new(
        failing_gate(),
        RecordingStore::default(),
        &config_with(ChallengeFailurePolicy::NotSupported),
    );

    let message = unlock_message(unlock(&harness, "U1").await.unwrap());
    assert_eq!(message["response"], "not supported");
    assert!(harness.store.accounts_looked_up().is_empty());
}

#[tokio::test]
async fn authentication_failure_never_reveals_a_key() {
    let gate = ScriptedGate::passing()
        .with_challenge(Err(GateError::AuthenticationFailed("bad finger".into())))
        .with_policy(Ok(AccessPolicy::device_owner_presence()));
    let store = RecordingStore::seeded(&[("U1_user_biometric", "k1")]);
    let harness = Harness::new(gate, store, &config_with(ChallengeFailurePolicy::EmptyReply));

    let reply = unlock(&harness, "U1").await.unwrap();
    assert!(reply.is_empty());
}

#[tokio::test]
async fn concurrent_unlocks_each_complete_once() {
    let store = RecordingStore::seeded(&[("A_user_biometric", "ka"), ("key", "legacy")]);
    let harness = Harness::new(ScriptedGate::passing(), store, &BridgeConfig::default());

    let (a, b) = tokio::join!(unlock(&harness, "A"), unlock(&harness, "B"));

    assert_eq!(unlock_message(a.unwrap())["userKeyB64"], "ka");
    assert_eq!(unlock_message(b.unwrap())["userKeyB64"], "legacy");
    assert_eq!(harness.gate.challenge_count(), 2);
}
