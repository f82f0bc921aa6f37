//! Recording fakes for dispatcher and unlock-flow integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use latchkey_bridge::{
    AccessPolicy, BiometricGate, BridgeConfig, Capability, Clipboard, CredentialStore,
    Dispatcher, FileSink, GateError, HostError, HostServices, LocalFileSink,
    MemoryCredentialStore, Popover, SaveDialog, SecretRecord, StoreError,
};

pub const SERVICE: &str = "Bitwarden_biometric";

// ── Clipboard ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeClipboard {
    pub contents: Mutex<Option<String>>,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl Clipboard for FakeClipboard {
    fn read_text(&self) -> Result<Option<String>, HostError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.contents.lock().unwrap().clone())
    }

    fn write_text(&self, text: &str) -> Result<(), HostError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.contents.lock().unwrap() = Some(text.to_owned());
        Ok(())
    }
}

// ── Popover ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakePopover {
    pub shown: AtomicUsize,
}

impl Popover for FakePopover {
    fn show_popover(&self) -> Result<(), HostError> {
        self.shown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Save dialog ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSaveDialog {
    pub destination: Mutex<Option<PathBuf>>,
    pub requested: Mutex<Vec<String>>,
}

impl SaveDialog for FakeSaveDialog {
    fn choose_destination(&self, file_name: &str) -> Option<PathBuf> {
        self.requested.lock().unwrap().push(file_name.to_owned());
        self.destination.lock().unwrap().clone()
    }
}

// ── File sink ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingFileSink {
    pub writes: AtomicUsize,
}

impl FileSink for RecordingFileSink {
    fn write_file(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        LocalFileSink.write_file(path, data)
    }
}

// ── Biometric gate ───────────────────────────────────────────────────

pub struct ScriptedGate {
    pub capability: Capability,
    pub policy: Result<AccessPolicy, GateError>,
    pub challenge_result: Result<(), GateError>,
    pub challenges: AtomicUsize,
    pub reasons: Mutex<Vec<String>>,
    pub policies: Mutex<Vec<AccessPolicy>>,
}

impl ScriptedGate {
    pub fn passing() -> Self {
        Self {
            capability: Capability::Available,
            policy: Ok(AccessPolicy::device_owner_presence()),
            challenge_result: Ok(()),
            challenges: AtomicUsize::new(0),
            reasons: Mutex::new(Vec::new()),
            policies: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_policy(mut self, policy: Result<AccessPolicy, GateError>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_challenge(mut self, result: Result<(), GateError>) -> Self {
        self.challenge_result = result;
        self
    }

    pub fn challenge_count(&self) -> usize {
        self.challenges.load(Ordering::SeqCst)
    }
}

impl BiometricGate for ScriptedGate {
    fn provider_name(&self) -> &'static str {
        "Scripted"
    }

    fn can_authenticate(&self) -> Capability {
        self.capability.clone()
    }

    fn access_policy(&self) -> Result<AccessPolicy, GateError> {
        self.policy.clone()
    }

    fn challenge(&self, policy: &AccessPolicy, reason: &str) -> Result<(), GateError> {
        self.challenges.fetch_add(1, Ordering::SeqCst);
        self.reasons.lock().unwrap().push(reason.to_owned());
        self.policies.lock().unwrap().push(*policy);
        self.challenge_result.clone()
    }
}

// ── Credential store ─────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryCredentialStore,
    pub lookups: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn seeded(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (account, secret) in entries {
            store.inner.insert(SERVICE, account, secret).unwrap();
        }
        store
    }

    pub fn accounts_looked_up(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl CredentialStore for RecordingStore {
    fn lookup(&self, service: &str, account: &str) -> Result<Option<SecretRecord>, StoreError> {
        self.lookups.lock().unwrap().push(account.to_owned());
        self.inner.lookup(service, account)
    }
}

// ── Harness ──────────────────────────────────────────────────────────

pub struct Harness {
    pub clipboard: Arc<FakeClipboard>,
    pub popover: Arc<FakePopover>,
    pub save_dialog: Arc<FakeSaveDialog>,
    pub files: Arc<RecordingFileSink>,
    pub gate: Arc<ScriptedGate>,
    pub store: Arc<RecordingStore>,
    pub dispatcher: Dispatcher,
}

impl Harness {
    pub fn new(gate: ScriptedGate, store: RecordingStore, config: &BridgeConfig) -> Self {
        let clipboard = Arc::new(FakeClipboard::default());
        let popover = Arc::new(FakePopover::default());
        let save_dialog = Arc::new(FakeSaveDialog::default());
        let files = Arc::new(RecordingFileSink::default());
        let gate = Arc::new(gate);
        let store = Arc::new(store);

        let host = HostServices {
            clipboard: clipboard.clone(),
            popover: popover.clone(),
            save_dialog: save_dialog.clone(),
            files: files.clone(),
        };
        let dispatcher = Dispatcher::new(host, gate.clone(), store.clone(), config);

        Self {
            clipboard,
            popover,
            save_dialog,
            files,
            gate,
            store,
            dispatcher,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            ScriptedGate::passing(),
            RecordingStore::default(),
            &BridgeConfig::default(),
        )
    }

    /// Total count of every observable side effect.
    pub fn side_effects(&self) -> usize {
        self.clipboard.reads.load(Ordering::SeqCst)
            + self.clipboard.writes.load(Ordering::SeqCst)
            + self.popover.shown.load(Ordering::SeqCst)
            + self.save_dialog.requested.lock().unwrap().len()
            + self.files.writes.load(Ordering::SeqCst)
            + self.gate.challenge_count()
            + self.store.accounts_looked_up().len()
    }
}
