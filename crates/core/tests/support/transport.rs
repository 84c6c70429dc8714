//! Scripted mocks for the network-facing ports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use jimpitan_core::sync::ports::{ConnectivityProbe, UploadTransport};
use jimpitan_domain::{DirectUpload, JimpitanError, QueuedUpload, Result as DomainResult, UploadAck};
use parking_lot::Mutex;

/// Transport mock that replays a script of outcomes and records every
/// payload it was asked to send.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<DomainResult<UploadAck>>>,
    direct_sent: Mutex<Vec<DirectUpload>>,
    queued_sent: Mutex<Vec<QueuedUpload>>,
}

impl ScriptedTransport {
    /// A transport that acknowledges everything with an empty ack.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next send. Unscripted sends succeed.
    pub fn push_outcome(&self, outcome: DomainResult<UploadAck>) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn push_failure(&self, message: &str) {
        self.push_outcome(Err(JimpitanError::Network(message.to_string())));
    }

    pub fn push_ack_message(&self, message: &str) {
        self.push_outcome(Ok(UploadAck { message: Some(message.to_string()) }));
    }

    pub fn direct_payloads(&self) -> Vec<DirectUpload> {
        self.direct_sent.lock().clone()
    }

    pub fn queued_payloads(&self) -> Vec<QueuedUpload> {
        self.queued_sent.lock().clone()
    }

    fn next_outcome(&self) -> DomainResult<UploadAck> {
        self.outcomes.lock().pop_front().unwrap_or(Ok(UploadAck::default()))
    }
}

#[async_trait]
impl UploadTransport for ScriptedTransport {
    async fn send_direct(&self, payload: &DirectUpload) -> DomainResult<UploadAck> {
        self.direct_sent.lock().push(payload.clone());
        self.next_outcome()
    }

    async fn send_queued(&self, payload: &QueuedUpload) -> DomainResult<UploadAck> {
        self.queued_sent.lock().push(payload.clone());
        self.next_outcome()
    }
}

/// Connectivity probe with a switchable answer.
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    pub fn online() -> Self {
        Self { online: AtomicBool::new(true) }
    }

    pub fn offline() -> Self {
        Self { online: AtomicBool::new(false) }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl ConnectivityProbe for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
