//! Single-shot request completion.
//!
//! Every request gets one [`Responder`] / [`PendingReply`] pair. The
//! responder is consumed by [`Responder::complete`], so a request can be
//! completed at most once. Dropping the responder without completing is the
//! explicit "no reply" outcome: the requester observes it as `None`.

use latchkey_protocol::Reply;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Completion capability for one request.
#[must_use = "dropping a Responder leaves the request without a reply"]
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<Reply>,
}

/// Requester side of one request.
#[derive(Debug)]
pub struct PendingReply {
    rx: oneshot::Receiver<Reply>,
}

/// Non-blocking view of a [`PendingReply`].
#[derive(Debug, Clone, PartialEq)]
pub enum PendingState {
    /// The handler completed the request.
    Completed(Reply),
    /// The responder is still held by a handler.
    Waiting,
    /// The responder was dropped without completing.
    Abandoned,
}

/// Create the completion pair for a new request.
pub fn channel() -> (Responder, PendingReply) {
    let (tx, rx) = oneshot::channel();
    (Responder { tx }, PendingReply { rx })
}

impl Responder {
    /// Complete the request with `reply`.
    ///
    /// Returns `false` if the requester already went away; the reply is
    /// discarded in that case.
    #[allow(clippy::must_use_candidate)]
    pub fn complete(self, reply: Reply) -> bool {
        let delivered = self.tx.send(reply).is_ok();
        if !delivered {
            tracing::debug!("requester gone before completion; reply discarded");
        }
        delivered
    }

    /// Whether the requester has stopped waiting.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolve once the requester stops waiting.
    pub async fn closed(&mut self) {
        self.tx.closed().await;
    }
}

impl PendingReply {
    /// Wait for the request to finish. `None` means it was never completed.
    pub async fn wait(self) -> Option<Reply> {
        self.rx.await.ok()
    }

    /// Check without waiting.
    pub fn try_take(&mut self) -> PendingState {
        match self.rx.try_recv() {
            Ok(reply) => PendingState::Completed(reply),
            Err(TryRecvError::Empty) => PendingState::Waiting,
            Err(TryRecvError::Closed) => PendingState::Abandoned,
        }
    }
}
