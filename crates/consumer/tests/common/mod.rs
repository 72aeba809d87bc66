//! In-memory collaborators for consumer integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use storefront_consumer::handlers::register_defaults;
use storefront_consumer::{
    Dispatcher, Poller, PollerConfig, QueueClient, QueueError, RawMessage, ReceiveRequest,
};
use storefront_core::notify::{Broadcaster, NotifyError, WelcomeMailer};
use tokio::sync::Notify;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// FakeQueue
// ---------------------------------------------------------------------------

/// Scripted queue. Each receive pops the next scripted response; once the
/// script is exhausted it behaves like an empty long-poll.
#[derive(Default)]
pub struct FakeQueue {
    script: Mutex<VecDeque<Result<Vec<RawMessage>, QueueError>>>,
    receives: Mutex<Vec<(Instant, ReceiveRequest)>>,
    deletes: Mutex<Vec<String>>,
    fail_deletes: bool,
    /// Signalled when a receive call begins.
    pub receive_entered: Arc<Notify>,
    /// When set, receive calls block until notified.
    pub gate: Option<Arc<Notify>>,
}

impl FakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let queue = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (queue, gate)
    }

    pub fn push_batch(&self, messages: Vec<RawMessage>) {
        self.script.lock().unwrap().push_back(Ok(messages));
    }

    pub fn push_error(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(QueueError::Receive("connection reset".to_string())));
    }

    pub fn receive_count(&self) -> usize {
        self.receives.lock().unwrap().len()
    }

    pub fn receive_times(&self) -> Vec<Instant> {
        self.receives.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn last_request(&self) -> Option<ReceiveRequest> {
        self.receives.lock().unwrap().last().map(|(_, r)| r.clone())
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueClient for FakeQueue {
    async fn receive_batch(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError> {
        self.receives
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        self.receive_entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => {
                tokio::time::sleep(request.wait_time).await;
                Ok(Vec::new())
            }
        }
    }

    async fn delete_message(&self, receipt_handle: &str) -> Result<(), QueueError> {
        self.deletes.lock().unwrap().push(receipt_handle.to_string());
        if self.fail_deletes {
            return Err(QueueError::Delete("access denied".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeMailer / FakeBroadcaster
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WelcomeMailer for FakeMailer {
    async fn send_welcome_email(&self, address: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(address.to_string());
        if self.fail {
            return Err(NotifyError::Delivery("throttled".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBroadcaster {
    events: Mutex<Vec<(String, Value)>>,
}

impl FakeBroadcaster {
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broadcaster for FakeBroadcaster {
    async fn broadcast(&self, event_name: &str, payload: Value) {
        self.events
            .lock()
            .unwrap()
            .push((event_name.to_string(), payload));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A message with id `m-{n}` and receipt handle `rh-{n}`.
pub fn message(n: usize, body: &str) -> RawMessage {
    RawMessage {
        message_id: Some(format!("m-{n}")),
        receipt_handle: format!("rh-{n}"),
        body: body.to_string(),
    }
}

pub struct Harness {
    pub queue: Arc<FakeQueue>,
    pub mailer: Arc<FakeMailer>,
    pub broadcaster: Arc<FakeBroadcaster>,
    pub poller: Arc<Poller>,
}

/// Wire a poller over `queue` with the default handlers and fakes.
pub fn harness(queue: FakeQueue, mailer: FakeMailer) -> Harness {
    let queue = Arc::new(queue);
    let mailer = Arc::new(mailer);
    let broadcaster = Arc::new(FakeBroadcaster::default());

    let mut dispatcher = Dispatcher::new();
    register_defaults(&mut dispatcher, mailer.clone(), broadcaster.clone());

    let poller = Arc::new(Poller::new(
        queue.clone(),
        dispatcher,
        PollerConfig::default(),
    ));

    Harness {
        queue,
        mailer,
        broadcaster,
        poller,
    }
}
