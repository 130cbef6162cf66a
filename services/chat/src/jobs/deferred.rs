//! Delayed outbound messages.
//!
//! Callers enqueue a message with a delay through [`DeferredQueue`]; the
//! [`DeferredWorker`] holds pending messages in a min-heap keyed by fire time
//! and delivers each once when its time comes. A failed delivery is logged and
//! dropped.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::domain::repository::Notifier;

#[derive(Debug, Clone, PartialEq)]
pub enum DeferredMessage {
    Template {
        phone: String,
        template: String,
        params: Vec<(&'static str, String)>,
    },
    Text {
        phone: String,
        body: String,
    },
}

impl DeferredMessage {
    pub fn template(phone: &str, template: &str, params: Vec<(&'static str, String)>) -> Self {
        Self::Template {
            phone: phone.to_owned(),
            template: template.to_owned(),
            params,
        }
    }

    pub fn text(phone: &str, body: impl Into<String>) -> Self {
        Self::Text {
            phone: phone.to_owned(),
            body: body.into(),
        }
    }

    pub fn phone(&self) -> &str {
        match self {
            Self::Template { phone, .. } | Self::Text { phone, .. } => phone,
        }
    }
}

struct Scheduled {
    fire_at: Instant,
    message: DeferredMessage,
}

struct Entry {
    fire_at: Instant,
    seq: u64,
    message: DeferredMessage,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.fire_at, self.seq).cmp(&(other.fire_at, other.seq))
    }
}

/// Cloneable handle for scheduling delayed messages.
#[derive(Clone)]
pub struct DeferredQueue {
    tx: mpsc::UnboundedSender<Scheduled>,
}

impl DeferredQueue {
    /// Deliver `message` once `delay` has passed. The fire time is fixed now.
    pub fn schedule(&self, delay: Duration, message: DeferredMessage) {
        let phone = message.phone().to_owned();
        let scheduled = Scheduled {
            fire_at: Instant::now() + delay,
            message,
        };
        if self.tx.send(scheduled).is_err() {
            warn!(phone, "deferred worker stopped; message dropped");
        } else {
            debug!(phone, delay_ms = delay.as_millis() as u64, "message deferred");
        }
    }
}

/// Create a queue handle and the worker that drains it.
pub fn channel<N: Notifier>(notifier: Arc<N>) -> (DeferredQueue, DeferredWorker<N>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        DeferredQueue { tx },
        DeferredWorker {
            rx,
            notifier,
            pending: BinaryHeap::new(),
            seq: 0,
        },
    )
}

pub struct DeferredWorker<N: Notifier> {
    rx: mpsc::UnboundedReceiver<Scheduled>,
    notifier: Arc<N>,
    pending: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl<N: Notifier> DeferredWorker<N> {
    /// Run until every queue handle is dropped and the pending messages are delivered.
    pub async fn run(mut self) {
        info!("deferred worker started");
        loop {
            let next = self.pending.peek().map(|Reverse(e)| e.fire_at);
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(scheduled) => self.push(scheduled),
                    None => break,
                },
                () = sleep_until(next.unwrap_or_else(Instant::now)), if next.is_some() => {
                    self.deliver_due().await;
                }
            }
        }

        while let Some(Reverse(entry)) = self.pending.pop() {
            sleep_until(entry.fire_at).await;
            self.deliver(entry.message).await;
        }
        info!("deferred worker stopped");
    }

    fn push(&mut self, scheduled: Scheduled) {
        self.seq += 1;
        self.pending.push(Reverse(Entry {
            fire_at: scheduled.fire_at,
            seq: self.seq,
            message: scheduled.message,
        }));
    }

    async fn deliver_due(&mut self) {
        let now = Instant::now();
        while self
            .pending
            .peek()
            .is_some_and(|Reverse(e)| e.fire_at <= now)
        {
            if let Some(Reverse(entry)) = self.pending.pop() {
                self.deliver(entry.message).await;
            }
        }
    }

    async fn deliver(&self, message: DeferredMessage) {
        let result = match &message {
            DeferredMessage::Template {
                phone,
                template,
                params,
            } => self.notifier.send_template(phone, template, params).await,
            DeferredMessage::Text { phone, body } => self.notifier.send_text(phone, body).await,
        };
        match result {
            Ok(()) => debug!(phone = message.phone(), "deferred message delivered"),
            Err(e) => warn!(phone = message.phone(), error = %e, "deferred message dropped"),
        }
    }
}
