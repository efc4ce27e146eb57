//! Subscriber notification, decoupled from writes
//!
//! A write posts `(path, value)` to an unbounded queue and returns. A
//! background worker drains the queue, looks up the exact-path subscribers
//! and hands each one its own delivery task. Every delivery gets at most one
//! attempt; its outcome is logged and goes nowhere else.

use crate::config::NotifyConfig;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vapor_core::{Error, ParamUpdate, Result};
use vapor_store::SubscriptionRegistry;

/// Performs the outbound call to a subscriber's registered endpoint.
#[async_trait::async_trait]
pub trait ParamDelivery: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, update: ParamUpdate) -> Result<()>;
}

/// Logs each update instead of sending it anywhere.
pub struct TracingDelivery;

#[async_trait::async_trait]
impl ParamDelivery for TracingDelivery {
    fn name(&self) -> &str { "tracing" }

    async fn deliver(&self, update: ParamUpdate) -> Result<()> {
        tracing::info!(
            "param update {} -> {} at {}: {}",
            update.key_path,
            update.subscriber_path,
            update.subscriber_uri,
            update.value
        );
        Ok(())
    }
}

/// Forwards each update into a channel, for embedding the server in a
/// process that owns the transport.
pub struct ChannelDelivery {
    tx: mpsc::UnboundedSender<ParamUpdate>,
}

impl ChannelDelivery {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ParamUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl ParamDelivery for ChannelDelivery {
    fn name(&self) -> &str { "channel" }

    async fn deliver(&self, update: ParamUpdate) -> Result<()> {
        let uri = update.subscriber_uri.clone();
        self.tx
            .send(update)
            .map_err(|_| Error::delivery(uri, "receiver dropped"))
    }
}

struct Notification {
    key_path: String,
    value: Value,
}

struct Notifier {
    subs: SubscriptionRegistry,
    delivery: Arc<dyn ParamDelivery>,
    timeout: Option<Duration>,
}

/// Handle to the notification queue. Cheap to clone; the worker stops once
/// every handle is dropped and the queue is drained.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Notification>,
    notifier: Arc<Notifier>,
}

impl NotificationDispatcher {
    /// Start the background worker. Must be called within a tokio runtime.
    pub fn spawn(
        subs: SubscriptionRegistry,
        delivery: Arc<dyn ParamDelivery>,
        config: &NotifyConfig,
    ) -> Self {
        let notifier = Arc::new(Notifier {
            subs,
            delivery,
            timeout: config.delivery_timeout(),
        });
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        let worker = notifier.clone();
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                worker.notify(&notification.key_path, notification.value).await;
            }
            debug!("notification worker stopped");
        });

        Self { tx, notifier }
    }

    /// Queue a notification pass for a completed write. Never blocks and
    /// never fails the caller.
    pub fn schedule(&self, key_path: &str, value: Value) {
        let notification = Notification {
            key_path: key_path.to_string(),
            value,
        };
        if self.tx.send(notification).is_err() {
            debug!("notification worker gone, dropping update for {}", key_path);
        }
    }

    /// Run one notification pass inline: look up the subscribers of
    /// `key_path` and start one delivery per subscriber. Returns the number
    /// of deliveries started.
    pub async fn notify(&self, key_path: &str, value: Value) -> usize {
        self.notifier.notify(key_path, value).await
    }
}

impl Notifier {
    async fn notify(&self, key_path: &str, value: Value) -> usize {
        let subs = match self.subs.subscribers_of(key_path).await {
            Ok(subs) => subs,
            Err(e) => {
                warn!("subscriber lookup for {} failed: {}", key_path, e);
                return 0;
            }
        };
        debug!("number of param subs to be updated for {}: {}", key_path, subs.len());

        let started = subs.len();
        for sub in subs {
            let update = ParamUpdate {
                subscriber_uri: sub.subscriber_uri,
                subscriber_path: sub.subscriber_path,
                key_path: key_path.to_string(),
                value: value.clone(),
            };
            tokio::spawn(deliver_once(self.delivery.clone(), update, self.timeout));
        }
        started
    }
}

async fn deliver_once(
    delivery: Arc<dyn ParamDelivery>,
    update: ParamUpdate,
    timeout: Option<Duration>,
) {
    let uri = update.subscriber_uri.clone();
    let key_path = update.key_path.clone();
    debug!("updating subscriber {} for {} via {}", update.subscriber_path, key_path, delivery.name());

    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, delivery.deliver(update)).await {
            Ok(result) => result,
            Err(_) => Err(Error::delivery(&uri, format!("timed out after {:?}", limit))),
        },
        None => delivery.deliver(update).await,
    };

    if let Err(e) = outcome {
        warn!("param update for {} not delivered: {}", key_path, e);
    }
}
