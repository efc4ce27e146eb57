//! Parameter server operations
//!
//! Every stored value is a leaf document at a canonical path. Writing a
//! mapping writes one leaf per key (recursively) and nothing at the mapping's
//! own path; the nesting only exists again when a read folds the leaves.
//!
//! There is no lock around clobber-then-write. Two writers racing on
//! overlapping subtrees can both clear the shared prefix and both leave a
//! leaf behind; reads tolerate that by letting the newest leaf win per key.

use crate::config::NotifyConfig;
use crate::notify::{NotificationDispatcher, ParamDelivery};
use crate::tree;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;
use vapor_core::{resolve, Error, Result};
use vapor_store::{ParamBackend, ParamStore, SubscriptionRegistry};

struct Creator {
    path: String,
    ipv4: String,
}

/// The parameter server. Cheap to clone; clones share the backend and the
/// notification worker.
#[derive(Clone)]
pub struct ParamService {
    store: ParamStore,
    subs: SubscriptionRegistry,
    dispatcher: NotificationDispatcher,
}

impl ParamService {
    /// Build a service over `backend`, notifying subscribers through
    /// `delivery`. Must be called within a tokio runtime.
    pub fn new(
        backend: Arc<dyn ParamBackend>,
        delivery: Arc<dyn ParamDelivery>,
        config: &NotifyConfig,
    ) -> Self {
        let store = ParamStore::new(backend.clone());
        let subs = SubscriptionRegistry::new(backend);
        let dispatcher = NotificationDispatcher::spawn(subs.clone(), delivery, config);
        Self { store, subs, dispatcher }
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Canonical path of `key_path` as seen from `caller_path`.
    pub fn resolve(key_path: &str, caller_path: &str) -> String {
        resolve(key_path, caller_path)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store `value` at `key_path`, replacing everything at or under it.
    ///
    /// A non-empty mapping is written as one concurrent `set` per key. The
    /// first failing key fails the whole call; keys that already succeeded
    /// stay written and keys still in flight keep running.
    ///
    /// On success, subscribers of the resolved path are notified in the
    /// background.
    pub async fn set(
        &self,
        key_path: &str,
        value: Value,
        creator_path: &str,
        creator_ipv4: &str,
    ) -> Result<()> {
        let path = resolve(key_path, creator_path);
        let creator = Arc::new(Creator {
            path: creator_path.to_string(),
            ipv4: creator_ipv4.to_string(),
        });
        self.set_resolved(path, value, creator).await
    }

    fn set_resolved(
        &self,
        path: String,
        value: Value,
        creator: Arc<Creator>,
    ) -> BoxFuture<'static, Result<()>> {
        let this = self.clone();
        Box::pin(async move {
            debug!("set {}", path);
            match &value {
                Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::String(_)
                | Value::Array(_) => this.replace_subtree(&path, &value, &creator).await?,
                Value::Object(map) if map.is_empty() => {
                    debug!("param at {} set to empty mapping", path);
                    this.replace_subtree(&path, &Value::Null, &creator).await?
                }
                Value::Object(map) => this.fan_out(&path, map, &creator).await?,
            }

            this.dispatcher.schedule(&path, value);
            Ok(())
        })
    }

    async fn replace_subtree(&self, path: &str, value: &Value, creator: &Creator) -> Result<()> {
        self.store.delete_leaves_under_subpath(path).await?;
        self.store
            .upsert_leaf(path, value, &creator.path, &creator.ipv4)
            .await
    }

    async fn fan_out(
        &self,
        path: &str,
        map: &Map<String, Value>,
        creator: &Arc<Creator>,
    ) -> Result<()> {
        let mut pending: FuturesUnordered<JoinHandle<Result<()>>> = map
            .iter()
            .map(|(key, value)| {
                let child = resolve(&format!("{}{}", path, key), &creator.path);
                tokio::spawn(self.set_resolved(child, value.clone(), creator.clone()))
            })
            .collect();

        // returning early drops the remaining handles, which detaches
        // (does not abort) their tasks
        while let Some(joined) = pending.next().await {
            joined.map_err(|e| Error::Internal(format!("set under {} failed: {}", path, e)))??;
        }
        Ok(())
    }

    /// Read a JSON document from `file` and `set` it at `key_path`.
    pub async fn load_file(
        &self,
        key_path: &str,
        file: &Path,
        creator_path: &str,
        creator_ipv4: &str,
    ) -> Result<()> {
        let text = tokio::fs::read_to_string(file).await?;
        let value: Value = serde_json::from_str(&text)?;
        debug!("loading {} into {}", file.display(), key_path);
        self.set(key_path, value, creator_path, creator_ipv4).await
    }

    /// Remove the leaves stored at exactly `key_path`. Leaves nested below
    /// it are untouched. Returns the number removed.
    pub async fn delete_by_key(&self, caller_path: &str, key_path: &str) -> Result<usize> {
        let path = resolve(key_path, caller_path);
        debug!("delete {}", path);
        self.store.delete_exact(&path).await
    }

    /// Remove every parameter and subscription, returning the count removed.
    pub async fn reset(&self) -> Result<usize> {
        self.store.reset().await
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The value at `key_path`, folded from every leaf at or under it.
    pub async fn get(&self, caller_path: &str, key_path: &str) -> Result<Option<Value>> {
        let path = resolve(key_path, caller_path);
        let params = self.store.read_all_under_subpath(&path).await?;
        debug!("get {} ({} leaves)", path, params.len());
        Ok(tree::fold(&path, &params))
    }

    /// The newest leaf stored at exactly `key_path`, without folding.
    pub async fn get_exact(&self, caller_path: &str, key_path: &str) -> Result<Option<Value>> {
        let path = resolve(key_path, caller_path);
        Ok(self
            .store
            .read_exact_latest(&path)
            .await?
            .map(|param| param.value.to_json()))
    }

    pub async fn has_param(&self, caller_path: &str, key_path: &str) -> Result<bool> {
        Ok(self.get(caller_path, key_path).await?.is_some())
    }

    /// Every stored leaf path, without trailing slash.
    pub async fn list_keys(&self) -> Result<Vec<String>> {
        self.store.all_keys().await
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe the node at `subscriber_path` to writes at exactly
    /// `key_path`, resolved from the subscriber's own scope.
    pub async fn subscribe(
        &self,
        key_path: &str,
        subscriber_path: &str,
        subscriber_uri: &str,
        subscriber_ipv4: &str,
    ) -> Result<()> {
        let path = resolve(key_path, subscriber_path);
        self.subs
            .subscribe(&path, subscriber_path, subscriber_uri, subscriber_ipv4)
            .await
    }

    /// Returns the number of subscriptions removed.
    pub async fn unsubscribe(
        &self,
        key_path: &str,
        subscriber_path: &str,
        subscriber_uri: &str,
    ) -> Result<usize> {
        let path = resolve(key_path, subscriber_path);
        self.subs.unsubscribe(&path, subscriber_path, subscriber_uri).await
    }
}
