//! Exact-path parameter subscriptions

use crate::backend::{ParamBackend, SubFilter};
use std::sync::Arc;
use tracing::{debug, warn};
use vapor_core::{ensure_trailing_slash, ParamSub, Result};

/// Tracks which remote nodes want to hear about writes to which paths.
///
/// Duplicate subscriptions are kept; each one is notified separately.
#[derive(Clone)]
pub struct SubscriptionRegistry {
    backend: Arc<dyn ParamBackend>,
}

impl SubscriptionRegistry {
    pub fn new(backend: Arc<dyn ParamBackend>) -> Self {
        Self { backend }
    }

    pub async fn subscribe(
        &self,
        path: &str,
        subscriber_path: &str,
        subscriber_uri: &str,
        subscriber_ipv4: &str,
    ) -> Result<()> {
        let key_path = ensure_trailing_slash(path);
        debug!("subscribe {} -> {} ({})", key_path, subscriber_path, subscriber_uri);
        self.backend
            .insert_sub(ParamSub {
                key_path,
                subscriber_path: subscriber_path.to_string(),
                subscriber_uri: subscriber_uri.to_string(),
                subscriber_ipv4: subscriber_ipv4.to_string(),
            })
            .await
    }

    /// Remove every subscription of this subscriber at `path`, returning the
    /// number removed.
    pub async fn unsubscribe(
        &self,
        path: &str,
        subscriber_path: &str,
        subscriber_uri: &str,
    ) -> Result<usize> {
        let key_path = ensure_trailing_slash(path);
        let removed = self
            .backend
            .delete_subs(SubFilter::Identity {
                key_path: key_path.clone(),
                subscriber_path: subscriber_path.to_string(),
                subscriber_uri: subscriber_uri.to_string(),
            })
            .await?;
        if removed > 1 {
            warn!("removed multiple subs at '{}' for param '{}'", subscriber_path, key_path);
        }
        Ok(removed)
    }

    /// Subscriptions registered at exactly `path`. Ancestors and descendants
    /// do not match.
    pub async fn subscribers_of(&self, path: &str) -> Result<Vec<ParamSub>> {
        let key_path = ensure_trailing_slash(path);
        self.backend.find_subs(SubFilter::Path(key_path)).await
    }
}
