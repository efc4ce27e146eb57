//! Parameter leaf documents
//!
//! One document per leaf value. A mapping never becomes a document of its
//! own; callers decompose it into leaves first. Every path handed to this
//! module is expected in canonical form.

use crate::backend::{ParamBackend, ParamFilter, SortOrder, SubFilter};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vapor_core::{ensure_trailing_slash, Param, ParamValue, Result};

#[derive(Clone)]
pub struct ParamStore {
    backend: Arc<dyn ParamBackend>,
}

impl ParamStore {
    pub fn new(backend: Arc<dyn ParamBackend>) -> Self {
        Self { backend }
    }

    /// Write a single leaf at `path`, replacing the newest document there.
    ///
    /// Fails with `InvalidValueType` for a mapping.
    pub async fn upsert_leaf(
        &self,
        path: &str,
        value: &Value,
        creator_path: &str,
        creator_ipv4: &str,
    ) -> Result<()> {
        let value = ParamValue::classify(path, value)?;
        if matches!(&value, ParamValue::String(s) if s.is_empty()) {
            debug!("empty string value at {}", path);
        }
        debug!("upsert {} ({})", path, value.value_type());
        self.backend
            .upsert_param(Param::new(path, value, creator_path, creator_ipv4))
            .await
    }

    /// Clobber: remove every leaf at or under `path`. A missing trailing
    /// slash is added, so `/robot` never reaches into `/robots/`.
    pub async fn delete_leaves_under_subpath(&self, path: &str) -> Result<usize> {
        let path = ensure_trailing_slash(path);
        let removed = self
            .backend
            .delete_params(ParamFilter::Subpath(path.clone()))
            .await?;
        debug!("clobbered {} leaves under {}", removed, path);
        Ok(removed)
    }

    /// Remove every leaf at exactly `path`. A missing trailing slash is added.
    ///
    /// More than one match means concurrent writers left duplicates behind;
    /// all of them go.
    pub async fn delete_exact(&self, path: &str) -> Result<usize> {
        let path = ensure_trailing_slash(path);
        let removed = self
            .backend
            .delete_params(ParamFilter::Exact(path.clone()))
            .await?;
        if removed > 1 {
            warn!("removed multiple params at '{}'", path);
        }
        Ok(removed)
    }

    /// Newest leaf at exactly `path`. A missing trailing slash is added.
    pub async fn read_exact_latest(&self, path: &str) -> Result<Option<Param>> {
        let path = ensure_trailing_slash(path);
        self.backend.find_latest_param(&path).await
    }

    /// Every leaf at or under `path`, oldest first. A missing trailing slash
    /// is added.
    pub async fn read_all_under_subpath(&self, path: &str) -> Result<Vec<Param>> {
        let path = ensure_trailing_slash(path);
        self.backend
            .find_params(ParamFilter::Subpath(path), SortOrder::OldestFirst)
            .await
    }

    /// Distinct stored key paths without their trailing slash, sorted.
    pub async fn all_keys(&self) -> Result<Vec<String>> {
        let params = self
            .backend
            .find_params(ParamFilter::All, SortOrder::OldestFirst)
            .await?;
        let keys: BTreeSet<String> = params
            .into_iter()
            .map(|p| {
                let mut key = p.key_path;
                key.pop();
                key
            })
            .collect();
        Ok(keys.into_iter().collect())
    }

    /// Remove every parameter and every subscription.
    pub async fn reset(&self) -> Result<usize> {
        let params = self.backend.delete_params(ParamFilter::All).await?;
        let subs = self.backend.delete_subs(SubFilter::All).await?;
        info!("reset {}: removed {} params, {} subscriptions", self.backend.name(), params, subs);
        Ok(params + subs)
    }
}
