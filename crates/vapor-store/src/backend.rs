//! Persistence backend trait

use vapor_core::{is_subpath, Param, ParamSub, Result};

/// Which parameter documents an operation applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamFilter {
    /// Every document.
    All,
    /// Documents at exactly this key path.
    Exact(String),
    /// Documents at this key path or nested anywhere below it.
    Subpath(String),
}

impl ParamFilter {
    pub fn matches(&self, key_path: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(path) => key_path == path,
            Self::Subpath(path) => is_subpath(key_path, path),
        }
    }
}

/// Ordering by creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

/// Which subscription documents an operation applies to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubFilter {
    All,
    /// Subscriptions registered at exactly this key path.
    Path(String),
    /// One subscriber's subscriptions at one key path.
    Identity {
        key_path: String,
        subscriber_path: String,
        subscriber_uri: String,
    },
}

impl SubFilter {
    pub fn matches(&self, sub: &ParamSub) -> bool {
        match self {
            Self::All => true,
            Self::Path(path) => &sub.key_path == path,
            Self::Identity {
                key_path,
                subscriber_path,
                subscriber_uri,
            } => {
                &sub.key_path == key_path
                    && &sub.subscriber_path == subscriber_path
                    && &sub.subscriber_uri == subscriber_uri
            }
        }
    }
}

/// Storage for the two document collections.
///
/// Nothing here enforces one document per key path; that is the write
/// path's job. Implementations break ties on `created` by insertion order.
#[async_trait::async_trait]
pub trait ParamBackend: Send + Sync {
    /// Human-readable backend name (for logs).
    fn name(&self) -> &str;

    /// Create a new parameter document unconditionally.
    async fn insert_param(&self, param: Param) -> Result<()>;

    /// Overwrite the newest document at `param.key_path` in place, keeping
    /// its `created` time, or insert `param` if there is none.
    async fn upsert_param(&self, param: Param) -> Result<()>;

    async fn find_params(&self, filter: ParamFilter, order: SortOrder) -> Result<Vec<Param>>;

    /// The most recently created document at exactly `key_path`.
    async fn find_latest_param(&self, key_path: &str) -> Result<Option<Param>>;

    /// Delete matching documents, returning how many were removed.
    async fn delete_params(&self, filter: ParamFilter) -> Result<usize>;

    async fn insert_sub(&self, sub: ParamSub) -> Result<()>;

    async fn find_subs(&self, filter: SubFilter) -> Result<Vec<ParamSub>>;

    async fn delete_subs(&self, filter: SubFilter) -> Result<usize>;
}
