//! In-process backend on concurrent hash maps
//!
//! Documents are bucketed by key path. Every inserted document takes a
//! sequence number so that equal `created` times still sort in insertion
//! order.

use crate::backend::{ParamBackend, ParamFilter, SortOrder, SubFilter};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use vapor_core::{Param, ParamSub, Result};

#[derive(Clone, Debug)]
struct StoredParam {
    seq: u64,
    param: Param,
}

impl StoredParam {
    fn recency(&self) -> (chrono::DateTime<chrono::Utc>, u64) {
        (self.param.created, self.seq)
    }
}

pub struct MemoryBackend {
    params: DashMap<String, Vec<StoredParam>>,
    subs: DashMap<String, Vec<ParamSub>>,
    next_seq: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self { Self::new() }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            params: DashMap::new(),
            subs: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    fn stamp(&self, param: Param) -> StoredParam {
        StoredParam {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            param,
        }
    }

    fn collect(&self, filter: &ParamFilter) -> Vec<StoredParam> {
        match filter {
            ParamFilter::Exact(path) => self
                .params
                .get(path)
                .map(|bucket| bucket.value().clone())
                .unwrap_or_default(),
            _ => self
                .params
                .iter()
                .filter(|entry| filter.matches(entry.key()))
                .flat_map(|entry| entry.value().clone())
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl ParamBackend for MemoryBackend {
    fn name(&self) -> &str { "memory" }

    async fn insert_param(&self, param: Param) -> Result<()> {
        let stored = self.stamp(param);
        self.params
            .entry(stored.param.key_path.clone())
            .or_default()
            .push(stored);
        Ok(())
    }

    async fn upsert_param(&self, param: Param) -> Result<()> {
        let mut bucket = self.params.entry(param.key_path.clone()).or_default();
        let newest = bucket
            .iter_mut()
            .max_by_key(|stored| stored.recency());

        match newest {
            Some(stored) => {
                let created = stored.param.created;
                stored.param = Param { created, ..param };
            }
            None => {
                let stored = self.stamp(param);
                bucket.push(stored);
            }
        }
        Ok(())
    }

    async fn find_params(&self, filter: ParamFilter, order: SortOrder) -> Result<Vec<Param>> {
        let mut found = self.collect(&filter);
        match order {
            SortOrder::OldestFirst => found.sort_by_key(|s| s.recency()),
            SortOrder::NewestFirst => found.sort_by_key(|s| std::cmp::Reverse(s.recency())),
        }
        Ok(found.into_iter().map(|s| s.param).collect())
    }

    async fn find_latest_param(&self, key_path: &str) -> Result<Option<Param>> {
        Ok(self.params.get(key_path).and_then(|bucket| {
            bucket
                .iter()
                .max_by_key(|stored| stored.recency())
                .map(|stored| stored.param.clone())
        }))
    }

    async fn delete_params(&self, filter: ParamFilter) -> Result<usize> {
        if let ParamFilter::Exact(path) = &filter {
            return Ok(self.params.remove(path).map(|(_, b)| b.len()).unwrap_or(0));
        }

        let mut removed = 0;
        self.params.retain(|key, bucket| {
            if filter.matches(key) {
                removed += bucket.len();
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn insert_sub(&self, sub: ParamSub) -> Result<()> {
        self.subs.entry(sub.key_path.clone()).or_default().push(sub);
        Ok(())
    }

    async fn find_subs(&self, filter: SubFilter) -> Result<Vec<ParamSub>> {
        let found = match &filter {
            SubFilter::Path(path) => self.subs.get(path).map(|b| b.value().clone()).unwrap_or_default(),
            _ => self
                .subs
                .iter()
                .flat_map(|entry| entry.value().clone())
                .filter(|sub| filter.matches(sub))
                .collect(),
        };
        Ok(found)
    }

    async fn delete_subs(&self, filter: SubFilter) -> Result<usize> {
        let mut removed = 0;
        self.subs.retain(|_, bucket| {
            let before = bucket.len();
            bucket.retain(|sub| !filter.matches(sub));
            removed += before - bucket.len();
            !bucket.is_empty()
        });
        Ok(removed)
    }
}
