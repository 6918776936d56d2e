//! In-memory store for video previews.
//!
//! The temp file behind a request is deleted before the page is returned, so
//! the bytes shown by the inline player are kept here instead. The store is
//! bounded by entry count and by total size, and evicts the oldest entry
//! first. A single video larger than the byte budget is not stored.

use axum::body::Bytes;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;
use video_insight_common::error::Error;

/// A stored preview.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    /// Content type served with the bytes
    pub mime_type: String,
    /// Raw media bytes
    pub data: Bytes,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Uuid, MediaEntry>,
    order: VecDeque<Uuid>,
    total_bytes: u64,
}

impl Inner {
    fn evict_oldest(&mut self) {
        if let Some(evicted) = self.order.pop_front() {
            if let Some(entry) = self.entries.remove(&evicted) {
                self.total_bytes -= entry.data.len() as u64;
            }
            debug!(id = %evicted, total_bytes = self.total_bytes, "Evicted media preview");
        }
    }
}

/// Bounded, shareable preview store.
#[derive(Debug, Clone)]
pub struct MediaStore {
    capacity: usize,
    max_bytes: u64,
    inner: Arc<RwLock<Inner>>,
}

impl MediaStore {
    /// Create a store holding at most `capacity` previews totalling at most
    /// `max_bytes`. A zero capacity or budget disables it.
    pub fn new(capacity: usize, max_bytes: u64) -> Self {
        Self {
            capacity,
            max_bytes,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Maximum number of previews kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum total size of the previews kept.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn accepts(&self, size: u64) -> bool {
        self.capacity > 0 && size <= self.max_bytes
    }

    /// Store bytes and return their id.
    ///
    /// Returns `None` when the store is disabled or the data alone exceeds
    /// the byte budget.
    pub async fn insert(&self, data: impl Into<Bytes>, mime_type: &str) -> Option<Uuid> {
        let data = data.into();
        let size = data.len() as u64;
        if !self.accepts(size) {
            debug!(bytes = size, max_bytes = self.max_bytes, "Media preview not stored");
            return None;
        }

        let id = Uuid::new_v4();
        let mut inner = self.inner.write().await;
        while !inner.order.is_empty()
            && (inner.order.len() >= self.capacity || inner.total_bytes + size > self.max_bytes)
        {
            inner.evict_oldest();
        }
        inner.entries.insert(
            id,
            MediaEntry {
                mime_type: mime_type.to_string(),
                data,
            },
        );
        inner.order.push_back(id);
        inner.total_bytes += size;
        Some(id)
    }

    /// Read a file into the store. Files over the byte budget are not read.
    pub async fn insert_file(&self, path: &Path, mime_type: &str) -> Result<Option<Uuid>, Error> {
        let size = tokio::fs::metadata(path).await?.len();
        if !self.accepts(size) {
            debug!(path = %path.display(), bytes = size, "Video too large for preview");
            return Ok(None);
        }
        let data = tokio::fs::read(path).await?;
        Ok(self.insert(data, mime_type).await)
    }

    /// Look up a preview.
    pub async fn get(&self, id: &Uuid) -> Option<MediaEntry> {
        self.inner.read().await.entries.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Total size of the stored previews.
    pub async fn total_bytes(&self) -> u64 {
        self.inner.read().await.total_bytes
    }
}

/// How to answer a `Range` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// Send the whole body.
    Full,
    /// Send bytes `start..=end`.
    Partial { start: u64, end: u64 },
    /// The range lies outside the body.
    Unsatisfiable,
}

impl RangeRequest {
    /// Resolve a `Range` header against a body of `len` bytes.
    ///
    /// Only a single `bytes=` range is honored. Malformed or multi-range
    /// headers fall back to the full body.
    pub fn resolve(header: &str, len: u64) -> Self {
        let Some(spec) = header.trim().strip_prefix("bytes=") else {
            return RangeRequest::Full;
        };
        if spec.contains(',') {
            return RangeRequest::Full;
        }
        let Some((first, last)) = spec.trim().split_once('-') else {
            return RangeRequest::Full;
        };

        match (first.trim(), last.trim()) {
            ("", "") => RangeRequest::Full,
            ("", suffix) => match suffix.parse::<u64>() {
                Ok(0) => RangeRequest::Unsatisfiable,
                Ok(_) if len == 0 => RangeRequest::Unsatisfiable,
                Ok(n) => RangeRequest::Partial {
                    start: len.saturating_sub(n),
                    end: len - 1,
                },
                Err(_) => RangeRequest::Full,
            },
            (start, end) => {
                let Ok(start) = start.parse::<u64>() else {
                    return RangeRequest::Full;
                };
                let end = if end.is_empty() {
                    u64::MAX
                } else {
                    match end.parse::<u64>() {
                        Ok(end) if end >= start => end,
                        _ => return RangeRequest::Full,
                    }
                };
                if start >= len {
                    return RangeRequest::Unsatisfiable;
                }
                RangeRequest::Partial {
                    start,
                    end: end.min(len - 1),
                }
            }
        }
    }
}
