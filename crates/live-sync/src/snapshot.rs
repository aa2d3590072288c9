//! Batched live-broadcast snapshot for one cycle.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::interest::Interests;
use crate::model::{BroadcasterId, CategoryId, LiveBroadcastInfo};
use crate::{SourceError, StreamSource, UpstreamQueryFailure};

/// Upstream request limits for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Maximum ids per upstream request.
    pub batch_size: usize,
    /// Hard ceiling on ids queried per cycle, both kinds combined.
    pub max_ids_per_cycle: usize,
    /// Extra attempts for a failed chunk before it counts as failed.
    pub retries: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_ids_per_cycle: 5000,
            retries: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Broadcaster,
    Category,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcaster => f.write_str("broadcaster"),
            Self::Category => f.write_str("category"),
        }
    }
}

/// Canonical broadcast objects for one cycle.
///
/// Create a fresh cache per cycle; nothing in it is valid afterwards.
#[derive(Debug, Default)]
pub struct CycleCache {
    streams: HashMap<BroadcasterId, Arc<LiveBroadcastInfo>>,
}

impl CycleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcaster-id results replace whatever was cached.
    fn insert_authoritative(&mut self, info: LiveBroadcastInfo) -> Arc<LiveBroadcastInfo> {
        let info = Arc::new(info);
        self.streams
            .insert(info.broadcaster_id.clone(), Arc::clone(&info));
        info
    }

    /// Category results reuse an already cached object for the broadcaster.
    fn canonical(&mut self, info: LiveBroadcastInfo) -> Arc<LiveBroadcastInfo> {
        let entry = self
            .streams
            .entry(info.broadcaster_id.clone())
            .or_insert_with(|| Arc::new(info));
        Arc::clone(entry)
    }

    pub fn get(&self, id: &BroadcasterId) -> Option<&Arc<LiveBroadcastInfo>> {
        self.streams.get(id)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Whether a broadcaster is live according to this cycle's snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Liveness<'a> {
    Live(&'a Arc<LiveBroadcastInfo>),
    Offline,
    /// The query covering this broadcaster failed or was skipped.
    Unknown,
}

/// Read-only view of what is live this cycle.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    by_broadcaster: HashMap<BroadcasterId, Arc<LiveBroadcastInfo>>,
    by_category: HashMap<CategoryId, Vec<Arc<LiveBroadcastInfo>>>,
    unresolved_broadcasters: HashSet<BroadcasterId>,
    unresolved_categories: HashSet<CategoryId>,
    failures: Vec<UpstreamQueryFailure>,
}

impl Snapshot {
    /// Snapshot in which every query succeeded and exactly `infos` are live.
    pub fn from_live(infos: impl IntoIterator<Item = LiveBroadcastInfo>) -> Self {
        let mut snapshot = Self::default();
        for info in infos {
            snapshot.insert(Arc::new(info));
        }
        snapshot
    }

    fn insert(&mut self, info: Arc<LiveBroadcastInfo>) {
        let canonical = self
            .by_broadcaster
            .entry(info.broadcaster_id.clone())
            .or_insert(info);
        let listed = self
            .by_category
            .entry(canonical.category_id.clone())
            .or_default();
        if !listed
            .iter()
            .any(|i| i.broadcaster_id == canonical.broadcaster_id)
        {
            listed.push(Arc::clone(canonical));
        }
    }

    pub fn liveness(&self, id: &BroadcasterId) -> Liveness<'_> {
        match self.by_broadcaster.get(id) {
            Some(info) => Liveness::Live(info),
            None if self.unresolved_broadcasters.contains(id) => Liveness::Unknown,
            None => Liveness::Offline,
        }
    }

    pub fn live(&self, id: &BroadcasterId) -> Option<&Arc<LiveBroadcastInfo>> {
        self.by_broadcaster.get(id)
    }

    pub fn in_category(&self, id: &CategoryId) -> &[Arc<LiveBroadcastInfo>] {
        self.by_category.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn live_count(&self) -> usize {
        self.by_broadcaster.len()
    }

    pub fn mark_unresolved_broadcasters(&mut self, ids: impl IntoIterator<Item = BroadcasterId>) {
        self.unresolved_broadcasters.extend(ids);
    }

    pub fn is_category_unresolved(&self, id: &CategoryId) -> bool {
        self.unresolved_categories.contains(id)
    }

    pub fn failures(&self) -> &[UpstreamQueryFailure] {
        &self.failures
    }
}

enum Chunk<'a> {
    Broadcasters(&'a [BroadcasterId]),
    Categories(&'a [CategoryId]),
}

impl Chunk<'_> {
    fn kind(&self) -> QueryKind {
        match self {
            Self::Broadcasters(_) => QueryKind::Broadcaster,
            Self::Categories(_) => QueryKind::Category,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Broadcasters(ids) => ids.len(),
            Self::Categories(ids) => ids.len(),
        }
    }
}

async fn query_chunk<S: StreamSource>(
    source: &S,
    chunk: &Chunk<'_>,
    retries: u32,
) -> Result<Vec<LiveBroadcastInfo>, UpstreamQueryFailure> {
    let mut last_error = SourceError(String::new());
    for attempt in 0..=retries {
        let result = match chunk {
            Chunk::Broadcasters(ids) => source.live_by_broadcaster_ids(ids).await,
            Chunk::Categories(ids) => source.live_by_category_ids(ids).await,
        };
        match result {
            Ok(infos) => return Ok(infos),
            Err(e) => {
                tracing::debug!(
                    kind = %chunk.kind(),
                    attempt,
                    error = %e,
                    "Live query chunk failed"
                );
                last_error = e;
            }
        }
    }
    Err(UpstreamQueryFailure {
        kind: chunk.kind(),
        id_count: chunk.len(),
        message: last_error.0,
    })
}

fn split_at_budget<T>(ids: &[T], budget: &mut usize) -> (usize, usize) {
    let take = ids.len().min(*budget);
    *budget -= take;
    (take, ids.len() - take)
}

/// Query everything in `interests` in chunks of at most `limits.batch_size`.
///
/// Failed chunks never abort the fetch: their broadcaster ids become
/// [`Liveness::Unknown`] and the failure is kept on the snapshot.
pub async fn fetch_snapshot<S: StreamSource>(
    source: &S,
    interests: &Interests,
    limits: &FetchLimits,
    cache: &mut CycleCache,
) -> Snapshot {
    let mut snapshot = Snapshot::default();
    let batch_size = limits.batch_size.max(1);
    let mut budget = limits.max_ids_per_cycle;

    let broadcasters: Vec<BroadcasterId> = interests.broadcasters.iter().cloned().collect();
    let (take, skipped) = split_at_budget(&broadcasters, &mut budget);
    if skipped > 0 {
        tracing::warn!(
            skipped,
            ceiling = limits.max_ids_per_cycle,
            "Broadcaster ids over per-cycle ceiling; their state is left untouched"
        );
        snapshot.mark_unresolved_broadcasters(broadcasters[take..].iter().cloned());
    }

    for ids in broadcasters[..take].chunks(batch_size) {
        match query_chunk(source, &Chunk::Broadcasters(ids), limits.retries).await {
            Ok(infos) => {
                for info in infos {
                    let info = cache.insert_authoritative(info);
                    snapshot.insert(info);
                }
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "Broadcaster chunk unresolved this cycle");
                snapshot.mark_unresolved_broadcasters(ids.iter().cloned());
                snapshot.failures.push(failure);
            }
        }
    }

    let categories: Vec<CategoryId> = interests.categories.iter().cloned().collect();
    let (take, skipped) = split_at_budget(&categories, &mut budget);
    if skipped > 0 {
        tracing::warn!(
            skipped,
            ceiling = limits.max_ids_per_cycle,
            "Category ids over per-cycle ceiling; not queried this cycle"
        );
        snapshot
            .unresolved_categories
            .extend(categories[take..].iter().cloned());
    }

    for ids in categories[..take].chunks(batch_size) {
        match query_chunk(source, &Chunk::Categories(ids), limits.retries).await {
            Ok(infos) => {
                for info in infos {
                    let info = cache.canonical(info);
                    snapshot.insert(info);
                }
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "Category chunk unresolved this cycle");
                snapshot.unresolved_categories.extend(ids.iter().cloned());
                snapshot.failures.push(failure);
            }
        }
    }

    tracing::debug!(
        live = snapshot.live_count(),
        failures = snapshot.failures.len(),
        "Snapshot fetched"
    );
    snapshot
}
