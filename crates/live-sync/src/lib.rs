//! Live-stream announcement reconciliation.
//!
//! One polling cycle runs: interest aggregation, snapshot fetch,
//! per-guild classification, reconciliation against posted records,
//! and action execution against the messaging surface.

pub mod classify;
pub mod cycle;
pub mod executor;
pub mod interest;
pub mod keywords;
pub mod model;
pub mod reconcile;
pub mod snapshot;
pub mod watch;

#[cfg(test)]
mod test_support;

use std::future::Future;

pub use classify::{Classification, DecisionRule, SuppressReason, Verdict, classify};
pub use cycle::{CycleReport, CycleSummary, SyncEngine, SyncOptions};
pub use executor::{ExecutionReport, OverrideOutcome, announce_override, apply_actions};
pub use interest::{Interests, aggregate_interests, tenant_interests};
pub use keywords::KeywordFilter;
pub use model::{
    BroadcastId, BroadcasterId, CategoryId, ChannelId, DisplayMetadata, GuildId, LiveBroadcastInfo,
    MessageId, MessageRecord, RecordKind, TenantWatchConfig,
};
pub use reconcile::{Action, DeleteReason, DeleteTarget, reconcile};
pub use snapshot::{CycleCache, FetchLimits, Liveness, QueryKind, Snapshot, fetch_snapshot};
pub use watch::EditOutcome;

/// Broadcast-platform query API ("who is live" lookups).
///
/// Callers never pass more ids than the configured batch size.
pub trait StreamSource: Sync {
    fn live_by_broadcaster_ids(
        &self,
        ids: &[BroadcasterId],
    ) -> impl Future<Output = Result<Vec<LiveBroadcastInfo>, SourceError>> + Send;

    fn live_by_category_ids(
        &self,
        ids: &[CategoryId],
    ) -> impl Future<Output = Result<Vec<LiveBroadcastInfo>, SourceError>> + Send;
}

/// Messaging surface that carries the announcements.
///
/// Rendering the announcement from a [`LiveBroadcastInfo`] is the
/// implementation's concern.
pub trait MessagingSurface: Sync {
    fn send(
        &self,
        channel: &ChannelId,
        info: &LiveBroadcastInfo,
    ) -> impl Future<Output = Result<MessageId, SurfaceError>> + Send;

    fn edit(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        info: &LiveBroadcastInfo,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    fn delete(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Delete several messages of one channel. Callers pass 2..=100 ids.
    fn bulk_delete(
        &self,
        channel: &ChannelId,
        messages: &[MessageId],
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;
}

/// Per-guild configuration store.
pub trait ConfigStore: Sync {
    fn get(
        &self,
        guild: &GuildId,
    ) -> impl Future<Output = Result<Option<TenantWatchConfig>, StoreError>> + Send;

    fn set(
        &self,
        guild: &GuildId,
        config: &TenantWatchConfig,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct SourceError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The message or its channel no longer exists.
    #[error("message or channel not found")]
    NotFound,

    #[error("messaging surface failure: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("stored config is corrupt: {0}")]
    Corrupt(String),

    #[error("config store failure: {0}")]
    Backend(String),
}

/// A chunk query that still failed after its retries.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} query for {id_count} ids failed: {message}")]
pub struct UpstreamQueryFailure {
    pub kind: QueryKind,
    pub id_count: usize,
    pub message: String,
}

/// Errors surfaced per guild by the cycle driver.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to load config for guild {guild}: {source}")]
    ConfigLoad { guild: GuildId, source: StoreError },

    #[error("failed to persist config for guild {guild}: {source}")]
    ConfigPersist { guild: GuildId, source: StoreError },

    #[error("invalid keyword filter: {0}")]
    KeywordFilter(#[from] regex::Error),
}
