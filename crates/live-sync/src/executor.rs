//! Apply reconciliation actions against the messaging surface.

use serde::Serialize;

use crate::model::{
    BroadcasterId, ChannelId, LiveBroadcastInfo, MessageId, MessageRecord, RecordKind,
    TenantWatchConfig,
};
use crate::reconcile::{Action, DeleteTarget};
use crate::snapshot::{Liveness, Snapshot};
use crate::{MessagingSurface, SurfaceError};

/// Messaging surfaces accept at most this many ids per bulk delete.
const BULK_DELETE_LIMIT: usize = 100;

/// Counters for one guild's execution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Messages that were already gone when we touched them.
    pub already_gone: usize,
    /// Actions left for the next cycle after a surface failure.
    pub failed: usize,
    pub temporarily_blocked: usize,
    pub unblocked: usize,
    /// Creates held back until the broadcaster's old record is gone.
    pub deferred: usize,
}

impl ExecutionReport {
    pub fn merge(&mut self, other: &ExecutionReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.already_gone += other.already_gone;
        self.failed += other.failed;
        self.temporarily_blocked += other.temporarily_blocked;
        self.unblocked += other.unblocked;
        self.deferred += other.deferred;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeleteOutcome {
    Deleted,
    AlreadyGone,
    Failed(String),
}

fn remove_record(config: &mut TenantWatchConfig, kind: RecordKind, record: &MessageRecord) {
    config.records_mut(kind).retain(|r| {
        !(r.message_id == record.message_id && r.channel_id == record.channel_id)
    });
}

/// Keyed by login; falls back to the id when the login is missing or
/// already holds another broadcaster's block.
fn temporarily_block(
    config: &mut TenantWatchConfig,
    id: &BroadcasterId,
    info: &LiveBroadcastInfo,
) {
    let blocks = &mut config.temporarily_blocked_broadcasters;
    if blocks.values().any(|blocked| blocked == id) {
        return;
    }
    let by_id = id.as_str().to_string();
    let name = match info.display.broadcaster_login.trim() {
        "" => by_id,
        login => {
            let login = login.to_lowercase();
            match blocks.get(&login) {
                Some(other) if other != id => by_id,
                _ => login,
            }
        }
    };
    blocks.insert(name, id.clone());
}

async fn delete_single<M: MessagingSurface>(
    surface: &M,
    channel: &ChannelId,
    message: &MessageId,
) -> DeleteOutcome {
    match surface.delete(channel, message).await {
        Ok(()) => DeleteOutcome::Deleted,
        Err(SurfaceError::NotFound) => DeleteOutcome::AlreadyGone,
        Err(SurfaceError::Failed(e)) => DeleteOutcome::Failed(e),
    }
}

/// Delete one channel's messages, bulk where possible.
///
/// A rejected or not-found bulk call falls back to single deletes, which
/// also covers messages too old for bulk deletion.
async fn delete_group<M: MessagingSurface>(
    surface: &M,
    channel: &ChannelId,
    targets: &[DeleteTarget],
) -> Vec<DeleteOutcome> {
    let ids: Vec<MessageId> = targets.iter().map(|t| t.record.message_id.clone()).collect();
    let mut outcomes = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(BULK_DELETE_LIMIT) {
        if chunk.len() >= 2 {
            match surface.bulk_delete(channel, chunk).await {
                Ok(()) => {
                    outcomes.extend(chunk.iter().map(|_| DeleteOutcome::Deleted));
                    continue;
                }
                // Any unknown id fails the whole batch.
                Err(SurfaceError::NotFound) => {
                    tracing::debug!(
                        channel = %channel,
                        count = chunk.len(),
                        "Bulk delete hit a missing message, deleting one by one"
                    );
                }
                Err(SurfaceError::Failed(e)) => {
                    tracing::debug!(
                        channel = %channel,
                        count = chunk.len(),
                        error = %e,
                        "Bulk delete rejected, deleting one by one"
                    );
                }
            }
        }
        for id in chunk {
            outcomes.push(delete_single(surface, channel, id).await);
        }
    }
    outcomes
}

/// Apply `actions` in order and return the updated config.
///
/// Surface failures never abort the pass: the affected record is kept (or
/// not created) and the next cycle retries. Temporary blocks for
/// broadcasters observed offline in `snapshot` are lifted at the end.
pub async fn apply_actions<M: MessagingSurface>(
    surface: &M,
    mut config: TenantWatchConfig,
    actions: Vec<Action>,
    snapshot: &Snapshot,
) -> (TenantWatchConfig, ExecutionReport) {
    let mut report = ExecutionReport::default();

    for action in actions {
        match action {
            Action::Create { channel_id, info } => {
                if config.has_record_in(&info.broadcaster_id, &channel_id) {
                    continue;
                }
                if config.has_primary_record(&info.broadcaster_id) {
                    // The old announcement could not be removed yet.
                    tracing::debug!(
                        broadcaster = %info.broadcaster_id,
                        channel = %channel_id,
                        "Previous announcement still tracked, deferring post"
                    );
                    report.deferred += 1;
                    continue;
                }
                match surface.send(&channel_id, &info).await {
                    Ok(message_id) => {
                        tracing::debug!(
                            broadcaster = %info.broadcaster_id,
                            channel = %channel_id,
                            message_id = %message_id,
                            "Posted live announcement"
                        );
                        config
                            .primary_records
                            .push(MessageRecord::for_info(channel_id, message_id, &info));
                        report.created += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            broadcaster = %info.broadcaster_id,
                            channel = %channel_id,
                            error = %e,
                            "Failed to post live announcement"
                        );
                        report.failed += 1;
                    }
                }
            }
            Action::Update { kind, record, info } => {
                match surface
                    .edit(&record.channel_id, &record.message_id, &info)
                    .await
                {
                    Ok(()) => {
                        if let Some(r) = config
                            .records_mut(kind)
                            .iter_mut()
                            .find(|r| {
                                r.message_id == record.message_id
                                    && r.channel_id == record.channel_id
                            })
                        {
                            r.refresh_from(&info);
                        }
                        report.updated += 1;
                    }
                    Err(SurfaceError::NotFound) => {
                        remove_record(&mut config, kind, &record);
                        report.already_gone += 1;
                        if kind == RecordKind::Primary {
                            // Removed by hand; do not repost until the stream ends.
                            temporarily_block(&mut config, &record.broadcaster_id, &info);
                            report.temporarily_blocked += 1;
                            tracing::info!(
                                broadcaster = %record.broadcaster_id,
                                channel = %record.channel_id,
                                "Announcement removed externally, muting until offline"
                            );
                        }
                    }
                    Err(SurfaceError::Failed(e)) => {
                        tracing::warn!(
                            broadcaster = %record.broadcaster_id,
                            message_id = %record.message_id,
                            error = %e,
                            "Failed to edit live announcement"
                        );
                        report.failed += 1;
                    }
                }
            }
            Action::Delete { channel_id, targets } => {
                let outcomes = delete_group(surface, &channel_id, &targets).await;
                for (target, outcome) in targets.iter().zip(outcomes) {
                    match outcome {
                        DeleteOutcome::Deleted => {
                            remove_record(&mut config, target.kind, &target.record);
                            report.deleted += 1;
                        }
                        DeleteOutcome::AlreadyGone => {
                            remove_record(&mut config, target.kind, &target.record);
                            report.already_gone += 1;
                        }
                        DeleteOutcome::Failed(e) => {
                            tracing::warn!(
                                channel = %channel_id,
                                message_id = %target.record.message_id,
                                error = %e,
                                "Failed to delete announcement, retrying next cycle"
                            );
                            report.failed += 1;
                        }
                    }
                }
            }
        }
    }

    let before = config.temporarily_blocked_broadcasters.len();
    config
        .temporarily_blocked_broadcasters
        .retain(|_, id| !matches!(snapshot.liveness(id), Liveness::Offline));
    report.unblocked = before - config.temporarily_blocked_broadcasters.len();

    (config, report)
}

/// Result of a one-off override announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideOutcome {
    Posted(MessageId),
    /// A record for this broadcaster already exists in that channel.
    AlreadyPosted,
    Blocked,
    ChannelGone,
}

/// Post a one-off announcement and track it as an override record.
///
/// The record is then kept up to date and removed when the broadcast ends,
/// regardless of the guild's follow rules.
pub async fn announce_override<M: MessagingSurface>(
    surface: &M,
    config: &mut TenantWatchConfig,
    channel: &ChannelId,
    info: &LiveBroadcastInfo,
) -> Result<OverrideOutcome, SurfaceError> {
    if config.is_blocked(&info.broadcaster_id) {
        return Ok(OverrideOutcome::Blocked);
    }
    if config.has_record_in(&info.broadcaster_id, channel) {
        return Ok(OverrideOutcome::AlreadyPosted);
    }
    match surface.send(channel, info).await {
        Ok(message_id) => {
            config.override_records.push(MessageRecord::for_info(
                channel.clone(),
                message_id.clone(),
                info,
            ));
            Ok(OverrideOutcome::Posted(message_id))
        }
        Err(SurfaceError::NotFound) => Ok(OverrideOutcome::ChannelGone),
        Err(e) => Err(e),
    }
}
