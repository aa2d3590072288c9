//! Diff classifications against posted records.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::classify::{Classification, SuppressReason, Verdict};
use crate::model::{
    BroadcasterId, ChannelId, LiveBroadcastInfo, MessageRecord, RecordKind, TenantWatchConfig,
};
use crate::snapshot::{Liveness, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    Offline,
    Blocked,
    NoLongerMatched,
    ChannelChanged,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTarget {
    pub kind: RecordKind,
    pub record: MessageRecord,
    pub reason: DeleteReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Post a new primary announcement. Skipped by the executor while the
    /// broadcaster still has a primary record elsewhere.
    Create {
        channel_id: ChannelId,
        info: Arc<LiveBroadcastInfo>,
    },
    /// Edit a posted announcement whose title or category changed.
    Update {
        kind: RecordKind,
        record: MessageRecord,
        info: Arc<LiveBroadcastInfo>,
    },
    /// Remove announcements, grouped per channel.
    Delete {
        channel_id: ChannelId,
        targets: Vec<DeleteTarget>,
    },
}

fn verdict_for(
    classifications: &BTreeMap<BroadcasterId, Classification>,
    snapshot: &Snapshot,
    id: &BroadcasterId,
) -> Verdict {
    if let Some(c) = classifications.get(id) {
        return c.verdict.clone();
    }
    match snapshot.liveness(id) {
        Liveness::Live(_) => Verdict::Suppressed(SuppressReason::NotFollowed),
        Liveness::Offline => Verdict::Suppressed(SuppressReason::Offline),
        Liveness::Unknown => Verdict::Unknown,
    }
}

fn suppress_reason(reason: SuppressReason) -> DeleteReason {
    match reason {
        SuppressReason::Blocked => DeleteReason::Blocked,
        SuppressReason::Offline => DeleteReason::Offline,
        SuppressReason::NotFollowed => DeleteReason::NoLongerMatched,
    }
}

/// Index of the primary record kept for each broadcaster: the first one in
/// the primary channel, else the first one.
fn primary_keepers<'a>(
    records: &'a [MessageRecord],
    primary_channel: Option<&ChannelId>,
) -> HashMap<&'a BroadcasterId, usize> {
    let mut keepers: HashMap<&BroadcasterId, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        match keepers.entry(&record.broadcaster_id) {
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
            Entry::Occupied(mut slot) => {
                let kept = &records[*slot.get()];
                if primary_channel != Some(&kept.channel_id)
                    && primary_channel == Some(&record.channel_id)
                {
                    slot.insert(index);
                }
            }
        }
    }
    keepers
}

/// Compute the actions that bring the guild's records in line with
/// `classifications`.
///
/// Pure: applying the returned actions successfully and reconciling again
/// against the same snapshot yields no actions. Deletes come first, then
/// updates, then creates.
pub fn reconcile(
    config: &TenantWatchConfig,
    classifications: &BTreeMap<BroadcasterId, Classification>,
    snapshot: &Snapshot,
) -> Vec<Action> {
    let mut deletes: BTreeMap<ChannelId, Vec<DeleteTarget>> = BTreeMap::new();
    let mut updates = Vec::new();
    let mut delete = |kind: RecordKind, record: &MessageRecord, reason: DeleteReason| {
        deletes
            .entry(record.channel_id.clone())
            .or_default()
            .push(DeleteTarget {
                kind,
                record: record.clone(),
                reason,
            });
    };

    let primary_channel = config.primary_channel_id.as_ref();
    let keepers = primary_keepers(&config.primary_records, primary_channel);
    let mut kept_primary: HashSet<&BroadcasterId> = HashSet::new();

    for (index, record) in config.primary_records.iter().enumerate() {
        if keepers.get(&record.broadcaster_id) != Some(&index) {
            delete(RecordKind::Primary, record, DeleteReason::Duplicate);
            continue;
        }
        match verdict_for(classifications, snapshot, &record.broadcaster_id) {
            Verdict::Unknown => {
                kept_primary.insert(&record.broadcaster_id);
            }
            Verdict::ReportPrimary(info) => {
                if primary_channel != Some(&record.channel_id) {
                    delete(RecordKind::Primary, record, DeleteReason::ChannelChanged);
                    continue;
                }
                kept_primary.insert(&record.broadcaster_id);
                if record.is_stale(&info) {
                    updates.push(Action::Update {
                        kind: RecordKind::Primary,
                        record: record.clone(),
                        info,
                    });
                }
            }
            Verdict::ReportOverrideOnly(_) => {
                delete(RecordKind::Primary, record, DeleteReason::NoLongerMatched);
            }
            Verdict::Suppressed(reason) => {
                delete(RecordKind::Primary, record, suppress_reason(reason));
            }
        }
    }

    // Overrides only answer to liveness and blocking.
    let mut seen_override: HashSet<(&BroadcasterId, &ChannelId)> = HashSet::new();
    for record in &config.override_records {
        if !seen_override.insert((&record.broadcaster_id, &record.channel_id)) {
            delete(RecordKind::Override, record, DeleteReason::Duplicate);
            continue;
        }
        match verdict_for(classifications, snapshot, &record.broadcaster_id) {
            Verdict::Suppressed(SuppressReason::Offline) => {
                delete(RecordKind::Override, record, DeleteReason::Offline);
            }
            Verdict::Suppressed(SuppressReason::Blocked) => {
                delete(RecordKind::Override, record, DeleteReason::Blocked);
            }
            Verdict::ReportPrimary(info) | Verdict::ReportOverrideOnly(info) => {
                if record.is_stale(&info) {
                    updates.push(Action::Update {
                        kind: RecordKind::Override,
                        record: record.clone(),
                        info,
                    });
                }
            }
            Verdict::Suppressed(SuppressReason::NotFollowed) | Verdict::Unknown => {}
        }
    }

    let mut creates = Vec::new();
    if let Some(channel) = primary_channel {
        for (id, classification) in classifications {
            let Verdict::ReportPrimary(info) = &classification.verdict else {
                continue;
            };
            if kept_primary.contains(id) {
                continue;
            }
            // An override already shown in the primary channel covers it.
            let override_in_channel = config
                .override_records
                .iter()
                .any(|r| &r.broadcaster_id == id && &r.channel_id == channel);
            if override_in_channel {
                continue;
            }
            creates.push(Action::Create {
                channel_id: channel.clone(),
                info: Arc::clone(info),
            });
        }
    }

    deletes
        .into_iter()
        .map(|(channel_id, targets)| Action::Delete {
            channel_id,
            targets,
        })
        .chain(updates)
        .chain(creates)
        .collect()
}

#[cfg(test)]
mod tests;
