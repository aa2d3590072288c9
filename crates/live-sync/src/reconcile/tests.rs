use super::*;
use crate::classify::classify;
use crate::keywords::KeywordFilter;
use crate::test_support::{following, live};

fn record(
    broadcaster: &str,
    channel: &str,
    message: &str,
    title: &str,
    category: &str,
) -> MessageRecord {
    MessageRecord {
        broadcaster_id: broadcaster.into(),
        channel_id: channel.into(),
        message_id: message.into(),
        title: title.into(),
        category_id: category.into(),
    }
}

fn plan(config: &TenantWatchConfig, snapshot: &Snapshot) -> Vec<Action> {
    let filter = KeywordFilter::new(&config.required_keywords).unwrap();
    let classes = classify(config, snapshot, &filter);
    reconcile(config, &classes, snapshot)
}

fn delete_reasons(actions: &[Action]) -> Vec<(String, DeleteReason)> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Delete { targets, .. } => Some(targets),
            _ => None,
        })
        .flatten()
        .map(|t| (t.record.message_id.0.clone(), t.reason))
        .collect()
}

#[test]
fn alice_create_update_delete_scenario() {
    let mut config = following("chan", &[("alice", "A1")]);

    // Cycle 1: live with "Hello".
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);
    let actions = plan(&config, &snapshot);
    assert_eq!(actions.len(), 1);
    let Action::Create { channel_id, info } = &actions[0] else {
        panic!("expected create, got {actions:?}");
    };
    assert_eq!(channel_id.as_str(), "chan");
    assert_eq!(info.title, "Hello");
    config.primary_records.push(record("A1", "chan", "m1", "Hello", "c1"));

    // Cycle 2: title changed.
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello 2")]);
    let actions = plan(&config, &snapshot);
    assert_eq!(actions.len(), 1);
    let Action::Update { kind, record, info } = &actions[0] else {
        panic!("expected update, got {actions:?}");
    };
    assert_eq!(*kind, RecordKind::Primary);
    assert_eq!(record.message_id.as_str(), "m1");
    assert_eq!(info.title, "Hello 2");
    config.primary_records[0].title = "Hello 2".into();

    // Cycle 3: offline.
    let actions = plan(&config, &Snapshot::default());
    assert_eq!(delete_reasons(&actions), vec![("m1".to_string(), DeleteReason::Offline)]);
}

#[test]
fn up_to_date_record_needs_nothing() {
    let mut config = following("chan", &[("alice", "A1")]);
    config.primary_records.push(record("A1", "chan", "m1", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);
    assert!(plan(&config, &snapshot).is_empty());
}

#[test]
fn category_change_triggers_update() {
    let mut config = following("chan", &[("alice", "A1")]);
    config.primary_records.push(record("A1", "chan", "m1", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c2", "Hello")]);
    assert!(matches!(
        plan(&config, &snapshot).as_slice(),
        [Action::Update { .. }]
    ));
}

#[test]
fn keyword_miss_after_title_change_deletes_category_match() {
    let mut config = following("chan", &[]);
    config.followed_categories.insert("cooking".into(), "c1".into());
    config.required_keywords = vec!["chili".into()];
    config
        .primary_records
        .push(record("K1", "chan", "m1", "Weekend Chili Cook-off", "c1"));
    let snapshot = Snapshot::from_live([live("K1", "c1", "Weekend Pasta Night")]);

    let actions = plan(&config, &snapshot);
    assert_eq!(
        delete_reasons(&actions),
        vec![("m1".to_string(), DeleteReason::NoLongerMatched)]
    );
    assert_eq!(actions.len(), 1);
}

#[test]
fn blocked_broadcaster_is_deleted_and_not_recreated() {
    let mut config = following("chan", &[("alice", "A1")]);
    config.blocked_broadcasters.insert("alice".into(), "A1".into());
    config.primary_records.push(record("A1", "chan", "m1", "Hello", "c1"));
    config.override_records.push(record("A1", "side", "m2", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);

    let actions = plan(&config, &snapshot);
    let mut reasons = delete_reasons(&actions);
    reasons.sort();
    assert_eq!(
        reasons,
        vec![
            ("m1".to_string(), DeleteReason::Blocked),
            ("m2".to_string(), DeleteReason::Blocked),
        ]
    );
    assert!(!actions.iter().any(|a| matches!(a, Action::Create { .. })));
}

#[test]
fn deletes_are_grouped_per_channel() {
    let mut config = following("chan", &[]);
    config.primary_records.push(record("A1", "chan", "m1", "a", "c1"));
    config.primary_records.push(record("B1", "chan", "m2", "b", "c1"));
    config.override_records.push(record("C1", "side", "m3", "c", "c1"));

    let actions = plan(&config, &Snapshot::default());
    assert_eq!(actions.len(), 2);
    let Action::Delete { channel_id, targets } = &actions[0] else {
        panic!("expected delete");
    };
    assert_eq!(channel_id.as_str(), "chan");
    assert_eq!(targets.len(), 2);
    let Action::Delete { channel_id, targets } = &actions[1] else {
        panic!("expected delete");
    };
    assert_eq!(channel_id.as_str(), "side");
    assert_eq!(targets[0].kind, RecordKind::Override);
}

#[test]
fn override_survives_keyword_rules_but_tracks_title() {
    let mut config = following("chan", &[]);
    config.override_records.push(record("O1", "side", "m1", "Old", "c9"));
    let snapshot = Snapshot::from_live([live("O1", "c9", "New")]);

    let actions = plan(&config, &snapshot);
    assert_eq!(actions.len(), 1);
    let Action::Update { kind, .. } = &actions[0] else {
        panic!("expected update");
    };
    assert_eq!(*kind, RecordKind::Override);
}

#[test]
fn unknown_liveness_emits_nothing() {
    let mut config = following("chan", &[("alice", "A1")]);
    config.primary_records.push(record("A1", "chan", "m1", "Hello", "c1"));
    config.override_records.push(record("O1", "side", "m2", "x", "c1"));
    let mut snapshot = Snapshot::default();
    snapshot.mark_unresolved_broadcasters([BroadcasterId::from("A1"), BroadcasterId::from("O1")]);

    assert!(plan(&config, &snapshot).is_empty());
}

#[test]
fn primary_channel_change_moves_announcement() {
    let mut config = following("new-chan", &[("alice", "A1")]);
    config.primary_records.push(record("A1", "old-chan", "m1", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);

    let actions = plan(&config, &snapshot);
    assert_eq!(delete_reasons(&actions), vec![("m1".to_string(), DeleteReason::ChannelChanged)]);
    assert!(matches!(
        actions.last(),
        Some(Action::Create { channel_id, .. }) if channel_id.as_str() == "new-chan"
    ));
}

#[test]
fn no_primary_channel_means_no_creates() {
    let mut config = following("chan", &[("alice", "A1")]);
    config.primary_channel_id = None;
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);
    assert!(plan(&config, &snapshot).is_empty());
}

#[test]
fn duplicate_primary_records_are_collapsed() {
    let mut config = following("chan", &[("alice", "A1")]);
    config.primary_records.push(record("A1", "chan", "m1", "Hello", "c1"));
    config.primary_records.push(record("A1", "chan", "m2", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);

    let actions = plan(&config, &snapshot);
    assert_eq!(delete_reasons(&actions), vec![("m2".to_string(), DeleteReason::Duplicate)]);
    assert_eq!(actions.len(), 1);
}

#[test]
fn duplicate_in_primary_channel_wins_over_stale_channel() {
    let mut config = following("new", &[("alice", "A1")]);
    config.primary_records.push(record("A1", "old", "m1", "Hello", "c1"));
    config.primary_records.push(record("A1", "new", "n1", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);

    let actions = plan(&config, &snapshot);
    assert_eq!(delete_reasons(&actions), vec![("m1".to_string(), DeleteReason::Duplicate)]);
    assert_eq!(actions.len(), 1);
}

#[test]
fn override_in_primary_channel_suppresses_create() {
    let mut config = following("chan", &[("alice", "A1")]);
    config.override_records.push(record("A1", "chan", "m1", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);
    assert!(plan(&config, &snapshot).is_empty());
}

#[test]
fn followed_and_override_tracked_primary_gets_deleted_once_unfollowed() {
    let mut config = following("chan", &[]);
    config.primary_records.push(record("A1", "chan", "m1", "Hello", "c1"));
    config.override_records.push(record("A1", "side", "m2", "Hello", "c1"));
    let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);

    let actions = plan(&config, &snapshot);
    assert_eq!(
        delete_reasons(&actions),
        vec![("m1".to_string(), DeleteReason::NoLongerMatched)]
    );
}
