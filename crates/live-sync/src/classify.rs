//! Per-guild reportability of each candidate broadcaster.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::keywords::KeywordFilter;
use crate::model::{BroadcasterId, LiveBroadcastInfo, TenantWatchConfig};
use crate::snapshot::{Liveness, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    Blocked,
    Offline,
    NotFollowed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Announce in the guild's primary channel.
    ReportPrimary(Arc<LiveBroadcastInfo>),
    /// Live and override-tracked, but not matched by any follow rule.
    ReportOverrideOnly(Arc<LiveBroadcastInfo>),
    Suppressed(SuppressReason),
    /// Liveness could not be resolved this cycle; leave existing state alone.
    Unknown,
}

impl Verdict {
    pub fn info(&self) -> Option<&Arc<LiveBroadcastInfo>> {
        match self {
            Self::ReportPrimary(info) | Self::ReportOverrideOnly(info) => Some(info),
            Self::Suppressed(_) | Self::Unknown => None,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Self::ReportPrimary(_))
    }
}

/// The rule that decided a verdict. Lower value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    Blocked = 1,
    Offline = 2,
    FollowedBroadcaster = 3,
    FollowedCategory = 4,
    OverrideTracked = 5,
    Unmatched = 6,
}

impl DecisionRule {
    pub fn precedence(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub verdict: Verdict,
    /// `None` for [`Verdict::Unknown`].
    pub rule: Option<DecisionRule>,
}

fn decided(verdict: Verdict, rule: DecisionRule) -> Classification {
    Classification {
        verdict,
        rule: Some(rule),
    }
}

/// Classify one broadcaster for one guild. First matching rule wins.
pub fn classify_one(
    config: &TenantWatchConfig,
    snapshot: &Snapshot,
    keywords: &KeywordFilter,
    id: &BroadcasterId,
) -> Classification {
    let info = match snapshot.liveness(id) {
        Liveness::Live(info) => info,
        Liveness::Unknown => {
            return Classification {
                verdict: Verdict::Unknown,
                rule: None,
            };
        }
        Liveness::Offline => {
            return decided(Verdict::Suppressed(SuppressReason::Offline), DecisionRule::Offline);
        }
    };

    if config.is_blocked(id) {
        return decided(Verdict::Suppressed(SuppressReason::Blocked), DecisionRule::Blocked);
    }
    if config.follows_broadcaster(id) {
        return decided(
            Verdict::ReportPrimary(Arc::clone(info)),
            DecisionRule::FollowedBroadcaster,
        );
    }
    if config.follows_category(&info.category_id) && keywords.matches(&info.title) {
        return decided(
            Verdict::ReportPrimary(Arc::clone(info)),
            DecisionRule::FollowedCategory,
        );
    }
    if config.has_override_record(id) {
        return decided(
            Verdict::ReportOverrideOnly(Arc::clone(info)),
            DecisionRule::OverrideTracked,
        );
    }
    decided(
        Verdict::Suppressed(SuppressReason::NotFollowed),
        DecisionRule::Unmatched,
    )
}

/// Classify every broadcaster relevant to the guild.
///
/// Candidates: followed, record holders, temporarily blocked, and anyone
/// live in a followed category.
pub fn classify(
    config: &TenantWatchConfig,
    snapshot: &Snapshot,
    keywords: &KeywordFilter,
) -> BTreeMap<BroadcasterId, Classification> {
    let mut candidates: Vec<&BroadcasterId> = config
        .followed_broadcasters
        .values()
        .chain(config.temporarily_blocked_broadcasters.values())
        .chain(config.primary_records.iter().map(|r| &r.broadcaster_id))
        .chain(config.override_records.iter().map(|r| &r.broadcaster_id))
        .collect();
    for category in config.followed_categories.values() {
        candidates.extend(snapshot.in_category(category).iter().map(|i| &i.broadcaster_id));
    }

    candidates
        .into_iter()
        .map(|id| (id.clone(), classify_one(config, snapshot, keywords, id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MessageRecord;
    use crate::test_support::{following, live};

    fn no_keywords() -> KeywordFilter {
        KeywordFilter::new::<&str>(&[]).unwrap()
    }

    fn cooking_config(keywords: &[&str]) -> TenantWatchConfig {
        let mut config = following("chan", &[]);
        config.followed_categories.insert("cooking".into(), "c1".into());
        config.required_keywords = keywords.iter().map(|k| k.to_string()).collect();
        config
    }

    fn verdict_of(
        config: &TenantWatchConfig,
        snapshot: &Snapshot,
        id: &str,
    ) -> Classification {
        let filter = KeywordFilter::new(&config.required_keywords).unwrap();
        classify(config, snapshot, &filter)
            .remove(&BroadcasterId::from(id))
            .unwrap()
    }

    #[test]
    fn followed_broadcaster_in_unfollowed_category_is_primary() {
        let mut config = cooking_config(&["chili"]);
        config.followed_broadcasters.insert("alice".into(), "A1".into());
        let snapshot = Snapshot::from_live([live("A1", "c-other", "Just chatting")]);

        let c = verdict_of(&config, &snapshot, "A1");
        assert!(c.verdict.is_primary());
        assert_eq!(c.rule, Some(DecisionRule::FollowedBroadcaster));
    }

    #[test]
    fn keyword_filter_on_followed_category() {
        let config = cooking_config(&["chili"]);
        let snapshot = Snapshot::from_live([
            live("K1", "c1", "Weekend Chili Cook-off"),
            live("K2", "c1", "Weekend Pasta Night"),
        ]);

        let hit = verdict_of(&config, &snapshot, "K1");
        assert!(hit.verdict.is_primary());
        assert_eq!(hit.rule, Some(DecisionRule::FollowedCategory));

        let miss = verdict_of(&config, &snapshot, "K2");
        assert_eq!(miss.verdict, Verdict::Suppressed(SuppressReason::NotFollowed));
    }

    #[test]
    fn category_without_keywords_reports_everyone() {
        let config = cooking_config(&[]);
        let snapshot = Snapshot::from_live([live("K2", "c1", "Weekend Pasta Night")]);
        assert!(verdict_of(&config, &snapshot, "K2").verdict.is_primary());
    }

    #[test]
    fn block_outranks_follow() {
        let mut config = following("chan", &[("alice", "A1")]);
        config.blocked_broadcasters.insert("alice".into(), "A1".into());
        let snapshot = Snapshot::from_live([live("A1", "c1", "Hello")]);

        let c = verdict_of(&config, &snapshot, "A1");
        assert_eq!(c.verdict, Verdict::Suppressed(SuppressReason::Blocked));
        assert_eq!(c.rule.map(DecisionRule::precedence), Some(1));
    }

    #[test]
    fn offline_broadcaster_is_suppressed() {
        let config = following("chan", &[("alice", "A1")]);
        let c = verdict_of(&config, &Snapshot::default(), "A1");
        assert_eq!(c.verdict, Verdict::Suppressed(SuppressReason::Offline));
    }

    #[test]
    fn unresolved_broadcaster_is_unknown() {
        let config = following("chan", &[("alice", "A1")]);
        let mut snapshot = Snapshot::default();
        snapshot.mark_unresolved_broadcasters([BroadcasterId::from("A1")]);
        let c = verdict_of(&config, &snapshot, "A1");
        assert_eq!(c.verdict, Verdict::Unknown);
        assert_eq!(c.rule, None);
    }

    #[test]
    fn override_tracked_broadcaster_reports_override_only() {
        let mut config = following("chan", &[]);
        config.override_records.push(MessageRecord {
            broadcaster_id: "O1".into(),
            channel_id: "other".into(),
            message_id: "m1".into(),
            title: "Raid night".into(),
            category_id: "c9".into(),
        });
        let snapshot = Snapshot::from_live([live("O1", "c9", "Raid night")]);

        let c = verdict_of(&config, &snapshot, "O1");
        assert!(matches!(c.verdict, Verdict::ReportOverrideOnly(_)));
        assert_eq!(c.rule, Some(DecisionRule::OverrideTracked));
    }

    #[test]
    fn unrelated_live_broadcasters_are_not_candidates() {
        let config = following("chan", &[("alice", "A1")]);
        let snapshot = Snapshot::from_live([live("A1", "c1", "Hello"), live("Z1", "c1", "Other")]);
        let out = classify(&config, &snapshot, &no_keywords());
        assert_eq!(out.len(), 1);
        assert!(out.contains_key(&BroadcasterId::from("A1")));
    }

    #[test]
    fn precedence_is_ordered() {
        assert!(DecisionRule::Blocked < DecisionRule::FollowedBroadcaster);
        assert!(DecisionRule::FollowedBroadcaster < DecisionRule::FollowedCategory);
        assert_eq!(DecisionRule::Unmatched.precedence(), 6);
    }
}
