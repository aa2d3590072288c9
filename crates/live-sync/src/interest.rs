//! Upstream ids that must be queried this cycle.

use std::collections::BTreeSet;

use crate::model::{BroadcasterId, CategoryId, TenantWatchConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interests {
    pub broadcasters: BTreeSet<BroadcasterId>,
    pub categories: BTreeSet<CategoryId>,
}

impl Interests {
    pub fn is_empty(&self) -> bool {
        self.broadcasters.is_empty() && self.categories.is_empty()
    }

    pub fn merge(&mut self, other: Interests) {
        self.broadcasters.extend(other.broadcasters);
        self.categories.extend(other.categories);
    }
}

/// Interests of one guild.
///
/// Record holders are always included so that offline detection works for
/// override targets and for category matches that left the category.
/// Temporarily blocked broadcasters are included so the block can be lifted
/// once they go offline.
pub fn tenant_interests(config: &TenantWatchConfig) -> Interests {
    let broadcasters = config
        .followed_broadcasters
        .values()
        .chain(config.temporarily_blocked_broadcasters.values())
        .chain(config.primary_records.iter().map(|r| &r.broadcaster_id))
        .chain(config.override_records.iter().map(|r| &r.broadcaster_id))
        .cloned()
        .collect();
    let categories = config.followed_categories.values().cloned().collect();

    Interests {
        broadcasters,
        categories,
    }
}

/// Deduplicated union over all guilds processed this cycle.
///
/// `None` entries (guild without stored config) contribute nothing.
pub fn aggregate_interests<'a, I>(configs: I) -> Interests
where
    I: IntoIterator<Item = Option<&'a TenantWatchConfig>>,
{
    let mut all = Interests::default();
    for config in configs.into_iter().flatten() {
        all.merge(tenant_interests(config));
    }
    all
}
