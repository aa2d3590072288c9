//! Value types shared by every pipeline stage.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// Upstream id of a live session.
    BroadcastId
);
opaque_id!(
    /// Stable upstream id of a broadcaster (Twitch user id).
    BroadcasterId
);
opaque_id!(
    /// Stable upstream id of a category (Twitch game id).
    CategoryId
);
opaque_id!(ChannelId);
opaque_id!(MessageId);
opaque_id!(
    /// Tenant scope. One watch configuration exists per guild.
    GuildId
);

/// One live broadcast as observed this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveBroadcastInfo {
    pub broadcast_id: BroadcastId,
    pub broadcaster_id: BroadcasterId,
    pub category_id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub display: DisplayMetadata,
}

/// Presentation-only fields. Never compared by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetadata {
    pub broadcaster_login: String,
    pub broadcaster_name: String,
    pub category_name: String,
    pub viewer_count: u64,
    pub thumbnail_url: String,
}

/// A posted announcement believed to still exist on the messaging surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub broadcaster_id: BroadcasterId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub title: String,
    pub category_id: CategoryId,
}

impl MessageRecord {
    pub fn for_info(
        channel_id: ChannelId,
        message_id: MessageId,
        info: &LiveBroadcastInfo,
    ) -> Self {
        Self {
            broadcaster_id: info.broadcaster_id.clone(),
            channel_id,
            message_id,
            title: info.title.clone(),
            category_id: info.category_id.clone(),
        }
    }

    /// True when the posted content no longer matches the live broadcast.
    pub fn is_stale(&self, info: &LiveBroadcastInfo) -> bool {
        self.title != info.title || self.category_id != info.category_id
    }

    pub fn refresh_from(&mut self, info: &LiveBroadcastInfo) {
        self.title = info.title.clone();
        self.category_id = info.category_id.clone();
    }
}

/// Which record set a [`MessageRecord`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Primary,
    Override,
}

/// Declarative per-guild watch configuration plus its posted records.
///
/// Name keys are stored lowercased; the ids are what the pipeline compares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantWatchConfig {
    pub primary_channel_id: Option<ChannelId>,
    pub followed_broadcasters: BTreeMap<String, BroadcasterId>,
    pub followed_categories: BTreeMap<String, CategoryId>,
    pub required_keywords: Vec<String>,
    pub blocked_broadcasters: BTreeMap<String, BroadcasterId>,
    pub temporarily_blocked_broadcasters: BTreeMap<String, BroadcasterId>,
    pub primary_records: Vec<MessageRecord>,
    pub override_records: Vec<MessageRecord>,
}

impl TenantWatchConfig {
    pub fn follows_broadcaster(&self, id: &BroadcasterId) -> bool {
        self.followed_broadcasters.values().any(|v| v == id)
    }

    pub fn follows_category(&self, id: &CategoryId) -> bool {
        self.followed_categories.values().any(|v| v == id)
    }

    /// Permanent or temporary block.
    pub fn is_blocked(&self, id: &BroadcasterId) -> bool {
        self.blocked_broadcasters.values().any(|v| v == id)
            || self.temporarily_blocked_broadcasters.values().any(|v| v == id)
    }

    pub fn has_override_record(&self, id: &BroadcasterId) -> bool {
        self.override_records.iter().any(|r| &r.broadcaster_id == id)
    }

    /// Any record, primary or override, for this (broadcaster, channel) pair.
    pub fn has_primary_record(&self, broadcaster: &BroadcasterId) -> bool {
        self.primary_records
            .iter()
            .any(|r| &r.broadcaster_id == broadcaster)
    }

    pub fn has_record_in(&self, broadcaster: &BroadcasterId, channel: &ChannelId) -> bool {
        self.primary_records
            .iter()
            .chain(self.override_records.iter())
            .any(|r| &r.broadcaster_id == broadcaster && &r.channel_id == channel)
    }

    pub fn records(&self, kind: RecordKind) -> &[MessageRecord] {
        match kind {
            RecordKind::Primary => &self.primary_records,
            RecordKind::Override => &self.override_records,
        }
    }

    pub fn records_mut(&mut self, kind: RecordKind) -> &mut Vec<MessageRecord> {
        match kind {
            RecordKind::Primary => &mut self.primary_records,
            RecordKind::Override => &mut self.override_records,
        }
    }
}
