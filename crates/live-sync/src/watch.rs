//! Edits of a guild's watch configuration, as issued by guild commands.
//!
//! Names are matched case-insensitively and stored lowercased.

use std::collections::BTreeMap;

use crate::model::{BroadcasterId, CategoryId, ChannelId, TenantWatchConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Added,
    AlreadyPresent,
    Removed,
    NotPresent,
    /// Blank input.
    Rejected,
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn insert_named<V: PartialEq>(
    map: &mut BTreeMap<String, V>,
    name: &str,
    id: V,
) -> EditOutcome {
    let key = normalize(name);
    if key.is_empty() {
        return EditOutcome::Rejected;
    }
    match map.get(&key) {
        Some(existing) if *existing == id => EditOutcome::AlreadyPresent,
        _ => {
            map.insert(key, id);
            EditOutcome::Added
        }
    }
}

fn remove_named<V>(map: &mut BTreeMap<String, V>, name: &str) -> EditOutcome {
    match map.remove(&normalize(name)) {
        Some(_) => EditOutcome::Removed,
        None => EditOutcome::NotPresent,
    }
}

impl TenantWatchConfig {
    pub fn set_primary_channel(&mut self, channel: Option<ChannelId>) {
        self.primary_channel_id = channel;
    }

    pub fn follow_broadcaster(&mut self, name: &str, id: BroadcasterId) -> EditOutcome {
        insert_named(&mut self.followed_broadcasters, name, id)
    }

    pub fn unfollow_broadcaster(&mut self, name: &str) -> EditOutcome {
        remove_named(&mut self.followed_broadcasters, name)
    }

    pub fn follow_category(&mut self, name: &str, id: CategoryId) -> EditOutcome {
        insert_named(&mut self.followed_categories, name, id)
    }

    pub fn unfollow_category(&mut self, name: &str) -> EditOutcome {
        remove_named(&mut self.followed_categories, name)
    }

    /// Blocking also drops a follow of the same broadcaster.
    pub fn block_broadcaster(&mut self, name: &str, id: BroadcasterId) -> EditOutcome {
        self.followed_broadcasters.retain(|_, v| *v != id);
        insert_named(&mut self.blocked_broadcasters, name, id)
    }

    pub fn unblock_broadcaster(&mut self, name: &str) -> EditOutcome {
        remove_named(&mut self.blocked_broadcasters, name)
    }

    pub fn add_keyword(&mut self, keyword: &str) -> EditOutcome {
        let keyword = normalize(keyword);
        if keyword.is_empty() {
            return EditOutcome::Rejected;
        }
        if self.required_keywords.contains(&keyword) {
            return EditOutcome::AlreadyPresent;
        }
        self.required_keywords.push(keyword);
        EditOutcome::Added
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> EditOutcome {
        let keyword = normalize(keyword);
        let before = self.required_keywords.len();
        self.required_keywords.retain(|k| *k != keyword);
        if self.required_keywords.len() < before {
            EditOutcome::Removed
        } else {
            EditOutcome::NotPresent
        }
    }

    pub fn clear_keywords(&mut self) {
        self.required_keywords.clear();
    }
}
