//! Stubs for the external collaborators, shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::model::{
    BroadcastId, BroadcasterId, CategoryId, ChannelId, DisplayMetadata, GuildId,
    LiveBroadcastInfo, MessageId, TenantWatchConfig,
};
use crate::snapshot::QueryKind;
use crate::{ConfigStore, MessagingSurface, SourceError, StoreError, StreamSource, SurfaceError};

pub(crate) fn live(broadcaster: &str, category: &str, title: &str) -> LiveBroadcastInfo {
    LiveBroadcastInfo {
        broadcast_id: BroadcastId::new(format!("s-{broadcaster}")),
        broadcaster_id: broadcaster.into(),
        category_id: category.into(),
        title: title.to_string(),
        started_at: None,
        display: DisplayMetadata {
            broadcaster_login: broadcaster.to_lowercase(),
            broadcaster_name: broadcaster.to_string(),
            ..DisplayMetadata::default()
        },
    }
}

pub(crate) fn following(channel: &str, broadcasters: &[(&str, &str)]) -> TenantWatchConfig {
    let mut config = TenantWatchConfig {
        primary_channel_id: Some(channel.into()),
        ..TenantWatchConfig::default()
    };
    for (name, id) in broadcasters {
        config
            .followed_broadcasters
            .insert(name.to_string(), BroadcasterId::from(*id));
    }
    config
}

/// Upstream stub: answers from a fixed live set.
#[derive(Default)]
pub(crate) struct StubSource {
    pub live: Mutex<Vec<LiveBroadcastInfo>>,
    /// Any chunk containing one of these ids fails.
    pub failing: HashSet<String>,
    /// Fail this many calls before answering.
    pub flaky_calls: Mutex<u32>,
    pub calls: Mutex<Vec<(QueryKind, usize)>>,
}

impl StubSource {
    pub(crate) fn with_live(live: Vec<LiveBroadcastInfo>) -> Self {
        Self {
            live: Mutex::new(live),
            ..Self::default()
        }
    }

    pub(crate) fn set_live(&self, live: Vec<LiveBroadcastInfo>) {
        *self.live.lock().unwrap() = live;
    }

    fn answer<F>(
        &self,
        kind: QueryKind,
        ids: &[String],
        matches: F,
    ) -> Result<Vec<LiveBroadcastInfo>, SourceError>
    where
        F: Fn(&LiveBroadcastInfo) -> bool,
    {
        self.calls.lock().unwrap().push((kind, ids.len()));
        {
            let mut flaky = self.flaky_calls.lock().unwrap();
            if *flaky > 0 {
                *flaky -= 1;
                return Err(SourceError("flaky".into()));
            }
        }
        if ids.iter().any(|id| self.failing.contains(id)) {
            return Err(SourceError("upstream 503".into()));
        }
        let live = self.live.lock().unwrap();
        Ok(live.iter().filter(|i| matches(*i)).cloned().collect())
    }
}

impl StreamSource for StubSource {
    async fn live_by_broadcaster_ids(
        &self,
        ids: &[BroadcasterId],
    ) -> Result<Vec<LiveBroadcastInfo>, SourceError> {
        let raw: Vec<String> = ids.iter().map(|i| i.0.clone()).collect();
        self.answer(QueryKind::Broadcaster, &raw, |i| ids.contains(&i.broadcaster_id))
    }

    async fn live_by_category_ids(
        &self,
        ids: &[CategoryId],
    ) -> Result<Vec<LiveBroadcastInfo>, SourceError> {
        let raw: Vec<String> = ids.iter().map(|i| i.0.clone()).collect();
        self.answer(QueryKind::Category, &raw, |i| ids.contains(&i.category_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SurfaceCall {
    Send(String),
    Edit(String),
    Delete(String),
    BulkDelete(usize),
}

#[derive(Default)]
pub(crate) struct SurfaceState {
    pub next_id: u32,
    /// (channel, message) -> title currently shown.
    pub messages: HashMap<(String, String), String>,
    pub gone_channels: HashSet<String>,
    /// Deletes in these channels fail with a non-not-found error.
    pub failing_delete_channels: HashSet<String>,
    pub fail_bulk: bool,
    pub fail_all: bool,
    pub calls: Vec<SurfaceCall>,
}

/// In-memory messaging surface.
#[derive(Default)]
pub(crate) struct StubSurface {
    pub state: Mutex<SurfaceState>,
}

impl StubSurface {
    /// Simulate a moderator removing a message by hand.
    pub(crate) fn remove_externally(&self, channel: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .messages
            .remove(&(channel.to_string(), message.to_string()));
    }

    pub(crate) fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub(crate) fn calls(&self) -> Vec<SurfaceCall> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl MessagingSurface for StubSurface {
    async fn send(
        &self,
        channel: &ChannelId,
        info: &LiveBroadcastInfo,
    ) -> Result<MessageId, SurfaceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SurfaceCall::Send(info.broadcaster_id.0.clone()));
        if state.fail_all {
            return Err(SurfaceError::Failed("500".into()));
        }
        if state.gone_channels.contains(channel.as_str()) {
            return Err(SurfaceError::NotFound);
        }
        state.next_id += 1;
        let id = format!("m{}", state.next_id);
        state
            .messages
            .insert((channel.0.clone(), id.clone()), info.title.clone());
        Ok(MessageId(id))
    }

    async fn edit(
        &self,
        channel: &ChannelId,
        message: &MessageId,
        info: &LiveBroadcastInfo,
    ) -> Result<(), SurfaceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SurfaceCall::Edit(message.0.clone()));
        if state.fail_all {
            return Err(SurfaceError::Failed("500".into()));
        }
        match state.messages.get_mut(&(channel.0.clone(), message.0.clone())) {
            Some(title) => {
                *title = info.title.clone();
                Ok(())
            }
            None => Err(SurfaceError::NotFound),
        }
    }

    async fn delete(&self, channel: &ChannelId, message: &MessageId) -> Result<(), SurfaceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SurfaceCall::Delete(message.0.clone()));
        if state.fail_all || state.failing_delete_channels.contains(channel.as_str()) {
            return Err(SurfaceError::Failed("500".into()));
        }
        match state.messages.remove(&(channel.0.clone(), message.0.clone())) {
            Some(_) => Ok(()),
            None => Err(SurfaceError::NotFound),
        }
    }

    async fn bulk_delete(
        &self,
        channel: &ChannelId,
        messages: &[MessageId],
    ) -> Result<(), SurfaceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(SurfaceCall::BulkDelete(messages.len()));
        if state.fail_all || state.fail_bulk {
            return Err(SurfaceError::Failed("bulk rejected".into()));
        }
        // One unknown id rejects the whole batch.
        let keys: Vec<(String, String)> = messages
            .iter()
            .map(|m| (channel.0.clone(), m.0.clone()))
            .collect();
        if keys.iter().any(|key| !state.messages.contains_key(key)) {
            return Err(SurfaceError::NotFound);
        }
        for message in messages {
            state.messages.remove(&(channel.0.clone(), message.0.clone()));
        }
        Ok(())
    }
}

/// In-memory config store.
#[derive(Default)]
pub(crate) struct StubStore {
    pub configs: Mutex<HashMap<GuildId, TenantWatchConfig>>,
    pub corrupt: HashSet<String>,
    pub read_only: HashSet<String>,
    pub writes: Mutex<u32>,
}

impl ConfigStore for StubStore {
    async fn get(&self, guild: &GuildId) -> Result<Option<TenantWatchConfig>, StoreError> {
        if self.corrupt.contains(guild.as_str()) {
            return Err(StoreError::Corrupt("expected value at line 1".into()));
        }
        Ok(self.configs.lock().unwrap().get(guild).cloned())
    }

    async fn set(&self, guild: &GuildId, config: &TenantWatchConfig) -> Result<(), StoreError> {
        if self.read_only.contains(guild.as_str()) {
            return Err(StoreError::Backend("disk full".into()));
        }
        *self.writes.lock().unwrap() += 1;
        self.configs
            .lock()
            .unwrap()
            .insert(guild.clone(), config.clone());
        Ok(())
    }
}
