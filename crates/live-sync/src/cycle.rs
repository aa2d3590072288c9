//! One polling cycle across many guilds.

use futures::StreamExt;
use serde::Serialize;

use crate::classify::classify;
use crate::executor::{ExecutionReport, apply_actions};
use crate::interest::aggregate_interests;
use crate::keywords::KeywordFilter;
use crate::model::{GuildId, TenantWatchConfig};
use crate::reconcile::reconcile;
use crate::snapshot::{CycleCache, FetchLimits, Snapshot, fetch_snapshot};
use crate::{ConfigStore, MessagingSurface, StreamSource, SyncError, UpstreamQueryFailure};

const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub limits: FetchLimits,
    /// Guilds executed at the same time.
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            limits: FetchLimits::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub synced: usize,
    /// Guilds with no stored config.
    pub skipped: usize,
    pub failures: Vec<(GuildId, SyncError)>,
    pub actions: ExecutionReport,
    pub upstream_failures: Vec<UpstreamQueryFailure>,
}

/// Loggable summary of a [`CycleReport`].
#[derive(Debug, Serialize)]
pub struct CycleSummary {
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub upstream_failures: usize,
    #[serde(flatten)]
    pub actions: ExecutionReport,
}

impl CycleReport {
    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            synced: self.synced,
            skipped: self.skipped,
            failed: self.failures.len(),
            upstream_failures: self.upstream_failures.len(),
            actions: self.actions,
        }
    }
}

/// Drives the pipeline against concrete collaborators.
pub struct SyncEngine<S, M, C> {
    source: S,
    surface: M,
    store: C,
    options: SyncOptions,
}

impl<S, M, C> SyncEngine<S, M, C>
where
    S: StreamSource,
    M: MessagingSurface,
    C: ConfigStore,
{
    pub fn new(source: S, surface: M, store: C, options: SyncOptions) -> Self {
        Self {
            source,
            surface,
            store,
            options,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run one cycle for `guilds`.
    ///
    /// One snapshot is fetched for all guilds together. A guild whose config
    /// cannot be loaded, or whose result cannot be persisted, is reported in
    /// `failures` and never affects the others.
    pub async fn run_cycle(&self, guilds: &[GuildId]) -> CycleReport {
        let mut report = CycleReport::default();

        let mut loaded: Vec<(GuildId, TenantWatchConfig)> = Vec::with_capacity(guilds.len());
        for guild in guilds {
            match self.store.get(guild).await {
                Ok(Some(config)) => loaded.push((guild.clone(), config)),
                Ok(None) => report.skipped += 1,
                Err(source) => {
                    tracing::warn!(
                        guild = %guild,
                        error = %source,
                        "Skipping guild, config unreadable"
                    );
                    report.failures.push((
                        guild.clone(),
                        SyncError::ConfigLoad {
                            guild: guild.clone(),
                            source,
                        },
                    ));
                }
            }
        }

        let interests = aggregate_interests(loaded.iter().map(|(_, config)| Some(config)));
        let mut cache = CycleCache::new();
        let snapshot =
            fetch_snapshot(&self.source, &interests, &self.options.limits, &mut cache).await;
        report.upstream_failures = snapshot.failures().to_vec();

        let snapshot = &snapshot;
        let mut results = futures::stream::iter(loaded)
            .map(|(guild, config)| async move {
                let result = self.sync_guild(&guild, config, snapshot).await;
                (guild, result)
            })
            .buffer_unordered(self.options.concurrency.max(1));

        while let Some((guild, result)) = results.next().await {
            match result {
                Ok(executed) => {
                    report.synced += 1;
                    report.actions.merge(&executed);
                }
                Err(e) => {
                    tracing::warn!(guild = %guild, error = %e, "Guild sync failed");
                    report.failures.push((guild, e));
                }
            }
        }

        report
    }

    async fn sync_guild(
        &self,
        guild: &GuildId,
        config: TenantWatchConfig,
        snapshot: &Snapshot,
    ) -> Result<ExecutionReport, SyncError> {
        let filter = KeywordFilter::new(&config.required_keywords)?;
        let classifications = classify(&config, snapshot, &filter);
        let actions = reconcile(&config, &classifications, snapshot);
        if !actions.is_empty() {
            tracing::debug!(guild = %guild, actions = actions.len(), "Applying actions");
        }

        let before = config.clone();
        let (config, executed) = apply_actions(&self.surface, config, actions, snapshot).await;

        if config != before {
            self.store
                .set(guild, &config)
                .await
                .map_err(|source| SyncError::ConfigPersist {
                    guild: guild.clone(),
                    source,
                })?;
        }
        Ok(executed)
    }
}
