//! Import orchestration.
//!
//! A run moves through a fixed sequence: persist settings, resolve the game
//! metadata (version, roster, item lookup, special items — each fatal on
//! failure), fan out to the selected sources with per-source failure
//! isolation, then sweep stale output and write the merged set. Metadata
//! resolution completes strictly before fan-out, so every adapter sees the
//! same finished lookups.

use std::collections::HashMap;
use std::path::PathBuf;

use futures::future::{join_all, BoxFuture};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::context::RunContext;
use crate::dragon;
use crate::errors::{Error, Result};
use crate::helpers::splice_version;
use crate::models::FailureEntry;
use crate::platform;
use crate::progress::{Progress, ProgressMode};
use crate::scheduler::Scheduler;
use crate::sources::{SourceAdapter, SourceRegistry};
use crate::translate::Translator;
use crate::writer;

#[derive(Clone, Copy)]
enum SourceJob {
    Sr,
    Aram,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Two-part game-data version the run resolved.
    pub version: String,
    /// Versions the sources advertised for their own data, by source id.
    pub source_versions: Vec<(String, String)>,
    /// Every (champion, position, source) unit with no generated build,
    /// sorted by source.
    pub failures: Vec<FailureEntry>,
    /// Number of build files written.
    pub written: usize,
    /// True when the run handed off to an elevated re-launch instead of
    /// finishing here.
    pub elevated: bool,
}

pub struct Aggregator {
    settings: Settings,
    settings_path: PathBuf,
    registry: SourceRegistry,
    scheduler: Scheduler,
    progress_mode: ProgressMode,
}

impl Aggregator {
    pub fn new(settings: Settings, settings_path: PathBuf, progress_mode: ProgressMode) -> Self {
        let registry = SourceRegistry::from_settings(&settings);
        Self {
            settings,
            settings_path,
            registry,
            scheduler: Scheduler::new(),
            progress_mode,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Precondition for an import: at least one Summoner's Rift source.
    pub fn verify_settings(&self) -> bool {
        self.settings.has_sr_source()
    }

    /// Resolve the current game-data version.
    pub async fn get_version(&self) -> Result<String> {
        dragon::get_version(&self.scheduler, &self.settings.endpoints.data_dragon).await
    }

    /// Resolve the special-item substitution map.
    pub async fn get_special_items(&self) -> Result<HashMap<String, String>> {
        let version = self.get_version().await?;
        dragon::get_special_items(
            &self.scheduler,
            &self.settings.endpoints.data_dragon,
            &version,
        )
        .await
    }

    /// Delete previously generated build files.
    pub fn delete_old_builds(&self, manual: bool) -> Result<()> {
        writer::delete_old_builds(&self.settings, manual)
    }

    /// Run the full import.
    ///
    /// A file-write failure on Windows requests elevation and re-invokes the
    /// import in the elevated process instead of surfacing the error; every
    /// other error propagates.
    pub async fn run(&self, already_elevated: bool) -> Result<RunReport> {
        match self.run_inner(already_elevated).await {
            Err(err)
                if matches!(err, Error::FileWrite { .. })
                    && cfg!(windows)
                    && !already_elevated =>
            {
                error!(%err, "write failed, requesting elevation");
                platform::elevate(&["import", "--elevated"])?;
                Ok(RunReport {
                    version: String::new(),
                    source_versions: Vec::new(),
                    failures: Vec::new(),
                    written: 0,
                    elevated: true,
                })
            }
            other => other,
        }
    }

    async fn run_inner(&self, already_elevated: bool) -> Result<RunReport> {
        let progress = Progress::new(self.progress_mode.reporter());
        progress.reset();

        self.settings
            .save(&self.settings_path)
            .map_err(|err| Error::Update(err.to_string()))?;

        let mut translator = Translator::new(&self.settings.options.locale);
        info!(locale = translator.locale(), "starting import");

        let base = &self.settings.endpoints.data_dragon;

        progress.step(translator.t("lol_version"));
        let version = dragon::get_version(&self.scheduler, base).await?;

        progress.step(translator.t("downloading_champs"));
        let champion_data =
            dragon::get_champions(&self.scheduler, base, &version, translator.riot_locale())
                .await?;
        let item_names = dragon::get_item_names(&self.scheduler, base, &version).await?;
        translator.merge_champion_names(champion_data.names);

        let special_items = dragon::get_special_items(&self.scheduler, base, &version).await?;

        let ctx = RunContext::new(
            self.settings.clone(),
            version.clone(),
            champion_data.roster,
            champion_data.champ_ids,
            item_names,
            special_items,
            translator,
            progress,
        );

        let mut jobs: Vec<BoxFuture<'_, ()>> = Vec::new();
        for source_id in self.settings.options.sr_source.iter().filter(|s| !s.is_empty()) {
            match self.registry.find(source_id) {
                Some(adapter) => jobs.push(Box::pin(run_source(
                    adapter,
                    &ctx,
                    &self.scheduler,
                    SourceJob::Sr,
                ))),
                None => warn!(%source_id, "unknown source in settings, skipping"),
            }
        }
        if self.settings.options.aram {
            match self.registry.aram_adapter() {
                Some(adapter) => jobs.push(Box::pin(run_source(
                    adapter,
                    &ctx,
                    &self.scheduler,
                    SourceJob::Aram,
                ))),
                None => warn!("no registered source supports ARAM, skipping"),
            }
        }
        join_all(jobs).await;

        ctx.progress.step(ctx.translate.t("deleting_old_builds"));
        writer::delete_old_builds(&self.settings, false)?;
        let written = writer::fix_and_save(&ctx)?;

        let mut stamped = self.settings.clone();
        stamped.install.local_version = Some(splice_version(&version));
        stamped
            .save(&self.settings_path)
            .map_err(|err| Error::Update(err.to_string()))?;

        if cfg!(windows) && already_elevated {
            platform::set_output_permissions(&self.settings.install.itemset_path)?;
        }

        ctx.progress.finish();
        Ok(RunReport {
            version: splice_version(&version),
            source_versions: ctx.source_versions(),
            failures: ctx.failures(),
            written: written.len(),
            elevated: false,
        })
    }
}

/// Drive one source to completion, converting a source-level error into a
/// coarse failure entry so sibling sources keep running.
async fn run_source<'a>(
    adapter: &'a dyn SourceAdapter,
    ctx: &'a RunContext,
    scheduler: &'a Scheduler,
    job: SourceJob,
) {
    let result = match job {
        SourceJob::Sr => adapter.get_sr(ctx, scheduler).await,
        SourceJob::Aram => adapter.get_aram(ctx, scheduler).await,
    };
    if let Err(err) = result {
        error!(source = adapter.name(), %err, "source failed");
        ctx.push_failure(FailureEntry::whole_source(adapter.name()));
    }
}
