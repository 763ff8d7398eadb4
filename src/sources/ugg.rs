//! U.gg adapter (JSON source).
//!
//! Per-position stats endpoints list the champions with enough games to have
//! a build; the per-champion build endpoint returns client-schema JSON whose
//! block titles are translated through a preset table. The only source with
//! ARAM support.

use async_trait::async_trait;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::dragon::canonical_champion;
use crate::errors::{Error, Result};
use crate::helpers::{splice_version, trinks_con, SkillLabels};
use crate::models::{BuildRecord, FailureEntry, ItemEntry, ItemSet};
use crate::scheduler::Scheduler;
use crate::sources::{SourceAdapter, ADAPTER_CONCURRENCY, UNKNOWN_VERSION};
use crate::translate::Translator;

/// Per-position stats files listing available champions.
const STATS_PAGES: [(&str, &str); 5] = [
    ("Top", "statsTop.json"),
    ("Mid", "statsMid.json"),
    ("ADC", "statsADC.json"),
    ("Jungle", "statsJungle.json"),
    ("Support", "statsSupport.json"),
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sr,
    Aram,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Sr => "sr",
            Mode::Aram => "aram",
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatsOverview {
    champions: Vec<StatsChampion>,
}

#[derive(Debug, Deserialize)]
struct StatsChampion {
    name: String,
}

pub struct Ugg {
    base: String,
}

fn call_collect_unit<'a>(
    adapter: &'a Ugg,
    ctx: &'a RunContext,
    scheduler: &'a Scheduler,
    champ: &'a str,
    process_name: &'a str,
    mode: Mode,
) -> futures::future::BoxFuture<'a, ()> {
    Box::pin(adapter.collect_unit(ctx, scheduler, champ, process_name, mode))
}

impl Ugg {
    pub fn new(base: String) -> Self {
        Self { base }
    }

    async fn fetch_version(&self, scheduler: &Scheduler) -> Result<String> {
        let patches: Vec<String> = scheduler
            .get_json(&format!("{}/patches.json", self.base))
            .await?;
        patches
            .into_iter()
            .next()
            .ok_or_else(|| Error::MissingData("U.gg: patches".to_string()))
    }

    async fn available_champs(
        &self,
        scheduler: &Scheduler,
        stats_file: &str,
    ) -> Result<Vec<String>> {
        let overview: StatsOverview = scheduler
            .get_json(&format!("{}/overview/{}", self.base, stats_file))
            .await?;
        if overview.champions.is_empty() {
            return Err(Error::MissingData(format!("U.gg: {stats_file}")));
        }
        let mut names: Vec<String> = overview.champions.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }

    async fn process(
        &self,
        ctx: &RunContext,
        scheduler: &Scheduler,
        process_name: &str,
        stats_file: &str,
        mode: Mode,
    ) {
        info!("U.gg: downloading {} champions", process_name);

        let champs = match self.available_champs(scheduler, stats_file).await {
            Ok(champs) => champs,
            Err(err) => {
                warn!(process_name, %err, "U.gg: champion list unavailable");
                ctx.push_failure(FailureEntry::new(
                    ctx.translate.t(&process_name.to_lowercase()),
                    "All",
                    self.name(),
                ));
                return;
            }
        };

        let futures: Vec<_> = champs
            .iter()
            .map(|champ| call_collect_unit(self, ctx, scheduler, champ, process_name, mode))
            .collect();
        stream::iter(futures)
            .buffer_unordered(ADAPTER_CONCURRENCY)
            .collect::<Vec<()>>()
            .await;
    }

    async fn collect_unit(
        &self,
        ctx: &RunContext,
        scheduler: &Scheduler,
        champ: &str,
        process_name: &str,
        mode: Mode,
    ) {
        ctx.progress.step(format!(
            "{} U.gg {}: {}",
            ctx.translate.t("processing"),
            ctx.translate.t(&process_name.to_lowercase()),
            ctx.translate.t(&canonical_champion(champ))
        ));

        match self.build_unit(ctx, scheduler, champ, process_name, mode).await {
            Ok(record) => match mode {
                Mode::Sr => ctx.push_sr(record),
                Mode::Aram => ctx.push_aram(record),
            },
            Err(err) => {
                warn!(champ, process_name, %err, "U.gg: build unavailable");
                ctx.push_failure(FailureEntry::new(
                    canonical_champion(champ),
                    process_name,
                    self.name(),
                ));
            }
        }

        // SR champions appear on five position pages; scale the increment so
        // a champion still advances the bar by one share overall.
        match mode {
            Mode::Aram => ctx.incr_champ(1.0),
            Mode::Sr => ctx.incr_champ(5.0),
        }
    }

    async fn build_unit(
        &self,
        ctx: &RunContext,
        scheduler: &Scheduler,
        champ: &str,
        process_name: &str,
        mode: Mode,
    ) -> Result<BuildRecord> {
        let canonical = canonical_champion(champ);
        let url = format!("{}/builds/{}/{}.json", self.base, canonical, mode.as_str());
        let mut item_set: ItemSet = scheduler.get_json(&url).await?;

        if item_set.blocks.is_empty() {
            return Err(Error::MissingData(format!(
                "U.gg: {champ} {process_name}"
            )));
        }

        let t = &ctx.translate;
        for block in &mut item_set.blocks {
            match translate_block_title(&block.block_type, t) {
                Some(translated) => block.block_type = translated,
                None => {
                    warn!(
                        champ,
                        title = %block.block_type,
                        "U.gg: block title missing preset translation"
                    );
                }
            }
        }

        match mode {
            Mode::Aram => {
                // Every ARAM build opens with the map-specific consumable.
                item_set.blocks[0].items.push(ItemEntry::new("2047", 1));
                item_set.map = "HA".to_string();
            }
            Mode::Sr => {
                if ctx.settings.options.lock_sr {
                    item_set.map = "SR".to_string();
                }
                // The first block is the site's informational header.
                item_set.blocks.remove(0);
                trinks_con(
                    &mut item_set.blocks,
                    &SkillLabels::default(),
                    &ctx.settings.options,
                    t,
                );
            }
        }

        item_set.champion = canonical.clone();
        item_set.title = format!(
            "LFV {} {}",
            t.tc(&process_name.to_lowercase()),
            splice_version(&ctx.version)
        );

        Ok(BuildRecord {
            champion: canonical,
            file_prefix: process_name.to_lowercase(),
            source: self.id().to_string(),
            item_set,
        })
    }
}

#[async_trait]
impl SourceAdapter for Ugg {
    fn name(&self) -> &str {
        "U.gg"
    }

    fn id(&self) -> &str {
        "ugg"
    }

    fn supports_aram(&self) -> bool {
        true
    }

    async fn get_version(&self, scheduler: &Scheduler) -> String {
        match self.fetch_version(scheduler).await {
            Ok(version) => version,
            Err(err) => {
                warn!(%err, "U.gg: version unavailable");
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    async fn get_sr(&self, ctx: &RunContext, scheduler: &Scheduler) -> Result<()> {
        let site_version = self.get_version(scheduler).await;
        ctx.set_source_version(self.id(), &site_version);

        join_all(
            STATS_PAGES
                .iter()
                .map(|(name, file)| self.process(ctx, scheduler, name, file, Mode::Sr)),
        )
        .await;

        Ok(())
    }

    async fn get_aram(&self, ctx: &RunContext, scheduler: &Scheduler) -> Result<()> {
        self.process(ctx, scheduler, "ARAM", "statsARAM.json", Mode::Aram)
            .await;
        Ok(())
    }
}

fn translate_block_title(title: &str, t: &Translator) -> Option<String> {
    if title.starts_with("Core Items") {
        let suffix = title.split_once(": ").map(|(_, rest)| rest).unwrap_or("");
        return Some(format!(
            "{} - {}: {}",
            t.tc("core_items"),
            t.tc("winrate"),
            suffix
        ));
    }
    match title.trim() {
        "Starter" => Some(t.tc("starting_items")),
        "Boots" => Some(t.tc("boots")),
        "Situational Items" => Some(t.tc("situational_items")),
        "Elixir" => Some(t.tc("elixir")),
        "Upgrade Ultimate" => Some(t.tc("upgrade_ultimate")),
        "Core Alternatives - Endgame Items" => Some(format!(
            "{} - {}",
            t.tc("core_alternatives"),
            t.tc("endgame_items")
        )),
        _ => None,
    }
}
