//! LeagueOfGraphs adapter (markup source).
//!
//! Positions come from the champion banner, items from the four build
//! tables, skills from the skill-order table. Item images carry the item's
//! display name in their `alt` attribute, resolved to ids through the run's
//! item-name lookup.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::context::RunContext;
use crate::errors::{Error, Result};
use crate::helpers::{array_to_builds, normalize_position, shorthand_skills, trinks_con, SkillLabels};
use crate::html::{
    blocks_with_marker, find_ci, img_alts, inner_after_open_tag, next_tag_block_ci,
    slice_between_ci, strip_tags,
};
use crate::models::{BuildRecord, FailureEntry, ItemBlock, ItemSet};
use crate::scheduler::Scheduler;
use crate::sources::{SourceAdapter, ADAPTER_CONCURRENCY, UNKNOWN_VERSION};

pub struct LeagueOfGraphs {
    base: String,
}

fn call_process_champion<'a>(
    adapter: &'a LeagueOfGraphs,
    ctx: &'a RunContext,
    scheduler: &'a Scheduler,
    champ: &'a str,
    site_version: &'a str,
) -> futures::future::BoxFuture<'a, ()> {
    Box::pin(adapter.process_champion(ctx, scheduler, champ, site_version))
}

impl LeagueOfGraphs {
    pub fn new(base: String) -> Self {
        Self { base }
    }

    async fn fetch_version(&self, scheduler: &Scheduler) -> Result<String> {
        let doc = scheduler.get(&format!("{}/contact", self.base)).await?;
        parse_patch_version(&doc)
    }

    async fn get_positions(&self, scheduler: &Scheduler, champ: &str) -> Result<Vec<String>> {
        let url = format!("{}/champions/items/{}/", self.base, champ);
        let doc = scheduler.get(&url).await?;
        parse_positions(&doc)
    }

    async fn get_items(
        &self,
        scheduler: &Scheduler,
        ctx: &RunContext,
        champ: &str,
        position: &str,
    ) -> Result<ScrapedItems> {
        let url = format!("{}/champions/items/{}/{}/", self.base, champ, position);
        let doc = scheduler.get(&url).await?;
        parse_items(&doc, ctx)
    }

    async fn get_skills(
        &self,
        scheduler: &Scheduler,
        ctx: &RunContext,
        champ: &str,
        position: &str,
    ) -> Result<String> {
        let url = format!("{}/champions/skills-orders/{}/{}/", self.base, champ, position);
        let doc = scheduler.get(&url).await?;
        let letters = parse_skills(&doc)?;
        if ctx.settings.options.skills_format {
            Ok(shorthand_skills(&letters))
        } else {
            Ok(letters.join("."))
        }
    }

    async fn process_champion(
        &self,
        ctx: &RunContext,
        scheduler: &Scheduler,
        champ: &str,
        site_version: &str,
    ) {
        ctx.progress.step(format!(
            "{} LeagueOfGraphs: {}",
            ctx.translate.t("processing"),
            ctx.translate.t(champ)
        ));
        ctx.incr_champ(1.0);

        let positions = match self.get_positions(scheduler, champ).await {
            Ok(positions) => positions,
            Err(err) => {
                warn!(champ, %err, "LeagueOfGraphs: positions unavailable");
                ctx.push_failure(FailureEntry::new(champ, "All", self.name()));
                return;
            }
        };

        for position in positions {
            match self
                .build_unit(ctx, scheduler, champ, &position, site_version)
                .await
            {
                Ok(record) => ctx.push_sr(record),
                Err(err) => {
                    warn!(champ, %position, %err, "LeagueOfGraphs: build unavailable");
                    ctx.push_failure(FailureEntry::new(champ, position.clone(), self.name()));
                }
            }
        }
    }

    async fn build_unit(
        &self,
        ctx: &RunContext,
        scheduler: &Scheduler,
        champ: &str,
        position: &str,
        site_version: &str,
    ) -> Result<BuildRecord> {
        let (items, skills) = tokio::try_join!(
            self.get_items(scheduler, ctx, champ, position),
            self.get_skills(scheduler, ctx, champ, position)
        )?;

        let t = &ctx.translate;
        let mut blocks = vec![
            ItemBlock {
                block_type: t.tc("starter"),
                items: array_to_builds(&items.starter),
            },
            ItemBlock {
                block_type: t.tc("core_items"),
                items: array_to_builds(&items.core),
            },
            ItemBlock {
                block_type: t.tc("endgame_items"),
                items: array_to_builds(&items.end),
            },
            ItemBlock {
                block_type: t.tc("boots"),
                items: array_to_builds(&items.boots),
            },
        ];

        let labels = SkillLabels {
            most_freq: Some(skills.clone()),
            highest_win: Some(skills),
        };
        trinks_con(&mut blocks, &labels, &ctx.settings.options, t);

        let position_label = t.tc(position);
        let mut item_set = ItemSet::new(champ, format!("LOG {} {}", position_label, site_version));
        item_set.blocks = blocks;

        Ok(BuildRecord {
            champion: champ.to_string(),
            file_prefix: position.to_string(),
            source: self.id().to_string(),
            item_set,
        })
    }
}

#[async_trait]
impl SourceAdapter for LeagueOfGraphs {
    fn name(&self) -> &str {
        "LeagueOfGraphs"
    }

    fn id(&self) -> &str {
        "leagueofgraphs"
    }

    async fn get_version(&self, scheduler: &Scheduler) -> String {
        match self.fetch_version(scheduler).await {
            Ok(version) => version,
            Err(err) => {
                warn!(%err, "LeagueOfGraphs: version unavailable");
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    async fn get_sr(&self, ctx: &RunContext, scheduler: &Scheduler) -> Result<()> {
        let site_version = self.get_version(scheduler).await;
        ctx.set_source_version(self.id(), &site_version);

        let futures: Vec<_> = ctx
            .champs
            .iter()
            .map(|champ| call_process_champion(self, ctx, scheduler, champ, &site_version))
            .collect();
        stream::iter(futures)
            .buffer_unordered(ADAPTER_CONCURRENCY)
            .collect::<Vec<()>>()
            .await;

        Ok(())
    }
}

struct ScrapedItems {
    starter: Vec<String>,
    core: Vec<String>,
    end: Vec<String>,
    boots: Vec<String>,
}

fn parse_patch_version(doc: &str) -> Result<String> {
    let text = slice_between_ci(doc, r#"class="patch">"#, "</")
        .ok_or_else(|| Error::MissingData("LeagueOfGraphs: patch banner".to_string()))?;
    Ok(strip_tags(text).replace("Patch: ", "").trim().to_string())
}

fn parse_positions(doc: &str) -> Result<Vec<String>> {
    let subtitle = slice_between_ci(doc, r#"class="bannerSubtitle">"#, "</div>")
        .ok_or_else(|| Error::MissingData("LeagueOfGraphs: banner subtitle".to_string()))?;
    let positions = strip_tags(subtitle)
        .to_lowercase()
        .trim()
        .split(", ")
        .map(normalize_position)
        .collect::<Vec<_>>();
    if positions.iter().all(|p| p.is_empty()) {
        return Err(Error::MissingData(
            "LeagueOfGraphs: no positions listed".to_string(),
        ));
    }
    Ok(positions)
}

fn parse_items(doc: &str, ctx: &RunContext) -> Result<ScrapedItems> {
    // Starter items live in the first cell after the starters marker; the
    // cell text carries a multiplier for the last item ("x2").
    let starters_at = find_ci(doc, "itemStarters", 0)
        .ok_or_else(|| Error::MissingData("LeagueOfGraphs: starter items".to_string()))?;
    let (td_start, td_end) = next_tag_block_ci(doc, "<td", "</td>", starters_at)
        .ok_or_else(|| Error::MissingData("LeagueOfGraphs: starter items".to_string()))?;
    let starter_td = &doc[td_start..td_end];

    let mut starter = resolve_item_ids(&img_alts(starter_td), ctx)?;
    let digits: String = strip_tags(inner_after_open_tag(starter_td))
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if let (Ok(count), Some(last)) = (digits.parse::<usize>(), starter.last().cloned()) {
        for _ in 1..count {
            starter.push(last.clone());
        }
    }

    let tables = blocks_with_marker(doc, "<table", "</table>", "data_table");
    let table = |index: usize| {
        tables.get(index).copied().ok_or_else(|| {
            Error::MissingData(format!("LeagueOfGraphs: build table {index}"))
        })
    };

    let core_td = {
        let block = table(1)?;
        let (start, end) = next_tag_block_ci(block, "<td", "</td>", 0)
            .ok_or_else(|| Error::MissingData("LeagueOfGraphs: core items cell".to_string()))?;
        &block[start..end]
    };
    let core = resolve_item_ids(&img_alts(core_td), ctx)?;

    let mut end_alts = img_alts(table(2)?);
    end_alts.truncate(6);
    let end = resolve_item_ids(&end_alts, ctx)?;

    let mut boots_alts = img_alts(table(3)?);
    boots_alts.truncate(3);
    let boots = resolve_item_ids(&boots_alts, ctx)?;

    Ok(ScrapedItems {
        starter,
        core,
        end,
        boots,
    })
}

fn resolve_item_ids(alts: &[String], ctx: &RunContext) -> Result<Vec<String>> {
    alts.iter()
        .map(|alt| {
            if alt == "Total Biscuit of Rejuvenation" {
                return Ok("2010".to_string());
            }
            ctx.item_names
                .get(alt)
                .cloned()
                .ok_or_else(|| Error::Parsing(format!("LeagueOfGraphs: unknown item '{alt}'")))
        })
        .collect()
}

fn parse_skills(doc: &str) -> Result<Vec<String>> {
    let tables = blocks_with_marker(doc, "<table", "</table>", "skillsOrderTable");
    let table = tables
        .first()
        .ok_or_else(|| Error::MissingData("LeagueOfGraphs: skill order table".to_string()))?;

    const ABILITIES: [&str; 4] = ["Q", "W", "E", "R"];
    let mut levels: Vec<Option<&str>> = Vec::new();

    let mut row_index = 0usize;
    let mut pos = 0usize;
    while let Some((row_start, row_end)) = next_tag_block_ci(table, "<tr", "</tr>", pos) {
        let row = &table[row_start..row_end];
        pos = row_end;

        // First row is the level header.
        if row_index == 0 {
            row_index += 1;
            continue;
        }
        let Some(ability) = ABILITIES.get(row_index - 1) else {
            break;
        };
        row_index += 1;

        let mut cell_index = 0usize;
        let mut cell_pos = 0usize;
        while let Some((cell_start, cell_end)) = next_tag_block_ci(row, "<td", "</td>", cell_pos) {
            let cell = &row[cell_start..cell_end];
            cell_pos = cell_end;

            let open_end = cell.find('>').unwrap_or(cell.len());
            if find_ci(&cell[..open_end], "skillCell", 0).is_none() {
                continue;
            }
            if levels.len() <= cell_index {
                levels.resize(cell_index + 1, None);
            }
            if find_ci(&cell[..open_end], "active", 0).is_some() {
                levels[cell_index] = Some(ability);
            }
            cell_index += 1;
        }
    }

    let letters: Vec<String> = levels
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    if letters.is_empty() {
        return Err(Error::MissingData(
            "LeagueOfGraphs: no leveled skills".to_string(),
        ));
    }
    Ok(letters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::progress::{NoProgress, Progress};
    use crate::translate::Translator;
    use std::collections::HashMap;

    fn test_ctx() -> RunContext {
        let settings: Settings =
            toml::from_str("[install]\nitemset_path = \"/tmp/itemsets\"\n").unwrap();
        let mut item_names = HashMap::new();
        item_names.insert("Doran's Ring".to_string(), "1056".to_string());
        item_names.insert("Health Potion".to_string(), "2003".to_string());
        item_names.insert("Luden's Echo".to_string(), "3285".to_string());
        item_names.insert("Sorcerer's Shoes".to_string(), "3020".to_string());
        item_names.insert("Rabadon's Deathcap".to_string(), "3089".to_string());

        RunContext::new(
            settings,
            "6.6.1".to_string(),
            vec!["ahri".to_string()],
            HashMap::new(),
            item_names,
            HashMap::new(),
            Translator::new("en"),
            Progress::new(Box::new(NoProgress)),
        )
    }

    #[test]
    fn patch_version_from_banner() {
        let doc = r#"<footer><div class="patch">Patch: 6.6</div></footer>"#;
        assert_eq!(parse_patch_version(doc).unwrap(), "6.6");
    }

    #[test]
    fn positions_from_subtitle() {
        let doc = r#"<div class="bannerSubtitle">Mid, AD Carry</div>"#;
        assert_eq!(parse_positions(doc).unwrap(), vec!["middle", "adc"]);
    }

    #[test]
    fn items_from_build_tables() {
        let doc = r#"
            <div class="itemStarters"><table><tr>
              <td><img alt="Doran's Ring"><img alt="Health Potion"> x2</td>
              <td>other</td>
            </tr></table></div>
            <table class="data_table"><tr><td>popularity</td></tr></table>
            <table class="data_table"><tr><td><img alt="Luden's Echo"><img alt="Sorcerer's Shoes"></td></tr></table>
            <table class="data_table"><tr><td><img alt="Rabadon's Deathcap"></td></tr></table>
            <table class="data_table"><tr><td><img alt="Sorcerer's Shoes"></td></tr></table>
        "#;
        let ctx = test_ctx();
        let items = parse_items(doc, &ctx).unwrap();
        // The trailing "x2" multiplies the last starter item.
        assert_eq!(items.starter, vec!["1056", "2003", "2003"]);
        assert_eq!(items.core, vec!["3285", "3020"]);
        assert_eq!(items.end, vec!["3089"]);
        assert_eq!(items.boots, vec!["3020"]);
    }

    #[test]
    fn biscuit_alias_resolves_without_lookup() {
        let ctx = test_ctx();
        let ids =
            resolve_item_ids(&["Total Biscuit of Rejuvenation".to_string()], &ctx).unwrap();
        assert_eq!(ids, vec!["2010"]);
    }

    #[test]
    fn unknown_item_name_is_a_parse_error() {
        let ctx = test_ctx();
        let result = resolve_item_ids(&["No Such Item".to_string()], &ctx);
        assert!(matches!(result, Err(Error::Parsing(_))));
    }

    #[test]
    fn skills_from_order_table() {
        let doc = r#"
            <table class="skillsOrderTable">
              <tr><td>1</td><td>2</td><td>3</td></tr>
              <tr><td class="skillCell active">.</td><td class="skillCell">.</td><td class="skillCell active">.</td></tr>
              <tr><td class="skillCell">.</td><td class="skillCell active">.</td><td class="skillCell">.</td></tr>
              <tr><td class="skillCell">.</td><td class="skillCell">.</td><td class="skillCell">.</td></tr>
              <tr><td class="skillCell">.</td><td class="skillCell">.</td><td class="skillCell">.</td></tr>
            </table>
        "#;
        assert_eq!(parse_skills(doc).unwrap(), vec!["Q", "W", "Q"]);
    }

    #[test]
    fn missing_skill_table_is_missing_data() {
        assert!(matches!(
            parse_skills("<html></html>"),
            Err(Error::MissingData(_))
        ));
    }
}
