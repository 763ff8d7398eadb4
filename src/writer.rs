//! Fix-up and persistence of the merged build set.
//!
//! Runs strictly after the fan-out: substitutions use the run's shared
//! special-item map over the union of all sources, then each record lands at
//! its canonical path under the install root. Stale output from prior runs
//! is recognized by the filename prefix and swept first.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::Settings;
use crate::context::RunContext;
use crate::errors::{Error, Result};
use crate::models::ItemSet;

/// Filename prefix marking files this tool generated.
pub const FILE_PREFIX: &str = "ITF";

/// Delete build files from prior runs.
///
/// Only files matching the `ITF_*.json` convention are touched. Deletion
/// failures are logged and skipped — a stale file is not worth aborting an
/// import over. `manual` marks an explicit user request, which overrides the
/// keep-old-builds opt-out.
pub fn delete_old_builds(settings: &Settings, manual: bool) -> Result<()> {
    if settings.options.keep_old_builds && !manual {
        return Ok(());
    }

    let root = &settings.install.itemset_path;
    if !root.exists() {
        return Ok(());
    }

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(&format!("{FILE_PREFIX}_")) && name.ends_with(".json") {
            if let Err(err) = std::fs::remove_file(entry.path()) {
                warn!(path = %entry.path().display(), %err, "could not delete old build");
            }
        }
    }
    Ok(())
}

/// Substitute conditional-recipe item ids in place.
///
/// The map contains no chained substitutions, so applying it twice is a
/// no-op.
pub fn substitute_special_items(item_set: &mut ItemSet, special: &HashMap<String, String>) {
    for block in &mut item_set.blocks {
        for item in &mut block.items {
            if let Some(substitute) = special.get(&item.id) {
                item.id = substitute.clone();
            }
        }
    }
}

/// Apply special-item substitution over the merged result set and write one
/// file per record. Returns the written paths.
pub fn fix_and_save(ctx: &RunContext) -> Result<Vec<PathBuf>> {
    let records = ctx.take_itemsets();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut written = Vec::with_capacity(records.len());

    for mut record in records {
        let champ = if record.champion == "wukong" {
            "monkeyking".to_string()
        } else {
            record.champion.clone()
        };

        substitute_special_items(&mut record.item_set, &ctx.special_items);

        let folder = ctx
            .settings
            .install
            .itemset_path
            .join(&champ)
            .join("Recommended");
        if let Err(err) = std::fs::create_dir_all(&folder) {
            // The write below surfaces the real failure with its path.
            warn!(path = %folder.display(), %err, "could not create item set folder");
        }

        let file = folder.join(format!(
            "{}_{}_{}_{}.json",
            FILE_PREFIX, champ, record.source, record.file_prefix
        ));
        if !seen.insert(file.clone()) {
            return Err(Error::Operational(format!(
                "duplicate item set path: {}",
                file.display()
            )));
        }

        let json = to_pretty_json(&record.item_set)?;
        std::fs::write(&file, json).map_err(|source| Error::FileWrite {
            path: file.clone(),
            source,
        })?;
        written.push(file);
    }

    Ok(written)
}

/// Pretty-print with the client's 4-space indentation.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|err| Error::Operational(format!("item set serialization: {err}")))?;
    String::from_utf8(buf).map_err(|err| Error::Operational(format!("item set encoding: {err}")))
}
