//! Run-scoped aggregation state.
//!
//! One [`RunContext`] is built per import after metadata resolution and is
//! shared by reference through the whole fan-out. Result buckets and the
//! failure ledger are append-only under their locks; the metadata fields are
//! immutable once the context exists, so no adapter can observe a half-built
//! item lookup or special-item map.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::Settings;
use crate::models::{BuildRecord, FailureEntry};
use crate::progress::Progress;
use crate::translate::Translator;

pub struct RunContext {
    /// Settings snapshot taken at run start.
    pub settings: Settings,
    /// Resolved game-data version (full, e.g. "6.6.1").
    pub version: String,
    /// Canonical champion ids, sorted.
    pub champs: Vec<String>,
    /// Canonical champion id → numeric key from the metadata feed.
    pub champ_ids: HashMap<String, String>,
    /// Item display name → item id, for markup sources.
    pub item_names: HashMap<String, String>,
    /// Conditional-recipe substitutions applied by the fix-up stage.
    pub special_items: HashMap<String, String>,
    /// Translator with merged champion names.
    pub translate: Translator,
    pub progress: Progress,

    /// Per-source advertised data versions, filled during fan-out.
    source_versions: Mutex<HashMap<String, String>>,
    sr_itemsets: Mutex<Vec<BuildRecord>>,
    aram_itemsets: Mutex<Vec<BuildRecord>>,
    undefined_builds: Mutex<Vec<FailureEntry>>,
}

impl RunContext {
    pub fn new(
        settings: Settings,
        version: String,
        champs: Vec<String>,
        champ_ids: HashMap<String, String>,
        item_names: HashMap<String, String>,
        special_items: HashMap<String, String>,
        translate: Translator,
        progress: Progress,
    ) -> Self {
        Self {
            settings,
            version,
            champs,
            champ_ids,
            item_names,
            special_items,
            translate,
            progress,
            source_versions: Mutex::new(HashMap::new()),
            sr_itemsets: Mutex::new(Vec::new()),
            aram_itemsets: Mutex::new(Vec::new()),
            undefined_builds: Mutex::new(Vec::new()),
        }
    }

    pub fn push_sr(&self, record: BuildRecord) {
        self.sr_itemsets.lock().unwrap().push(record);
    }

    pub fn push_aram(&self, record: BuildRecord) {
        self.aram_itemsets.lock().unwrap().push(record);
    }

    pub fn push_failure(&self, entry: FailureEntry) {
        self.undefined_builds.lock().unwrap().push(entry);
    }

    pub fn set_source_version(&self, source: &str, version: &str) {
        self.source_versions
            .lock()
            .unwrap()
            .insert(source.to_string(), version.to_string());
    }

    /// Per-source versions recorded during fan-out, sorted by source id.
    pub fn source_versions(&self) -> Vec<(String, String)> {
        let mut versions: Vec<(String, String)> = self
            .source_versions
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        versions.sort();
        versions
    }

    /// Drain both result buckets into one flat sequence for the writer.
    pub fn take_itemsets(&self) -> Vec<BuildRecord> {
        let mut merged: Vec<BuildRecord> = self.sr_itemsets.lock().unwrap().drain(..).collect();
        merged.extend(self.aram_itemsets.lock().unwrap().drain(..));
        merged
    }

    /// Failure ledger snapshot, grouped by sorting on source name.
    pub fn failures(&self) -> Vec<FailureEntry> {
        let mut entries = self.undefined_builds.lock().unwrap().clone();
        entries.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.champion.cmp(&b.champion))
                .then_with(|| a.position.cmp(&b.position))
        });
        entries
    }

    /// Number of sources contributing to this run (selected SR sources plus
    /// the ARAM pass when enabled). Used to size per-champion increments.
    pub fn source_count(&self) -> usize {
        let mut count = self
            .settings
            .options
            .sr_source
            .iter()
            .filter(|s| !s.is_empty())
            .count();
        if self.settings.options.aram {
            count += 1;
        }
        count.max(1)
    }

    /// Advance progress by one champion's share of the run.
    pub fn incr_champ(&self, divisible: f64) {
        let champs = self.champs.len().max(1) as f64;
        let sources = self.source_count() as f64;
        self.progress.incr(100.0 / champs / sources / divisible);
    }
}
