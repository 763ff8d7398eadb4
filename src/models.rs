//! Core data models used throughout the build pipeline.
//!
//! These types represent the normalized build records, item blocks, and
//! failure entries that flow from the source adapters to the writer.

use serde::{Deserialize, Serialize};

/// One item reference inside a block. `count` is the occurrence count of the
/// id across the scraped entries, never a stack size or cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub id: String,
    pub count: u32,
}

impl ItemEntry {
    pub fn new(id: impl Into<String>, count: u32) -> Self {
        Self {
            id: id.into(),
            count,
        }
    }
}

/// A named, ordered group of items within a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub items: Vec<ItemEntry>,
}

/// The build-configuration payload consumed by the game client.
///
/// Field order and the envelope defaults mirror the client's recommended
/// item-set schema; adapters only ever touch `champion`, `title`, `map`,
/// and `blocks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSet {
    #[serde(rename = "type", default = "default_set_type")]
    pub set_type: String,
    #[serde(default = "default_map")]
    pub map: String,
    #[serde(default = "default_map")]
    pub mode: String,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub sortrank: u32,
    #[serde(default)]
    pub champion: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<ItemBlock>,
}

fn default_set_type() -> String {
    "custom".to_string()
}
fn default_map() -> String {
    "any".to_string()
}

impl ItemSet {
    /// A fresh item set with the client's envelope defaults.
    pub fn new(champion: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            set_type: default_set_type(),
            map: default_map(),
            mode: default_map(),
            priority: false,
            sortrank: 0,
            champion: champion.into(),
            title: title.into(),
            blocks: Vec::new(),
        }
    }
}

/// Output of one adapter run for one (champion, position).
#[derive(Debug, Clone)]
pub struct BuildRecord {
    /// Canonical champion identifier (lowercase, spaces stripped).
    pub champion: String,
    /// Position or mode token used for output filename disambiguation.
    pub file_prefix: String,
    /// Adapter identifier.
    pub source: String,
    /// The client-schema payload.
    pub item_set: ItemSet,
}

/// One unit of work an adapter could not complete. Collected during a run
/// and surfaced in the completion report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub champion: String,
    pub position: String,
    pub source: String,
}

impl FailureEntry {
    pub fn new(
        champion: impl Into<String>,
        position: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            champion: champion.into(),
            position: position.into(),
            source: source.into(),
        }
    }

    /// Coarse entry recording a whole-source failure.
    pub fn whole_source(source: impl Into<String>) -> Self {
        Self::new("All", "All", source)
    }
}
