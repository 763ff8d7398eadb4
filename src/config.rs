use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted settings: install location, import options, and the endpoint
/// bases (overridable so tests can point the pipeline at stub servers).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub install: InstallConfig,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub endpoints: Endpoints,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InstallConfig {
    /// Root the game client reads item sets from.
    pub itemset_path: PathBuf,
    /// Game-data version stamped after the last successful import.
    #[serde(default)]
    pub local_version: Option<String>,
}

/// Import options mirrored from the settings screen.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Options {
    /// Summoner's Rift sources to import from, by adapter id.
    #[serde(default = "default_sr_source")]
    pub sr_source: Vec<String>,
    #[serde(default)]
    pub aram: bool,
    #[serde(default = "default_true")]
    pub consumables: bool,
    #[serde(default)]
    pub consumables_position: BlockPosition,
    #[serde(default = "default_true")]
    pub trinkets: bool,
    #[serde(default)]
    pub trinkets_position: BlockPosition,
    /// Force the map identifier to Summoner's Rift on non-ARAM sets.
    #[serde(default = "default_true")]
    pub lock_sr: bool,
    /// Collapse skill orders to shorthand form.
    #[serde(default)]
    pub skills_format: bool,
    /// Skip deleting previously generated files before a run.
    #[serde(default)]
    pub keep_old_builds: bool,
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sr_source: default_sr_source(),
            aram: false,
            consumables: true,
            consumables_position: BlockPosition::default(),
            trinkets: true,
            trinkets_position: BlockPosition::default(),
            lock_sr: true,
            skills_format: false,
            keep_old_builds: false,
            locale: default_locale(),
        }
    }
}

/// Where an embellishment block lands relative to the scraped blocks.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockPosition {
    Beginning,
    #[default]
    End,
}

impl BlockPosition {
    pub fn is_beginning(self) -> bool {
        self == BlockPosition::Beginning
    }
}

/// Upstream endpoint bases. Defaults target the live sites.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Endpoints {
    #[serde(default = "default_data_dragon")]
    pub data_dragon: String,
    #[serde(default = "default_leagueofgraphs")]
    pub leagueofgraphs: String,
    #[serde(default = "default_ugg")]
    pub ugg: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            data_dragon: default_data_dragon(),
            leagueofgraphs: default_leagueofgraphs(),
            ugg: default_ugg(),
        }
    }
}

fn default_sr_source() -> Vec<String> {
    vec!["leagueofgraphs".to_string()]
}
fn default_true() -> bool {
    true
}
fn default_locale() -> String {
    "en".to_string()
}
fn default_data_dragon() -> String {
    "https://ddragon.leagueoflegends.com".to_string()
}
fn default_leagueofgraphs() -> String {
    "https://www.leagueofgraphs.com".to_string()
}
fn default_ugg() -> String {
    "https://stats2.u.gg".to_string()
}

impl Settings {
    /// At least one Summoner's Rift source must be selected for an import.
    pub fn has_sr_source(&self) -> bool {
        self.options.sr_source.iter().any(|s| !s.is_empty())
    }

    /// Persist the settings back to `path` as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    let settings: Settings =
        toml::from_str(&content).with_context(|| "Failed to parse settings file")?;

    if settings.install.itemset_path.as_os_str().is_empty() {
        anyhow::bail!("install.itemset_path must not be empty");
    }

    Ok(settings)
}
