//! Source adapters and their registry.
//!
//! Each upstream statistics site gets one adapter implementing
//! [`SourceAdapter`]. Adapters are fire-and-collect: `get_sr`/`get_aram`
//! append normalized build records and failure entries into the shared
//! [`RunContext`] rather than returning records, so one champion's failure
//! never aborts sibling work.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │            SourceRegistry            │
//! │  ┌───────────────┐  ┌─────────────┐  │
//! │  │LeagueOfGraphs │  │    U.gg     │  │
//! │  │   (markup)    │  │   (JSON)    │  │
//! │  └───────────────┘  └─────────────┘  │
//! └──────────────┬───────────────────────┘
//!                ▼
//!       get_sr()/get_aram() → RunContext buckets
//! ```

use async_trait::async_trait;

use crate::config::Settings;
use crate::context::RunContext;
use crate::errors::{Error, Result};
use crate::scheduler::Scheduler;

pub mod leagueofgraphs;
pub mod ugg;

/// Version string used when a site's own version cannot be resolved.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Champion/position fetches an adapter keeps in flight at once.
pub const ADAPTER_CONCURRENCY: usize = 3;

/// A statistics site the pipeline can pull builds from.
///
/// # Contract
///
/// - `get_version` is best-effort: on any failure it logs a warning and
///   returns [`UNKNOWN_VERSION`], never an error.
/// - `get_sr` and `get_aram` swallow per-unit failures into the context's
///   failure ledger; an `Err` from them means the whole source failed (for
///   example its champion roster endpoint was unreachable).
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display name (e.g. `"LeagueOfGraphs"`), used in failure reports.
    fn name(&self) -> &str;

    /// Adapter identifier (e.g. `"leagueofgraphs"`), used in settings and
    /// output filenames.
    fn id(&self) -> &str;

    /// Whether this source can provide ARAM builds.
    fn supports_aram(&self) -> bool {
        false
    }

    /// The site's own advertised data version, or [`UNKNOWN_VERSION`].
    async fn get_version(&self, scheduler: &Scheduler) -> String;

    /// Collect Summoner's Rift builds for the run's roster.
    async fn get_sr(&self, ctx: &RunContext, scheduler: &Scheduler) -> Result<()>;

    /// Collect ARAM builds. Only meaningful when [`supports_aram`] is true.
    async fn get_aram(&self, _ctx: &RunContext, _scheduler: &Scheduler) -> Result<()> {
        Err(Error::MissingData(format!(
            "{} has no ARAM support",
            self.name()
        )))
    }
}

/// Static registry mapping adapter ids to adapters, built at startup.
pub struct SourceRegistry {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Registry pre-loaded with every built-in adapter, pointed at the
    /// configured endpoint bases.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(leagueofgraphs::LeagueOfGraphs::new(
            settings.endpoints.leagueofgraphs.clone(),
        )));
        registry.register(Box::new(ugg::Ugg::new(settings.endpoints.ugg.clone())));
        registry
    }

    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.push(adapter);
        self.adapters.sort_by(|a, b| a.name().cmp(b.name()));
    }

    pub fn find(&self, id: &str) -> Option<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.as_ref())
    }

    /// The first registered adapter that can provide ARAM builds.
    pub fn aram_adapter(&self) -> Option<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.supports_aram())
            .map(|a| a.as_ref())
    }

    pub fn adapters(&self) -> &[Box<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
