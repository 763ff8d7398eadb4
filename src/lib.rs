//! # itemforge
//!
//! Aggregates champion item-build recommendations from community statistics
//! sites, normalizes them into the game client's item-set schema, and writes
//! them under the client's install root.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌────────────┐
//! │   Sources    │──▶│ Aggregator   │──▶│  Fix-up &  │
//! │ LOG / U.gg   │   │ roster, fan- │   │   Writer   │
//! └──────┬───────┘   │ out, ledger  │   └────────────┘
//!        │           └─────────────┘
//!        ▼
//! ┌──────────────┐
//! │  Scheduler   │  global + per-host connection limits, retries
//! └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! itemforge import                # run the full aggregation pipeline
//! itemforge delete                # delete previously generated builds
//! itemforge version               # resolved game + per-source versions
//! itemforge sources               # list registered source adapters
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`scheduler`] | Concurrency-bounded, retrying HTTP fetch layer |
//! | [`sources`] | Source adapters and their registry |
//! | [`aggregator`] | Import orchestration |
//! | [`writer`] | Special-item fix-up and file persistence |
//! | [`dragon`] | Game-metadata feed client |
//! | [`models`] | Core data types |
//! | [`helpers`] | Block/skill transforms shared by adapters |
//! | [`html`] | Minimal HTML slicing for markup sources |
//! | [`config`] | TOML settings |
//! | [`context`] | Run-scoped aggregation state |

pub mod aggregator;
pub mod config;
pub mod context;
pub mod dragon;
pub mod errors;
pub mod helpers;
pub mod html;
pub mod models;
pub mod platform;
pub mod progress;
pub mod scheduler;
pub mod sources;
pub mod translate;
pub mod writer;
