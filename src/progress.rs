//! Import progress reporting.
//!
//! Reports observable progress during an import so users see which champion
//! is being processed and how far along the run is. Progress is emitted on
//! **stderr** so stdout remains parseable for scripts.

use std::io::Write;
use std::sync::Mutex;

/// A single progress event during an import.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// A pipeline step started (metadata fetch, source processing, writing).
    Step { message: String },
    /// Overall completion moved to `value` percent.
    Percent { value: u8 },
}

/// Reports import progress. Implementations write to stderr.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "processing LeagueOfGraphs: Ahri  37%".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Step { message } => format!("{}\n", message),
            ProgressEvent::Percent { value } => format!("  {}%\n", value),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Progress mode for the CLI: off or human (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
        }
    }
}

/// Monotonic percentage tracker shared across concurrently-running sources.
///
/// Increments interleave in no particular order; only the final total
/// matters, and [`Progress::finish`] forces 100% regardless of rounding
/// drift from per-champion increments.
pub struct Progress {
    percentage: Mutex<f64>,
    reporter: Box<dyn ProgressReporter>,
}

impl Progress {
    pub fn new(reporter: Box<dyn ProgressReporter>) -> Self {
        Self {
            percentage: Mutex::new(0.0),
            reporter,
        }
    }

    pub fn reset(&self) {
        *self.percentage.lock().unwrap() = 0.0;
    }

    /// Emit a step message without moving the percentage.
    pub fn step(&self, message: impl Into<String>) {
        self.reporter.report(ProgressEvent::Step {
            message: message.into(),
        });
    }

    /// Advance by `amount` percent, clamped to 100.
    pub fn incr(&self, amount: f64) {
        let value = {
            let mut pct = self.percentage.lock().unwrap();
            *pct = (*pct + amount).min(100.0);
            *pct
        };
        self.reporter.report(ProgressEvent::Percent {
            value: value.floor() as u8,
        });
    }

    /// Force completion to 100%.
    pub fn finish(&self) {
        *self.percentage.lock().unwrap() = 100.0;
        self.reporter
            .report(ProgressEvent::Percent { value: 100 });
    }

    pub fn current(&self) -> f64 {
        *self.percentage.lock().unwrap()
    }
}
