//! Concurrency-bounded, retrying HTTP fetch layer.
//!
//! Every request in the pipeline goes through one [`Scheduler`]. Admission is
//! gated on a global in-flight ceiling and a per-host ceiling mirroring
//! browser connection-limit conventions — the upstream sites rate-limit per
//! IP, and a flat global cap alone does not protect a lightly-loaded host
//! from this client's own burst. Requests that cannot start immediately wait
//! in a FIFO list; every completion re-scans the list and starts whatever has
//! capacity (capacity-gated FIFO: a later request for an idle host may pass
//! an earlier request for a saturated one).
//!
//! Retries wrap the whole admit-send-complete cycle, so a retrying request
//! does not hold its slot across the backoff sleep.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

use crate::errors::{Error, Result};

/// Global ceiling on in-flight requests.
pub const MAX_CONCURRENT: usize = 17;
/// Ceiling on in-flight requests per hostname.
pub const MAX_CONCURRENT_PER_HOST: usize = 6;

const ATTEMPTS: u32 = 3;
const BACKOFF_MIN: Duration = Duration::from_millis(1000);
const BACKOFF_MAX: Duration = Duration::from_millis(30_000);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A queued request waiting for capacity.
struct Waiter {
    hostname: String,
    ready: oneshot::Sender<()>,
}

/// Scheduler-internal connection accounting.
///
/// Invariants: `total == sum(per_host.values())`; `per_host[h]` never
/// exceeds [`MAX_CONCURRENT_PER_HOST`]; `total` never exceeds
/// [`MAX_CONCURRENT`]; host entries are removed, not zeroed, when the last
/// request for that host completes.
#[derive(Default)]
struct Ledger {
    total: usize,
    per_host: HashMap<String, usize>,
    pending: Vec<Waiter>,
}

impl Ledger {
    fn can_start(&self, hostname: &str) -> bool {
        self.total < MAX_CONCURRENT
            && self.per_host.get(hostname).copied().unwrap_or(0) < MAX_CONCURRENT_PER_HOST
    }

    fn start(&mut self, hostname: &str) {
        self.total += 1;
        *self.per_host.entry(hostname.to_string()).or_insert(0) += 1;
    }

    fn finish(&mut self, hostname: &str) {
        self.total -= 1;
        if let Some(count) = self.per_host.get_mut(hostname) {
            *count -= 1;
            if *count == 0 {
                self.per_host.remove(hostname);
            }
        }
    }

    /// Start every currently-admissible pending request, scanning in queue
    /// order and removing started entries in place. Counters update
    /// synchronously during the scan, so one in-order pass is an exact
    /// admission scan.
    fn dispatch_pending(&mut self) {
        let mut i = 0;
        while i < self.pending.len() {
            if self.can_start(&self.pending[i].hostname) {
                let waiter = self.pending.remove(i);
                self.start(&waiter.hostname);
                if waiter.ready.send(()).is_err() {
                    // Receiver is gone; return the slot and rescan, since the
                    // freed capacity may admit an earlier-skipped entry.
                    self.finish(&waiter.hostname);
                    i = 0;
                }
            } else {
                i += 1;
            }
        }
    }
}

/// Releases the ledger slot when the request completes, then wakes whatever
/// pending requests the freed capacity admits.
struct Permit<'a> {
    scheduler: &'a Scheduler,
    hostname: String,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let mut ledger = self.scheduler.ledger.lock().unwrap();
        ledger.finish(&self.hostname);
        ledger.dispatch_pending();
    }
}

/// The shared request scheduler.
pub struct Scheduler {
    client: reqwest::Client,
    ledger: Mutex<Ledger>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Fetch `url`, returning the response body on a 2xx/3xx status.
    ///
    /// Retries the whole admit-send-complete cycle up to 3 attempts with
    /// exponential backoff; an HTTP status ≥ 400 counts as a failed attempt
    /// and surfaces as [`Error::Request`] with status, URL, and body once
    /// attempts are exhausted.
    pub async fn get(&self, url: &str) -> Result<String> {
        let hostname = hostname_of(url);
        with_retry(|| self.attempt(url, &hostname)).await
    }

    /// Fetch `url` and deserialize the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?;
        serde_json::from_str(&body).map_err(|err| Error::Parsing(format!("{url}: {err}")))
    }

    async fn attempt(&self, url: &str, hostname: &str) -> Result<String> {
        let _permit = self.acquire(hostname).await;

        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|err| Error::request_transport(url, &err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::request_transport(url, &err))?;

        if status.as_u16() >= 400 {
            return Err(Error::Request {
                code: status.as_u16().to_string(),
                url: url.to_string(),
                body,
            });
        }
        Ok(body)
    }

    /// Wait for a ledger slot for `hostname`.
    async fn acquire(&self, hostname: &str) -> Permit<'_> {
        loop {
            let receiver = {
                let mut ledger = self.ledger.lock().unwrap();
                if ledger.can_start(hostname) {
                    ledger.start(hostname);
                    None
                } else {
                    let (ready, receiver) = oneshot::channel();
                    ledger.pending.push(Waiter {
                        hostname: hostname.to_string(),
                        ready,
                    });
                    Some(receiver)
                }
            };

            match receiver {
                None => break,
                Some(receiver) => {
                    // A successful recv means dispatch_pending started our
                    // slot on our behalf; a closed channel means the waiter
                    // was abandoned and we re-enter admission.
                    if receiver.await.is_ok() {
                        break;
                    }
                }
            }
        }

        Permit {
            scheduler: self,
            hostname: hostname.to_string(),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `operation` up to 3 attempts with exponential backoff (1s, 2s, …,
/// capped at 30s between attempts), returning the last error on exhaustion.
pub(crate) async fn with_retry<T, F, Fut>(mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = BACKOFF_MIN;
    let mut last_err = None;

    for attempt in 0..ATTEMPTS {
        if attempt > 0 {
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(BACKOFF_MAX);
        }
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => last_err = Some(err),
        }
    }

    Err(last_err.unwrap_or_else(|| Error::Uncaught("retry ran zero attempts".to_string())))
}

/// Extract the hostname from a URL: optional scheme and userinfo stripped,
/// port, path, query, and fragment ignored.
pub fn hostname_of(url: &str) -> String {
    let mut rest = url;

    // "<scheme>:" with optional "//" — only when the leading run of word
    // characters is immediately followed by ':'.
    let scheme_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if scheme_len > 0 && rest[scheme_len..].starts_with(':') {
        rest = &rest[scheme_len + 1..];
        rest = rest.strip_prefix("//").unwrap_or(rest);
    }

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];

    let host_port = match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    };

    match host_port.find(':') {
        Some(colon) => host_port[..colon].to_string(),
        None => host_port.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn hostname_extraction() {
        assert_eq!(
            hostname_of("https://ddragon.leagueoflegends.com/realms/na.json"),
            "ddragon.leagueoflegends.com"
        );
        assert_eq!(hostname_of("http://example.com:8080/x?q=1"), "example.com");
        assert_eq!(hostname_of("example.com/path"), "example.com");
        assert_eq!(hostname_of("example.com:443"), "example.com");
        assert_eq!(hostname_of("https://user:pw@example.com/x"), "example.com");
    }

    #[test]
    fn ledger_counts_and_sparse_hosts() {
        let mut ledger = Ledger::default();
        ledger.start("a.com");
        ledger.start("a.com");
        ledger.start("b.com");
        assert_eq!(ledger.total, 3);
        assert_eq!(ledger.per_host["a.com"], 2);

        ledger.finish("a.com");
        ledger.finish("a.com");
        ledger.finish("b.com");
        assert_eq!(ledger.total, 0);
        assert!(ledger.per_host.is_empty());
    }

    /// Ledger consistency: total always equals the sum of per-host counts,
    /// and neither bound is ever exceeded, across a large interleaved load.
    #[tokio::test(start_paused = true)]
    async fn concurrency_bounds_hold() {
        let scheduler = Arc::new(Scheduler::new());
        let hosts = ["a.com", "b.com", "c.com"];

        let mut handles = Vec::new();
        for i in 0..60usize {
            let scheduler = Arc::clone(&scheduler);
            let host = hosts[i % hosts.len()].to_string();
            handles.push(tokio::spawn(async move {
                let _permit = scheduler.acquire(&host).await;
                {
                    let ledger = scheduler.ledger.lock().unwrap();
                    assert!(ledger.total <= MAX_CONCURRENT);
                    assert!(ledger
                        .per_host
                        .values()
                        .all(|&n| n <= MAX_CONCURRENT_PER_HOST));
                    assert_eq!(ledger.total, ledger.per_host.values().sum::<usize>());
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let ledger = scheduler.ledger.lock().unwrap();
        assert_eq!(ledger.total, 0);
        assert!(ledger.per_host.is_empty());
        assert!(ledger.pending.is_empty());
    }

    /// A saturated host must not block a later-queued request for an idle
    /// host (capacity-gated FIFO, not strict global FIFO).
    #[tokio::test(start_paused = true)]
    async fn idle_host_passes_saturated_host() {
        let scheduler = Arc::new(Scheduler::new());

        let mut held = Vec::new();
        for _ in 0..MAX_CONCURRENT_PER_HOST {
            held.push(scheduler.acquire("a.com").await);
        }

        // Queued behind a saturated host...
        let blocked = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move {
                let _permit = scheduler.acquire("a.com").await;
            })
        };
        tokio::task::yield_now().await;

        // ...while a later request for an idle host goes straight through.
        let _b = scheduler.acquire("b.com").await;

        assert!(!blocked.is_finished());
        drop(held);
        blocked.await.unwrap();
    }

    /// An always-failing operation completes after exactly 3 attempts.
    #[tokio::test(start_paused = true)]
    async fn retry_runs_exactly_three_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<()> = with_retry(|| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(Error::Operational("always fails".to_string()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_on_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = with_retry(|| {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                    Ok(42)
                } else {
                    Err(Error::Operational("first attempt fails".to_string()))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
