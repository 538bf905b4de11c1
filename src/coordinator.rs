//! Periodic feed polling.
//!
//! [`UpdateCoordinator`] owns a set of named *feeds* — endpoint, callback,
//! optional loading flag — and refreshes each one on a fixed cadence:
//! an immediate fetch on [`start`](UpdateCoordinator::start), then one per
//! interval. Payloads pass through unchanged as [`serde_json::Value`]; the
//! coordinator knows nothing about what any feed returns.
//!
//! One tokio task per feed runs the polling loop. A cycle that fails (network,
//! HTTP status, bad JSON) is reported through the error hook and the loop
//! keeps going — the next tick is the retry. Timer-driven cycles for a single
//! feed never overlap, because each loop awaits its cycle before ticking
//! again. [`refresh_one`](UpdateCoordinator::refresh_one) is the exception:
//! an out-of-band cycle may race a timer cycle for the same key, so a slow
//! response can land after a newer one. Callers treat feed payloads as
//! snapshots, which makes that reordering harmless.
//!
//! `stop` aborts every polling task, but a fetch already in flight (from
//! `refresh_one`) cannot be recalled. Each start generation carries its own
//! "active" flag; cycles re-check it before invoking the callback, so a late
//! response arriving after `stop` is discarded instead of mutating UI state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::fetch::{FetchError, JsonFetcher};

/// Default refresh cadence, matching the dashboard's 30-second cycle.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(30_000);

/// Callback invoked with the parsed payload after a successful cycle.
pub type DataCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Hook invoked with the feed key and error after a failed cycle.
pub type ErrorCallback = Arc<dyn Fn(&str, &FetchError) + Send + Sync>;

/// Shared visibility flag for a per-feed loading indicator.
///
/// The application owns the flag (and whatever widget renders it); the
/// coordinator only toggles it for the duration of each cycle.
#[derive(Clone, Debug, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn set(&self, on: bool) {
        self.0.store(on, Ordering::Relaxed);
    }
}

/// Marks a loading flag visible for the lifetime of a cycle.
///
/// Dropping the guard clears the flag, so the indicator is released on the
/// success path, the failure path, and when an in-flight cycle is aborted.
struct LoadingGuard(Option<LoadingFlag>);

impl LoadingGuard {
    fn engage(flag: Option<LoadingFlag>) -> Self {
        if let Some(flag) = &flag {
            flag.set(true);
        }
        Self(flag)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(flag) = &self.0 {
            flag.set(false);
        }
    }
}

/// One polling subscription: key, endpoint, callback, optional indicator.
struct Feed {
    key: String,
    endpoint: String,
    on_data: DataCallback,
    loading: Option<LoadingFlag>,
}

/// Builder-style configuration consumed by [`UpdateCoordinator::configure`].
pub struct CoordinatorConfig {
    update_interval: Duration,
    feeds: Vec<Arc<Feed>>,
    on_error: ErrorCallback,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            feeds: Vec::new(),
            // The coordinator already logs failed cycles; the default hook
            // adds nothing on top.
            on_error: Arc::new(|_, _| {}),
        }
    }

    /// Override the refresh cadence shared by every feed.
    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Install the hook invoked after each failed cycle.
    pub fn on_error(mut self, hook: impl Fn(&str, &FetchError) + Send + Sync + 'static) -> Self {
        self.on_error = Arc::new(hook);
        self
    }

    /// Register a feed.
    ///
    /// Keys are unique: registering a key that already exists replaces the
    /// earlier registration in place (last binding wins), so no feed is ever
    /// polled twice per tick. Registration order is preserved.
    pub fn feed(
        mut self,
        key: impl Into<String>,
        endpoint: impl Into<String>,
        loading: Option<LoadingFlag>,
        on_data: impl Fn(Value) + Send + Sync + 'static,
    ) -> Self {
        let feed = Arc::new(Feed {
            key: key.into(),
            endpoint: endpoint.into(),
            on_data: Arc::new(on_data),
            loading,
        });
        match self.feeds.iter_mut().find(|f| f.key == feed.key) {
            Some(slot) => *slot = feed,
            None => self.feeds.push(feed),
        }
        self
    }
}

/// Manages the polling tasks for a set of feeds.
///
/// Constructed stopped; nothing is fetched until [`start`](Self::start).
pub struct UpdateCoordinator {
    interval: Duration,
    feeds: Vec<Arc<Feed>>,
    on_error: ErrorCallback,
    fetcher: Arc<dyn JsonFetcher>,
    handle: Handle,
    tasks: Vec<JoinHandle<()>>,
    active: Arc<AtomicBool>,
}

impl UpdateCoordinator {
    /// Build a coordinator in the stopped state.
    ///
    /// `handle` names the runtime that will carry the polling tasks.
    pub fn configure(config: CoordinatorConfig, fetcher: Arc<dyn JsonFetcher>, handle: Handle) -> Self {
        Self {
            interval: config.update_interval,
            feeds: config.feeds,
            on_error: config.on_error,
            fetcher,
            handle,
            tasks: Vec::new(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Begin polling: one immediate cycle per feed, then one per interval.
    ///
    /// Calling `start` while already running stops the previous generation
    /// first, so there is never more than one polling loop per feed.
    pub fn start(&mut self) {
        self.stop();

        let active = Arc::new(AtomicBool::new(true));
        self.active = Arc::clone(&active);

        for feed in &self.feeds {
            let feed = Arc::clone(feed);
            let fetcher = Arc::clone(&self.fetcher);
            let on_error = Arc::clone(&self.on_error);
            let active = Arc::clone(&active);
            let interval = self.interval;

            let task = self.handle.spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // A cycle slower than the interval should not queue a burst
                // of catch-up ticks behind it.
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    // The first tick resolves immediately.
                    ticker.tick().await;
                    run_cycle(&feed, fetcher.as_ref(), &active, &on_error).await;
                }
            });
            self.tasks.push(task);
        }
    }

    /// Cancel every polling task. Safe to call when already stopped.
    ///
    /// `start` can be called again afterwards. An in-flight `refresh_one`
    /// fetch is not interrupted, but its result will be discarded.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Run one out-of-band cycle for `key`, independent of its timer.
    ///
    /// An unknown key is logged and ignored rather than treated as an error —
    /// a stale keybinding must not take the dashboard down. Note that a
    /// refresh racing a timer cycle for the same key can deliver results out
    /// of order (see the module docs).
    pub fn refresh_one(&self, key: &str) {
        if !self.is_running() {
            debug!(key, "refresh ignored while updates are stopped");
            return;
        }
        let Some(feed) = self.feeds.iter().find(|f| f.key == key) else {
            warn!(key, "refresh requested for unregistered feed");
            return;
        };

        let feed = Arc::clone(feed);
        let fetcher = Arc::clone(&self.fetcher);
        let on_error = Arc::clone(&self.on_error);
        let active = Arc::clone(&self.active);
        self.handle.spawn(async move {
            run_cycle(&feed, fetcher.as_ref(), &active, &on_error).await;
        });
    }
}

impl Drop for UpdateCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One fetch-and-dispatch attempt for a single feed.
async fn run_cycle(
    feed: &Feed,
    fetcher: &dyn JsonFetcher,
    active: &AtomicBool,
    on_error: &ErrorCallback,
) {
    let _loading = LoadingGuard::engage(feed.loading.clone());

    match fetcher.fetch_json(&feed.endpoint).await {
        Ok(payload) => {
            // A response that lands after stop() (or after a restart) belongs
            // to a dead generation and must not reach the callback.
            if active.load(Ordering::SeqCst) {
                (feed.on_data)(payload);
            } else {
                debug!(key = feed.key.as_str(), "discarding response fetched after stop");
            }
        }
        Err(err) => {
            warn!(key = feed.key.as_str(), error = %err, "update cycle failed");
            if active.load(Ordering::SeqCst) {
                on_error(&feed.key, &err);
            }
        }
    }
    // `_loading` drops here: the indicator clears on every exit path.
}
