//! Memory Guardian
//!
//! Background task that samples process memory and adapts eviction pressure on
//! every registered store.
//!
//! Per tick, depending on usage relative to the configured budget:
//! - below the soft limit, expired entries are swept;
//! - between soft and hard limits, each store is cut down to a quarter of its
//!   size by LRU eviction;
//! - at or above the hard limit, every store is cleared.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::registry::CacheRegistry;
use crate::tasks::{MemoryProbe, ProcessMemoryProbe};

/// Fraction of the budget at which graduated eviction starts.
pub const SOFT_LIMIT_RATIO: f64 = 0.80;
/// Fraction of the budget at which every store is cleared.
pub const HARD_LIMIT_RATIO: f64 = 0.90;
/// Share of its pre-tick size a store keeps under soft pressure.
pub const SOFT_RETAIN_RATIO: f64 = 0.25;

/// Shortest interval the tick loop accepts.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Hook asked to give memory back after a hard-limit clear.
pub type ReclaimHook = Arc<dyn Fn() + Send + Sync>;

// == Pressure Level ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    /// Below the soft limit, or usage unknown
    Normal,
    /// Between soft and hard limits
    Elevated,
    /// At or above the hard limit
    Critical,
}

// == Guardian Config ==
#[derive(Clone)]
pub struct GuardianConfig {
    /// Memory budget usage is measured against
    pub budget_bytes: u64,
    pub soft_ratio: f64,
    pub hard_ratio: f64,
    pub reclaim: Option<ReclaimHook>,
}

impl GuardianConfig {
    pub fn new(budget_bytes: u64) -> Self {
        Self {
            budget_bytes,
            soft_ratio: SOFT_LIMIT_RATIO,
            hard_ratio: HARD_LIMIT_RATIO,
            reclaim: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.memory_budget_bytes())
    }

    pub fn with_reclaim_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.reclaim = Some(Arc::new(hook));
        self
    }

    /// Usage as a fraction of the budget.
    pub fn ratio(&self, used_bytes: u64) -> Option<f64> {
        if self.budget_bytes == 0 {
            None
        } else {
            Some(used_bytes as f64 / self.budget_bytes as f64)
        }
    }

    pub fn level(&self, ratio: Option<f64>) -> PressureLevel {
        match ratio {
            Some(r) if r >= self.hard_ratio => PressureLevel::Critical,
            Some(r) if r >= self.soft_ratio => PressureLevel::Elevated,
            _ => PressureLevel::Normal,
        }
    }
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// == Reports ==
/// Outcome of one guardian tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub level: PressureLevel,
    /// Usage over budget, if it could be measured
    pub ratio: Option<f64>,
    /// Entries removed per store
    pub removed: Vec<(String, usize)>,
}

impl TickReport {
    pub fn total_removed(&self) -> usize {
        self.removed.iter().map(|(_, count)| count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardianState {
    Stopped,
    Running,
}

/// Snapshot of the guardian for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct GuardianStatus {
    pub state: GuardianState,
    pub ticks: u64,
    pub last_level: Option<PressureLevel>,
    pub last_ratio: Option<f64>,
    pub last_tick_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct TickHistory {
    ticks: u64,
    last_level: Option<PressureLevel>,
    last_ratio: Option<f64>,
    last_tick_at: Option<DateTime<Utc>>,
}

/// State shared between the guardian handle and its background task.
struct Inner {
    config: GuardianConfig,
    probe: Arc<dyn MemoryProbe>,
    history: Mutex<TickHistory>,
}

impl Inner {
    fn history(&self) -> MutexGuard<'_, TickHistory> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn tick(&self, registry: &CacheRegistry) -> TickReport {
        let ratio = match self.probe.used_bytes() {
            Some(used) => self.config.ratio(used),
            None => {
                debug!("Memory usage unavailable, treating as normal pressure");
                None
            }
        };
        let level = self.config.level(ratio);

        let removed = match level {
            PressureLevel::Normal => registry.cleanup_all().await,
            PressureLevel::Elevated => shrink_all(registry, SOFT_RETAIN_RATIO).await,
            PressureLevel::Critical => {
                let removed = registry.clear_all().await;
                match &self.config.reclaim {
                    Some(reclaim) => reclaim(),
                    None => debug!("No memory reclamation hook configured"),
                }
                removed
            }
        };

        let report = TickReport {
            level,
            ratio,
            removed,
        };
        log_report(&report);

        let mut history = self.history();
        history.ticks += 1;
        history.last_level = Some(level);
        history.last_ratio = ratio;
        history.last_tick_at = Some(Utc::now());

        report
    }
}

// == Memory Guardian ==
/// Explicit lifecycle object for the background pressure task.
///
/// Creating a guardian does nothing on its own; work begins at `start` and ends
/// at `stop` or when the guardian is dropped.
pub struct MemoryGuardian {
    inner: Arc<Inner>,
    handle: Option<JoinHandle<()>>,
}

impl MemoryGuardian {
    /// Guardian sampling this process's resident memory.
    pub fn new(config: GuardianConfig) -> Self {
        Self::with_probe(config, Arc::new(ProcessMemoryProbe::new()))
    }

    pub fn with_probe(config: GuardianConfig, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                probe,
                history: Mutex::new(TickHistory::default()),
            }),
            handle: None,
        }
    }

    // == Start ==
    /// Spawns the tick loop. Returns false if already running or if there is no
    /// Tokio runtime to spawn on.
    ///
    /// Ticks run one after another in a single task, so they never overlap.
    /// Intervals below `MIN_TICK_INTERVAL` are raised to it.
    pub fn start(&mut self, registry: Arc<CacheRegistry>, interval: Duration) -> bool {
        if self.is_running() {
            debug!("Memory guardian already running");
            return false;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "Cannot start memory guardian outside a Tokio runtime");
                return false;
            }
        };

        if interval < MIN_TICK_INTERVAL {
            warn!("Memory guardian interval must be positive, using 1ms");
        }
        let interval = interval.max(MIN_TICK_INTERVAL);

        let inner = self.inner.clone();
        self.handle = Some(runtime.spawn(async move {
            info!(
                "Starting memory guardian with interval of {}ms over {} stores",
                interval.as_millis(),
                registry.len()
            );

            loop {
                tokio::time::sleep(interval).await;
                inner.tick(&registry).await;
            }
        }));

        true
    }

    // == Stop ==
    /// Cancels the tick loop, including a tick waiting to fire.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Memory guardian stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Run Tick ==
    /// Runs one tick immediately against `registry`.
    pub async fn run_tick(&self, registry: &CacheRegistry) -> TickReport {
        self.inner.tick(registry).await
    }

    pub fn config(&self) -> &GuardianConfig {
        &self.inner.config
    }

    pub fn status(&self) -> GuardianStatus {
        let history = self.inner.history();
        GuardianStatus {
            state: if self.is_running() {
                GuardianState::Running
            } else {
                GuardianState::Stopped
            },
            ticks: history.ticks,
            last_level: history.last_level,
            last_ratio: history.last_ratio,
            last_tick_at: history.last_tick_at,
        }
    }
}

impl Drop for MemoryGuardian {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// == Pressure Responses ==
/// Evicts least recently used entries until each store is down to
/// `ceil(retain * pre-tick size)`.
async fn shrink_all(registry: &CacheRegistry, retain: f64) -> Vec<(String, usize)> {
    let mut removed = Vec::with_capacity(registry.len());

    for registered in registry.iter() {
        let mut store = registered.store.write().await;
        let before = store.size();
        let target = (before as f64 * retain).ceil() as usize;

        while store.size() > target {
            if store.evict_lru().is_none() {
                break;
            }
        }

        removed.push((registered.name.clone(), before - store.size()));
    }

    removed
}

fn log_report(report: &TickReport) {
    let ratio = report.ratio.map(|r| format!("{:.1}%", r * 100.0));
    let ratio = ratio.as_deref().unwrap_or("unknown");

    match report.level {
        PressureLevel::Normal => {
            if report.total_removed() > 0 {
                info!(
                    "Memory guardian: usage {}, removed {} expired entries {:?}",
                    ratio,
                    report.total_removed(),
                    report.removed
                );
            } else {
                debug!("Memory guardian: usage {}, no expired entries found", ratio);
            }
        }
        PressureLevel::Elevated => warn!(
            "Memory guardian: usage {} above soft limit, evicted {} entries {:?}",
            ratio,
            report.total_removed(),
            report.removed
        ),
        PressureLevel::Critical => warn!(
            "Memory guardian: usage {} above hard limit, cleared {} entries {:?}",
            ratio,
            report.total_removed(),
            report.removed
        ),
    }
}
