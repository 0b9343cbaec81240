//! Live query manager
//!
//! Owns one background task that re-reads every bound query on a fixed
//! cadence and stores the latest response. Readers only see the stored
//! state and never wait on the device.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use obd_core::{CoreResult, LiveQuery};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::formula::Formula;
use crate::obd::ObdService;

/// Latest state of one query
#[derive(Debug, Clone)]
struct Sample {
    raw: Vec<u8>,
    value: f64,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            raw: Vec::new(),
            value: f64::NAN,
        }
    }
}

/// A bound query. Refreshed by the manager until the last handle is dropped.
#[derive(Debug)]
pub struct LiveQueryHandle {
    module: u32,
    service: u8,
    pid: u16,
    formula: Option<Formula>,
    latest: RwLock<Sample>,
}

impl LiveQueryHandle {
    fn new(module: u32, service: u8, pid: u16, formula: Option<&str>) -> Self {
        Self {
            module,
            service,
            pid,
            formula: formula
                .filter(|f| !f.trim().is_empty())
                .map(Formula::parse),
            latest: RwLock::new(Sample::default()),
        }
    }

    pub fn module(&self) -> u32 {
        self.module
    }

    pub fn service(&self) -> u8 {
        self.service
    }

    pub fn pid(&self) -> u16 {
        self.pid
    }

    fn store(&self, raw: Vec<u8>) {
        let value = match &self.formula {
            Some(formula) => formula.evaluate(&raw),
            None => f64::NAN,
        };
        *self.latest.write() = Sample { raw, value };
    }

    fn clear(&self) {
        *self.latest.write() = Sample::default();
    }
}

impl LiveQuery for LiveQueryHandle {
    fn current_raw(&self) -> CoreResult<Vec<u8>> {
        Ok(self.latest.read().raw.clone())
    }

    fn current_value(&self) -> CoreResult<f64> {
        Ok(self.latest.read().value)
    }

    fn formula(&self) -> Option<&str> {
        self.formula.as_ref().map(Formula::source)
    }
}

type Registry = Arc<RwLock<Vec<Weak<LiveQueryHandle>>>>;

/// Manages the background refresh of live queries
pub struct LiveQueryManager {
    service: ObdService,
    queries: Registry,
    refresh_ms: Arc<AtomicU64>,
    /// Background refresh task handle
    refresh_handle: RwLock<Option<JoinHandle<()>>>,
}

impl LiveQueryManager {
    /// Create the manager and start its refresh task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(service: ObdService, refresh_interval: Duration) -> Self {
        let manager = Self {
            service,
            queries: Arc::new(RwLock::new(Vec::new())),
            refresh_ms: Arc::new(AtomicU64::new(duration_ms(refresh_interval))),
            refresh_handle: RwLock::new(None),
        };

        manager.start_refresh();

        manager
    }

    /// Register a query for continuous refresh. Performs no I/O.
    pub fn bind(
        &self,
        module: u32,
        service: u8,
        pid: u16,
        formula: Option<&str>,
    ) -> Arc<LiveQueryHandle> {
        let handle = Arc::new(LiveQueryHandle::new(module, service, pid, formula));
        self.queries.write().push(Arc::downgrade(&handle));

        debug!(
            module = %format!("{:03X}", module),
            service = %format!("{:02X}", service),
            pid = %format!("{:02X}", pid),
            "Live query bound"
        );

        handle
    }

    /// Number of queries still alive
    pub fn active_count(&self) -> usize {
        self.queries
            .read()
            .iter()
            .filter(|q| q.strong_count() > 0)
            .count()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.load(Ordering::SeqCst))
    }

    /// Change the cadence; takes effect after the current pause
    pub fn set_refresh_interval(&self, interval: Duration) {
        self.refresh_ms
            .store(duration_ms(interval), Ordering::SeqCst);
        debug!(refresh_ms = duration_ms(interval), "Live query refresh interval changed");
    }

    /// Refresh every live query once, in bind order
    pub async fn refresh_now(&self) {
        Self::refresh_all(&self.service, &self.queries).await;
    }

    async fn refresh_all(service: &ObdService, queries: &Registry) {
        let live: Vec<Arc<LiveQueryHandle>> = {
            let mut guard = queries.write();
            guard.retain(|q| q.strong_count() > 0);
            guard.iter().filter_map(Weak::upgrade).collect()
        };

        for query in live {
            match service.read(query.module, query.service, query.pid).await {
                Ok(data) => query.store(data),
                Err(e) => {
                    debug!(
                        module = %format!("{:03X}", query.module),
                        service = %format!("{:02X}", query.service),
                        pid = %format!("{:02X}", query.pid),
                        error = %e,
                        "Live query read failed"
                    );
                    query.clear();
                }
            }
        }
    }

    fn start_refresh(&self) {
        let service = self.service.clone();
        let queries = self.queries.clone();
        let refresh_ms = self.refresh_ms.clone();

        let handle = tokio::spawn(async move {
            info!("Live query refresh started");
            loop {
                Self::refresh_all(&service, &queries).await;
                let pause = Duration::from_millis(refresh_ms.load(Ordering::SeqCst));
                tokio::time::sleep(pause).await;
            }
        });

        *self.refresh_handle.write() = Some(handle);
    }
}

impl Drop for LiveQueryManager {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_handle.write().take() {
            handle.abort();
            info!("Live query refresh stopped");
        }
    }
}

fn duration_ms(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}
