//! Polling loop
//!
//! `Resolving -> Sampling -> (Fatal)`: requests are resolved once, then
//! every tick samples the bound queries, renders them and appends one log
//! row. Only resolution, log creation and log writes are fatal; a query
//! that cannot be read shows "No response" for that tick.

use std::io::Write;
use std::time::Duration;

use chrono::{Local, NaiveTime};
use obd_core::{CoreResult, ObdDevice, VehicleDefinition};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::logger::TelemetryLogger;
use crate::render::{read_bound, DisplayContext, CLEAR_SCREEN};
use crate::resolver::{resolve, ResolvedQueries};

/// Default pause between ticks
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1000);

/// First log column
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Source of tick timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Result of one tick
#[derive(Debug, Clone)]
pub struct Tick {
    pub time: NaiveTime,
    /// Rendered display lines, in resolution order
    pub lines: Vec<String>,
    /// Logged values, one per bound query
    pub samples: Vec<f64>,
}

/// Log column names for a resolved set: `timestamp` then each label
pub fn column_names(queries: &ResolvedQueries) -> Vec<String> {
    std::iter::once(TIMESTAMP_COLUMN.to_string())
        .chain(queries.labels())
        .collect()
}

/// Drives sampling of resolved queries into a telemetry log
pub struct Poller<L: Write> {
    queries: ResolvedQueries,
    context: DisplayContext,
    logger: TelemetryLogger<L>,
    clock: Box<dyn Clock>,
    display: Option<Box<dyn Write + Send>>,
    interval: Duration,
}

impl<L: Write> Poller<L> {
    pub fn new(queries: ResolvedQueries, logger: TelemetryLogger<L>) -> Self {
        let context = DisplayContext::new(queries.labels());
        Self {
            queries,
            context,
            logger,
            clock: Box::new(SystemClock),
            display: None,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Render each tick to `display` (typically stdout)
    pub fn with_display(mut self, display: Box<dyn Write + Send>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn queries(&self) -> &ResolvedQueries {
        &self.queries
    }

    pub fn logger(&self) -> &TelemetryLogger<L> {
        &self.logger
    }

    pub fn into_logger(self) -> TelemetryLogger<L> {
        self.logger
    }

    /// Read every bound query's last known state
    pub fn sample(&self) -> Tick {
        let time = self.clock.now();
        let mut lines = Vec::with_capacity(self.queries.len());
        let mut samples = Vec::with_capacity(self.queries.len());

        for bound in &self.queries {
            let reading = read_bound(bound);
            lines.push(self.context.line(&bound.label(), &reading.text));
            samples.push(reading.sample);
        }

        Tick {
            time,
            lines,
            samples,
        }
    }

    /// One iteration: sample, render, append a row
    pub fn tick(&mut self) -> CoreResult<Tick> {
        let tick = self.sample();
        self.render(&tick);
        self.logger.write_row_at(tick.time, &tick.samples)?;
        Ok(tick)
    }

    fn render(&mut self, tick: &Tick) {
        let Some(display) = self.display.as_mut() else {
            return;
        };

        let mut frame = String::from(CLEAR_SCREEN);
        for line in &tick.lines {
            frame.push_str(line);
            frame.push('\n');
        }

        if let Err(e) = display
            .write_all(frame.as_bytes())
            .and_then(|_| display.flush())
        {
            debug!(error = %e, "Display write failed");
        }
    }

    /// Tick until cancelled. Cancellation is observed at tick boundaries
    /// and during the pause; the log is flushed before returning the
    /// number of ticks run.
    pub async fn run(&mut self, cancel: CancellationToken) -> CoreResult<u64> {
        let mut ticks = 0u64;
        info!(
            queries = self.queries.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Sampling started"
        );

        while !cancel.is_cancelled() {
            self.tick()?;
            ticks += 1;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.logger.flush()?;
        info!(ticks, "Sampling stopped");
        Ok(ticks)
    }
}

/// Options for [`run_logging`]
pub struct LoggingOptions {
    pub interval: Duration,
    pub clock: Box<dyn Clock>,
    pub display: Option<Box<dyn Write + Send>>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            clock: Box::new(SystemClock),
            display: None,
        }
    }
}

/// Resolve, open the log for the resolved columns, then sample until
/// cancelled.
///
/// A resolution failure returns before the log is opened and before any
/// sampling.
pub async fn run_logging<L, F>(
    device: &dyn ObdDevice,
    vehicle: &VehicleDefinition,
    open_log: F,
    options: LoggingOptions,
    cancel: CancellationToken,
) -> CoreResult<u64>
where
    L: Write,
    F: FnOnce(&[String]) -> CoreResult<TelemetryLogger<L>>,
{
    let queries = resolve(device, vehicle).await?;
    let logger = open_log(&column_names(&queries))?;

    device.set_refresh_interval(options.interval);

    let mut poller = Poller::new(queries, logger).with_interval(options.interval);
    poller.clock = options.clock;
    poller.display = options.display;

    poller.run(cancel).await
}
