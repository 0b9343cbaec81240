//! obd-telemetry - Live polling and logging of vehicle requests
//!
//! The pipeline resolves a vehicle definition against a device once,
//! then samples the bound live queries on a fixed cadence, rendering each
//! tick and appending it to a CSV telemetry log.
//!
//! ```text
//! VehicleDefinition -> resolve() -> ResolvedQueries -> Poller::tick()
//!                                                        |-> display
//!                                                        '-> TelemetryLogger
//! ```

pub mod logger;
pub mod poller;
pub mod render;
pub mod resolver;
pub mod trouble_codes;

pub use logger::{default_file_name, TelemetryLogger, TIME_FORMAT};
pub use poller::{
    column_names, run_logging, Clock, LoggingOptions, Poller, SystemClock, Tick,
    DEFAULT_REFRESH_INTERVAL, TIMESTAMP_COLUMN,
};
pub use render::{format_raw, read_query, DisplayContext, Reading, CLEAR_SCREEN, NO_RESPONSE};
pub use resolver::{resolve, BoundQuery, ResolvedQueries};
pub use trouble_codes::{clear_trouble_codes, collect_trouble_codes, ModuleTroubleCodes};

pub use tokio_util::sync::CancellationToken;
