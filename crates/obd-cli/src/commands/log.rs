//! Log command - sample live requests to the terminal and a CSV file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use obd_core::{CoreResult, ObdDevice, RequestDefinition, VehicleDefinition};
use obd_telemetry::{run_logging, CancellationToken, LoggingOptions, TelemetryLogger};

use crate::config::MergedConfig;
use crate::output::OutputContext;

/// Assemble the requests to log from a vehicle file and `--request` specs.
///
/// File requests come first, in file order.
pub fn build_vehicle(file: Option<&Path>, specs: &[String]) -> Result<VehicleDefinition> {
    let mut vehicle = match file {
        Some(path) => VehicleDefinition::load(path).context("Cannot load vehicle file")?,
        None => VehicleDefinition::new(),
    };

    for spec in specs {
        let request = RequestDefinition::parse_spec(spec).context("Invalid request")?;
        vehicle.add_request(request);
    }
    Ok(vehicle)
}

/// Poll until Ctrl+C, rendering each tick and appending it to the log
pub async fn log(
    device: &dyn ObdDevice,
    vehicle: &VehicleDefinition,
    output: Option<&Path>,
    merged: &MergedConfig,
    ctx: &OutputContext,
) -> Result<()> {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    ctrlc::set_handler(move || token.cancel()).context("Cannot install Ctrl+C handler")?;

    let mut log_path: Option<PathBuf> = None;
    let open_log = |columns: &[String]| -> CoreResult<TelemetryLogger<BufWriter<File>>> {
        let logger = match output {
            Some(path) => TelemetryLogger::create(path, columns)?,
            None => TelemetryLogger::open_in(&merged.log_dir, columns)?,
        };
        log_path = logger.path().map(Path::to_path_buf);
        Ok(logger)
    };

    let display: Option<Box<dyn Write + Send>> = if ctx.quiet {
        None
    } else {
        Some(Box::new(std::io::stdout()))
    };

    let options = LoggingOptions {
        interval: merged.refresh,
        display,
        ..Default::default()
    };

    let rows = run_logging(device, vehicle, open_log, options, cancel)
        .await
        .context("Logging failed")?;

    if let Some(path) = log_path {
        ctx.success(&format!("Wrote {} row(s) to {}", rows, path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_vehicle_from_specs() {
        let specs = vec![
            "7E0:01:0C:(256*A+B)/4:rpm".to_string(),
            "7E0:01:0D".to_string(),
        ];
        let vehicle = build_vehicle(None, &specs).unwrap();

        let labels: Vec<String> = vehicle.requests().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["7E0:01:0C", "7E0:01:0D"]);
        assert_eq!(vehicle.requests().next().unwrap().unit, "rpm");
    }

    #[test]
    fn test_build_vehicle_file_requests_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("car.json");
        let mut file_vehicle = VehicleDefinition::with_make_model("Mazda", "MX-5");
        file_vehicle.add_request(RequestDefinition::new(0x7E0, 0x01, 0x05).with_name("Coolant"));
        file_vehicle.save(&path).unwrap();

        let vehicle = build_vehicle(Some(path.as_path()), &["7E1:01:01".to_string()]).unwrap();
        let labels: Vec<String> = vehicle.requests().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["Coolant", "7E1:01:01"]);
        assert_eq!(vehicle.make(), "Mazda");
    }

    #[test]
    fn test_build_vehicle_bad_spec() {
        let err = build_vehicle(None, &["7E0:zz:0C".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid request"));
    }

    #[test]
    fn test_build_vehicle_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.json");
        let err = build_vehicle(Some(path.as_path()), &[]).unwrap_err();
        assert!(err.to_string().contains("Cannot load vehicle file"));
    }
}
