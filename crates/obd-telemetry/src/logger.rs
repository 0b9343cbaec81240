//! Telemetry logger - append-only, header-once CSV rows

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveTime, Utc};
use obd_core::{CoreError, CoreResult};
use tracing::{debug, info};

/// Timestamp column format (local wall-clock time)
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Default log file name for the current time, e.g. `obd2_log_1700000000.csv`
pub fn default_file_name() -> String {
    format!("obd2_log_{}.csv", Utc::now().timestamp())
}

/// Writes one header row and then one timestamped row per call.
///
/// The caller keeps `values.len() == columns.len() - 1`; rows are not
/// checked against the header.
pub struct TelemetryLogger<W: Write> {
    writer: W,
    path: Option<PathBuf>,
    rows: u64,
}

impl TelemetryLogger<BufWriter<File>> {
    /// Create a new log in `dir` named after the current time
    pub fn open_in(dir: impl AsRef<Path>, columns: &[String]) -> CoreResult<Self> {
        let path = dir.as_ref().join(default_file_name());
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| CoreError::file_unavailable(&path, &e))?;

        Self::with_file(file, path, columns)
    }

    /// Create a new log in the working directory named after the current time
    pub fn open(columns: &[String]) -> CoreResult<Self> {
        Self::open_in(".", columns)
    }

    /// Create (or truncate) a log at an explicit path
    pub fn create(path: impl AsRef<Path>, columns: &[String]) -> CoreResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| CoreError::file_unavailable(path, &e))?;
        Self::with_file(file, path.to_path_buf(), columns)
    }

    fn with_file(file: File, path: PathBuf, columns: &[String]) -> CoreResult<Self> {
        let mut logger = Self::from_writer(BufWriter::new(file), columns)?;
        info!(path = %path.display(), columns = columns.len(), "Telemetry log opened");
        logger.path = Some(path);
        Ok(logger)
    }
}

impl<W: Write> TelemetryLogger<W> {
    /// Wrap a writer and write the header row
    pub fn from_writer(writer: W, columns: &[String]) -> CoreResult<Self> {
        let mut logger = Self {
            writer,
            path: None,
            rows: 0,
        };
        logger.write_header(columns)?;
        Ok(logger)
    }

    fn write_header(&mut self, columns: &[String]) -> CoreResult<()> {
        let header = columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{}", header)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Append a row stamped with the current local time
    pub fn write_row(&mut self, values: &[f64]) -> CoreResult<()> {
        self.write_row_at(Local::now().time(), values)
    }

    /// Append a row stamped with `time`
    pub fn write_row_at(&mut self, time: NaiveTime, values: &[f64]) -> CoreResult<()> {
        let mut row = time.format(TIME_FORMAT).to_string();
        for value in values {
            row.push(',');
            row.push_str(&value.to_string());
        }

        writeln!(self.writer, "{}", row)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> CoreResult<()> {
        self.writer.flush()?;
        debug!(rows = self.rows, "Telemetry log flushed");
        Ok(())
    }

    /// File path, for loggers created on a file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rows written after the header
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_header_exact() {
        let logger =
            TelemetryLogger::from_writer(Vec::new(), &columns(&["timestamp", "RPM", "Speed"]))
                .unwrap();
        let out = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(out, "\"timestamp\",\"RPM\",\"Speed\"\n");
    }

    #[test]
    fn test_rows_follow_header() {
        let mut logger =
            TelemetryLogger::from_writer(Vec::new(), &columns(&["timestamp", "RPM", "Speed"]))
                .unwrap();
        logger.write_row_at(at(12, 0, 0), &[1500.0, 42.5]).unwrap();
        logger.write_row_at(at(12, 0, 1), &[f64::NAN, 0.0]).unwrap();
        assert_eq!(logger.rows_written(), 2);

        let out = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(
            out,
            "\"timestamp\",\"RPM\",\"Speed\"\n12:00:00,1500,42.5\n12:00:01,NaN,0\n"
        );
    }

    #[test]
    fn test_timestamp_only_row() {
        let mut logger =
            TelemetryLogger::from_writer(Vec::new(), &columns(&["timestamp"])).unwrap();
        logger.write_row_at(at(7, 5, 9), &[]).unwrap();
        let out = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(out, "\"timestamp\"\n07:05:09\n");
    }

    #[test]
    fn test_write_row_uses_clock_format() {
        let mut logger = TelemetryLogger::from_writer(Vec::new(), &columns(&["timestamp", "x"]))
            .unwrap();
        logger.write_row(&[1.0]).unwrap();
        let out = String::from_utf8(logger.into_inner()).unwrap();
        let row = out.lines().nth(1).unwrap();
        let (time, value) = row.split_once(',').unwrap();
        assert!(NaiveTime::parse_from_str(time, TIME_FORMAT).is_ok());
        assert_eq!(value, "1");
    }

    #[test]
    fn test_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        {
            let mut logger =
                TelemetryLogger::create(&path, &columns(&["timestamp", "RPM"])).unwrap();
            logger.write_row_at(at(1, 2, 3), &[800.0]).unwrap();
            assert_eq!(logger.path(), Some(path.as_path()));
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "\"timestamp\",\"RPM\"\n01:02:03,800\n");
    }

    #[test]
    fn test_open_in_uses_default_name() {
        let dir = TempDir::new().unwrap();
        let logger = TelemetryLogger::open_in(dir.path(), &columns(&["timestamp"])).unwrap();
        let name = logger
            .path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap()
            .to_string();
        assert!(name.starts_with("obd2_log_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_create_in_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = TelemetryLogger::create(dir.path().join("nope").join("log.csv"), &[])
            .err()
            .unwrap();
        assert_eq!(err.kind(), obd_core::ErrorKind::FileUnavailable);
    }
}
