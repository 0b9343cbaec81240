//! Output formatting for obd2 (table, json)

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a section heading (unless in quiet mode)
    pub fn heading(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.bold());
        }
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(data));
                }
            }
            OutputFormat::Json => self.print_json(data),
        }
    }

    /// Print a serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, data: &T) {
        println!(
            "{}",
            serde_json::to_string_pretty(data).unwrap_or_else(|_| "null".to_string())
        );
    }

    /// Print key-value pairs (for info command)
    pub fn print_kv(&self, pairs: &[(&str, String)]) {
        for (key, value) in pairs {
            println!("{}: {}", key.bold(), value);
        }
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Trouble code display for dtc-list
#[derive(Debug, Tabled, Serialize)]
pub struct TroubleCodeRow {
    #[tabled(rename = "Module")]
    pub module: String,
    #[tabled(rename = "Code")]
    pub code: String,
    #[tabled(rename = "Category")]
    pub category: String,
}

/// Supported PIDs display for pids
#[derive(Debug, Tabled, Serialize)]
pub struct PidRow {
    #[tabled(rename = "Module")]
    pub module: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "PIDs")]
    pub pids: String,
}

/// Request display for vehicle show
#[derive(Debug, Tabled, Serialize)]
pub struct RequestRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Formula")]
    pub formula: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Category")]
    pub category: String,
}
