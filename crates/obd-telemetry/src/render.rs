//! Rendering of bound queries for the interactive display

use obd_core::LiveQuery;

use crate::resolver::BoundQuery;

/// Shown when a query has no usable value
pub const NO_RESPONSE: &str = "No response";

/// Clear the terminal and home the cursor
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

/// One sampled query: what to show and what to log
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub text: String,
    /// Logged value; NaN for raw-only queries and missing responses
    pub sample: f64,
}

impl Reading {
    fn no_response() -> Self {
        Self {
            text: NO_RESPONSE.to_string(),
            sample: f64::NAN,
        }
    }
}

/// Raw bytes as lowercase two-digit hex pairs separated by spaces
pub fn format_raw(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sample the last known state of a query. Read failures are folded
/// into "No response" for this query only.
pub fn read_query(query: &dyn LiveQuery, unit: &str) -> Reading {
    if query.formula().is_none() {
        return match query.current_raw() {
            Ok(raw) if !raw.is_empty() => Reading {
                text: format_raw(&raw),
                sample: f64::NAN,
            },
            Ok(_) => Reading::no_response(),
            Err(e) => {
                tracing::debug!(error = %e, "Raw read failed");
                Reading::no_response()
            }
        };
    }

    match query.current_value() {
        Ok(value) if !value.is_nan() => Reading {
            text: format!("{}{}", value, unit),
            sample: value,
        },
        Ok(_) => Reading::no_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Value read failed");
            Reading::no_response()
        }
    }
}

/// Sample a bound query using its definition's unit
pub fn read_bound(bound: &BoundQuery) -> Reading {
    read_query(bound.query().as_ref(), &bound.definition().unit)
}

/// Label alignment for display lines, fixed for the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayContext {
    label_width: usize,
}

impl DisplayContext {
    /// Compute the label column width from every label up front
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let label_width = labels
            .into_iter()
            .map(|l| l.as_ref().chars().count() + 2)
            .max()
            .unwrap_or(0);
        Self { label_width }
    }

    /// Width of `<label>: ` including the separator
    pub fn label_width(&self) -> usize {
        self.label_width
    }

    /// `<label>: <text>`, with the text column aligned
    pub fn line(&self, label: &str, text: &str) -> String {
        let prefix = format!("{}: ", label);
        format!("{:<width$}{}", prefix, text, width = self.label_width)
    }
}
