//! Value formulas over response bytes
//!
//! A formula is an arithmetic expression where `A` is the first data byte
//! of the response, `B` the second, and so on up to `Z`. Evaluation is in
//! floating point, so `(256*A+B)/4` keeps its fraction.

use evalexpr::{build_operator_tree, ContextWithMutableVariables, HashMapContext, Node, Value};

const BYTE_NAMES: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A parsed formula, reusable across evaluations
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    tree: Option<Node>,
}

impl Formula {
    /// Parse a formula. An expression that fails to parse is kept and
    /// evaluates to NaN.
    pub fn parse(source: &str) -> Self {
        let tree = match build_operator_tree(source) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!(formula = source, error = %e, "Invalid formula");
                None
            }
        };

        Self {
            source: source.to_string(),
            tree,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against response data bytes; NaN when the expression
    /// cannot be resolved (parse error, missing byte, non-numeric result)
    pub fn evaluate(&self, data: &[u8]) -> f64 {
        let Some(tree) = &self.tree else {
            return f64::NAN;
        };

        let mut ctx = HashMapContext::new();
        for (name, byte) in BYTE_NAMES.chars().zip(data) {
            if ctx
                .set_value(name.to_string(), Value::Float(f64::from(*byte)))
                .is_err()
            {
                return f64::NAN;
            }
        }

        match tree.eval_with_context(&ctx) {
            Ok(Value::Float(v)) => v,
            Ok(Value::Int(v)) => v as f64,
            Ok(Value::Boolean(v)) => f64::from(u8::from(v)),
            Ok(_) => f64::NAN,
            Err(e) => {
                tracing::trace!(formula = %self.source, error = %e, "Formula unresolved");
                f64::NAN
            }
        }
    }
}
