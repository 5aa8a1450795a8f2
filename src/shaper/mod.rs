//! Time-series reading shaper.
//!
//! Two pure steps run on every chart fetch:
//! - [`fill_gaps`] regularizes the raw reading sequence at a fixed cadence
//! - [`build_chart`] turns the regular sequence and a [`Selection`] into
//!   axis-tagged series
//!
//! Neither step fails; absent fields degrade to zero (or null) values or to
//! omitted series.
//!
//! [`Selection`]: crate::models::Selection

use std::{fmt, str::FromStr};

mod gap_fill;
mod series;

pub use gap_fill::{fill_gaps, GapFillConfig};
pub use series::build_chart;

/// What a series carries for a row that does not define its field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AbsentPolicy {
    /// Plot a zero, matching the zero rows inserted by gap filling.
    #[default]
    Zero,
    /// Emit `null` so the renderer leaves a gap.
    Null,
}

impl AbsentPolicy {
    pub(crate) fn apply(self, value: Option<f64>) -> Option<f64> {
        match self {
            AbsentPolicy::Zero => Some(value.unwrap_or(0.0)),
            AbsentPolicy::Null => value,
        }
    }
}

impl FromStr for AbsentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(AbsentPolicy::Zero),
            "null" => Ok(AbsentPolicy::Null),
            other => Err(format!("expected `zero` or `null`, got `{other}`")),
        }
    }
}

impl fmt::Display for AbsentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsentPolicy::Zero => f.write_str("zero"),
            AbsentPolicy::Null => f.write_str("null"),
        }
    }
}
