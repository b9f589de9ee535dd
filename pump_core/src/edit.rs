//! Manual operating-point edits coming from host input widgets.

use std::str::FromStr;

use pump_traits::OperatingPoint;

use crate::error::MonitorError;

/// The editable field of an operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Head,
    Flow,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Flow => "flow",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" => Ok(Self::Head),
            "flow" => Ok(Self::Flow),
            _ => Err(MonitorError::UnknownField(s.to_string())),
        }
    }
}

/// A single-field override with an already coerced value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualEdit {
    pub field: Field,
    pub value: f64,
}

impl ManualEdit {
    pub const fn new(field: Field, value: f64) -> Self {
        Self { field, value }
    }

    /// Coerce a raw `(name, value)` pair.
    ///
    /// The value is trimmed and must parse to a finite number; empty input,
    /// `NaN` and infinities are rejected.
    pub fn parse(field: &str, raw: &str) -> Result<Self, MonitorError> {
        Self::for_field(field.parse()?, raw)
    }

    /// Coerce a raw value for an already known field.
    pub fn for_field(field: Field, raw: &str) -> Result<Self, MonitorError> {
        let value = coerce(raw).ok_or_else(|| MonitorError::InvalidInput {
            field,
            raw: raw.to_string(),
        })?;
        Ok(Self { field, value })
    }

    /// Copy of `point` with the edited field replaced.
    pub fn apply(&self, point: OperatingPoint) -> OperatingPoint {
        match self.field {
            Field::Head => OperatingPoint {
                head: self.value,
                ..point
            },
            Field::Flow => OperatingPoint {
                flow: self.value,
                ..point
            },
        }
    }
}

fn coerce(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
