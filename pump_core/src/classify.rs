//! Head→band classification of an operating point.

use pump_traits::OperatingPoint;
use serde::Serialize;

use crate::envelope::EnvelopeTable;

/// Outcome of classifying a point against the envelope table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    InBand,
    OutOfBand,
}

impl Classification {
    #[inline]
    pub fn is_in_band(self) -> bool {
        matches!(self, Self::InBand)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InBand => "in_band",
            Self::OutOfBand => "out_of_band",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `point` against `table`.
///
/// A head with no matching band is `OutOfBand`; so is any flow outside the
/// inclusive `[min_flow, max_flow]` of the matched band.
pub fn classify(point: &OperatingPoint, table: &EnvelopeTable) -> Classification {
    match table.lookup(point.head) {
        Some(row) if row.contains(point.flow) => Classification::InBand,
        _ => Classification::OutOfBand,
    }
}
