//! Head-banded acceptable flow envelopes.
//!
//! Each row covers the half-open head interval `(head_band - 1, head_band]`.
//! Gaps between bands are allowed and mean "no band" for heads in them.

use std::collections::HashSet;

use pump_config::reference;

use crate::error::{BuildError, Result};

/// One row of the envelope table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub head_band: u32,
    pub min_flow: f64,
    pub max_flow: f64,
}

impl Envelope {
    pub const fn new(head_band: u32, min_flow: f64, max_flow: f64) -> Self {
        Self {
            head_band,
            min_flow,
            max_flow,
        }
    }

    /// Inclusive bounds check. NaN flow is never contained.
    #[inline]
    pub fn contains(&self, flow: f64) -> bool {
        self.min_flow <= flow && flow <= self.max_flow
    }

    fn check(&self) -> std::result::Result<(), BuildError> {
        if self.head_band == 0 {
            return Err(BuildError::ZeroHeadBand);
        }
        if !(self.min_flow.is_finite() && self.max_flow.is_finite()) {
            return Err(BuildError::NonFiniteBound(self.head_band));
        }
        if self.min_flow > self.max_flow {
            return Err(BuildError::InvertedRange {
                head_band: self.head_band,
                min_flow: self.min_flow,
                max_flow: self.max_flow,
            });
        }
        Ok(())
    }
}

/// Band identifier a head value falls into: `ceil(head)`.
///
/// Returns `None` for non-finite heads, heads `<= 0`, and heads whose ceiling
/// does not fit a `u32`.
#[inline]
pub fn band_for_head(head: f64) -> Option<u32> {
    if !head.is_finite() || head <= 0.0 {
        return None;
    }
    let band = head.ceil();
    if band > f64::from(u32::MAX) {
        return None;
    }
    // Exact: band is integral and within u32 range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let band = band as u32;
    Some(band)
}

/// Ordered collection of envelope rows with unique head bands.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeTable {
    rows: Vec<Envelope>,
}

impl EnvelopeTable {
    /// Validate and wrap rows, preserving their order.
    pub fn new(rows: Vec<Envelope>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            row.check().map_err(eyre::Report::new)?;
            if !seen.insert(row.head_band) {
                return Err(eyre::Report::new(BuildError::DuplicateHeadBand(
                    row.head_band,
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn builder() -> EnvelopeTableBuilder {
        EnvelopeTableBuilder::default()
    }

    /// Seven-band table of the reference deployment.
    pub fn reference() -> Self {
        Self {
            rows: reference::BANDS
                .iter()
                .map(|&(b, lo, hi)| Envelope::new(b, lo, hi))
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Envelope] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row whose `head_band == ceil(head)`, first in table order.
    pub fn lookup(&self, head: f64) -> Option<&Envelope> {
        let band = band_for_head(head)?;
        self.rows.iter().find(|r| r.head_band == band)
    }
}

/// Incremental table construction; validation happens in `build()`.
#[derive(Debug, Default)]
pub struct EnvelopeTableBuilder {
    rows: Vec<Envelope>,
}

impl EnvelopeTableBuilder {
    pub fn band(mut self, head_band: u32, min_flow: f64, max_flow: f64) -> Self {
        self.rows.push(Envelope::new(head_band, min_flow, max_flow));
        self
    }

    pub fn build(self) -> Result<EnvelopeTable> {
        EnvelopeTable::new(self.rows)
    }
}
