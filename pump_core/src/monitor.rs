//! Single-pump monitor state: the current point and its classification.
//!
//! Every update replaces the whole [`Reading`], so `classification` always
//! matches `point` for any observer.

use std::sync::Arc;

use pump_traits::OperatingPoint;
use serde::Serialize;

use crate::classify::{Classification, classify};
use crate::edit::ManualEdit;
use crate::envelope::EnvelopeTable;
use crate::error::Result;

/// What produced the published reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Initial,
    Sampled,
    Override,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Initial => "initial",
            Origin::Sampled => "sampled",
            Origin::Override => "override",
        }
    }
}

/// A classified operating point as published to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub point: OperatingPoint,
    pub classification: Classification,
    /// Increases by one on every publication; the initial reading is 0.
    pub seq: u64,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
pub struct Monitor {
    table: Arc<EnvelopeTable>,
    current: Reading,
}

impl Monitor {
    pub fn new(table: Arc<EnvelopeTable>, initial: OperatingPoint) -> Self {
        let classification = classify(&initial, &table);
        Self {
            table,
            current: Reading {
                point: initial,
                classification,
                seq: 0,
                origin: Origin::Initial,
            },
        }
    }

    pub fn table(&self) -> &EnvelopeTable {
        &self.table
    }

    pub fn current(&self) -> Reading {
        self.current
    }

    /// Classify `point` and make it the current reading.
    pub fn publish(&mut self, point: OperatingPoint, origin: Origin) -> Reading {
        let reading = Reading {
            point,
            classification: classify(&point, &self.table),
            seq: self.current.seq.wrapping_add(1),
            origin,
        };
        self.current = reading;
        reading
    }

    /// Apply a coerced edit to a copy of the current point and publish it.
    pub fn apply_edit(&mut self, edit: ManualEdit) -> Reading {
        let point = edit.apply(self.current.point);
        let reading = self.publish(point, Origin::Override);
        tracing::info!(
            field = %edit.field,
            value = edit.value,
            classification = %reading.classification,
            seq = reading.seq,
            "manual override applied"
        );
        reading
    }

    /// Coerce a raw edit and apply it. On rejection the current reading is
    /// left untouched and the typed error is returned.
    pub fn apply_raw(&mut self, field: &str, raw: &str) -> Result<Reading> {
        match ManualEdit::parse(field, raw) {
            Ok(edit) => Ok(self.apply_edit(edit)),
            Err(e) => {
                tracing::warn!(field, raw, error = %e, "manual override rejected");
                Err(eyre::Report::new(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Arc<EnvelopeTable> {
        Arc::new(
            EnvelopeTable::builder()
                .band(1, 25.0, 30.0)
                .band(3, 15.0, 28.0)
                .band(6, 0.0, 10.0)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn initial_reading_is_classified() {
        let m = Monitor::new(table(), OperatingPoint::new(31.0, 40.0));
        let r = m.current();
        assert_eq!(r.seq, 0);
        assert_eq!(r.origin, Origin::Initial);
        assert_eq!(r.classification, Classification::OutOfBand);
    }

    #[test]
    fn publish_bumps_seq_and_reclassifies() {
        let mut m = Monitor::new(table(), OperatingPoint::new(31.0, 40.0));
        let r = m.publish(OperatingPoint::new(0.9, 27.0), Origin::Sampled);
        assert_eq!(r.seq, 1);
        assert_eq!(r.classification, Classification::InBand);
        assert_eq!(m.current(), r);
    }
}
