//! Display-ready series for a charting surface.
//!
//! Axis convention: flow on x, head on y, for the curve, the envelope
//! boundaries and the highlighted point alike.

use pump_config::reference;
use serde::Serialize;

use crate::classify::Classification;
use crate::curve::CurveModel;
use crate::envelope::EnvelopeTable;
use crate::monitor::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axes {
    pub x: Axis,
    pub y: Axis,
}

impl Axes {
    pub fn new(flow_range: [f64; 2], head_range: [f64; 2]) -> Self {
        Self {
            x: Axis {
                label: "Flow Rate (m3/h)".to_string(),
                min: flow_range[0],
                max: flow_range[1],
            },
            y: Axis {
                label: "Head (m)".to_string(),
                min: head_range[0],
                max: head_range[1],
            },
        }
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self::new(reference::FLOW_AXIS, reference::HEAD_AXIS)
    }
}

/// Color selector per classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorMap {
    pub in_band: String,
    pub out_of_band: String,
}

impl ColorMap {
    pub fn color(&self, classification: Classification) -> &str {
        match classification {
            Classification::InBand => &self.in_band,
            Classification::OutOfBand => &self.out_of_band,
        }
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            in_band: reference::IN_BAND_COLOR.to_string(),
            out_of_band: reference::OUT_OF_BAND_COLOR.to_string(),
        }
    }
}

/// Default mapping: `InBand -> "ok"`, `OutOfBand -> "warn"`.
pub fn color(classification: Classification) -> &'static str {
    match classification {
        Classification::InBand => reference::IN_BAND_COLOR,
        Classification::OutOfBand => reference::OUT_OF_BAND_COLOR,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub x: f64,
    pub y: f64,
    pub classification: Classification,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSeries {
    /// Rated curve in curve order.
    pub curve: Vec<PlotPoint>,
    /// `(max_flow, head_band)` ordered by head band.
    pub max_envelope: Vec<PlotPoint>,
    /// `(min_flow, head_band)` ordered by head band.
    pub min_envelope: Vec<PlotPoint>,
    pub highlight: Highlight,
    pub axes: Axes,
}

pub fn render(
    curve: &CurveModel,
    table: &EnvelopeTable,
    reading: &Reading,
    colors: &ColorMap,
    axes: &Axes,
) -> RenderSeries {
    let curve = curve
        .iter()
        .map(|p| PlotPoint {
            x: p.flow,
            y: p.head,
        })
        .collect();

    let mut rows: Vec<_> = table.rows().iter().collect();
    rows.sort_by_key(|r| r.head_band);
    let max_envelope = rows
        .iter()
        .map(|r| PlotPoint {
            x: r.max_flow,
            y: f64::from(r.head_band),
        })
        .collect();
    let min_envelope = rows
        .iter()
        .map(|r| PlotPoint {
            x: r.min_flow,
            y: f64::from(r.head_band),
        })
        .collect();

    RenderSeries {
        curve,
        max_envelope,
        min_envelope,
        highlight: Highlight {
            x: reading.point.flow,
            y: reading.point.head,
            classification: reading.classification,
            color: colors.color(reading.classification).to_string(),
        },
        axes: axes.clone(),
    }
}
