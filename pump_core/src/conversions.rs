//! Conversions bridging `pump_config` types to `pump_core` types.

use std::time::Duration;

use pump_traits::OperatingPoint;

use crate::curve::{CurveModel, CurvePoint};
use crate::envelope::{Envelope, EnvelopeTable};
use crate::presentation::{Axes, ColorMap};
use crate::source::FixtureSource;

// ── CurveModel ───────────────────────────────────────────────────────────────

impl From<&pump_config::PointCfg> for CurvePoint {
    fn from(p: &pump_config::PointCfg) -> Self {
        Self {
            head: p.head,
            flow: p.flow,
        }
    }
}

impl From<&pump_config::CurveCfg> for CurveModel {
    fn from(c: &pump_config::CurveCfg) -> Self {
        c.points.iter().map(CurvePoint::from).collect()
    }
}

// ── EnvelopeTable ────────────────────────────────────────────────────────────

impl From<&pump_config::BandCfg> for Envelope {
    fn from(b: &pump_config::BandCfg) -> Self {
        Self::new(b.head_band, b.min_flow, b.max_flow)
    }
}

impl TryFrom<&[pump_config::BandCfg]> for EnvelopeTable {
    type Error = eyre::Report;
    fn try_from(bands: &[pump_config::BandCfg]) -> Result<Self, Self::Error> {
        Self::new(bands.iter().map(Envelope::from).collect())
    }
}

impl TryFrom<&pump_config::EnvelopeCfg> for EnvelopeTable {
    type Error = eyre::Report;
    fn try_from(c: &pump_config::EnvelopeCfg) -> Result<Self, Self::Error> {
        Self::try_from(c.bands.as_slice())
    }
}

// ── Display ──────────────────────────────────────────────────────────────────

impl From<&pump_config::DisplayCfg> for ColorMap {
    fn from(c: &pump_config::DisplayCfg) -> Self {
        Self {
            in_band: c.in_band_color.clone(),
            out_of_band: c.out_of_band_color.clone(),
        }
    }
}

impl From<&pump_config::DisplayCfg> for Axes {
    fn from(c: &pump_config::DisplayCfg) -> Self {
        Self::new(c.flow_axis, c.head_axis)
    }
}

// ── Sampler / source ─────────────────────────────────────────────────────────

pub fn operating_point(p: &pump_config::PointCfg) -> OperatingPoint {
    OperatingPoint::new(p.head, p.flow)
}

pub fn initial_point(c: &pump_config::SamplerCfg) -> OperatingPoint {
    OperatingPoint::new(c.initial_head, c.initial_flow)
}

pub fn interval(c: &pump_config::SamplerCfg) -> Duration {
    Duration::from_millis(c.interval_ms)
}

impl TryFrom<&pump_config::SourceCfg> for FixtureSource {
    type Error = eyre::Report;
    fn try_from(c: &pump_config::SourceCfg) -> Result<Self, Self::Error> {
        let points = c.points.iter().map(operating_point).collect();
        match c.seed {
            Some(seed) => Self::with_seed(points, seed),
            None => Self::new(points),
        }
    }
}
