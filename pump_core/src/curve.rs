//! Rated performance curve.

use pump_config::reference;

/// A reference sample on the rated curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub head: f64,
    pub flow: f64,
}

/// Ordered, read-only sequence of rated curve points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveModel {
    points: Vec<CurvePoint>,
}

impl CurveModel {
    pub fn new(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    /// Eight-point curve of the reference deployment.
    pub fn reference() -> Self {
        reference::CURVE
            .iter()
            .map(|&(head, flow)| CurvePoint { head, flow })
            .collect()
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CurvePoint> {
        self.points.iter()
    }
}

impl FromIterator<CurvePoint> for CurveModel {
    fn from_iter<I: IntoIterator<Item = CurvePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
