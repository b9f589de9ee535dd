//! Test and helper sources for pump_core

use pump_traits::{BoxError, OperatingPoint, PointSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cycles a fixed list of points and counts how often it was asked.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    points: Vec<OperatingPoint>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(points: Vec<OperatingPoint>) -> Self {
        Self {
            points,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter; clone before handing the source to a sampler.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl PointSource for ScriptedSource {
    fn next_point(&mut self) -> Result<Option<OperatingPoint>, BoxError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.points.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.points[n % self.points.len()]))
    }
}

/// A source that always errors; exercises the reject-and-retain path.
pub struct FailingSource;

impl PointSource for FailingSource {
    fn next_point(&mut self) -> Result<Option<OperatingPoint>, BoxError> {
        Err(Box::new(std::io::Error::other("sensor offline")))
    }
}
