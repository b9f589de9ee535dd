//! Point sources: fixture draws and a telemetry feed.

use crossbeam_channel as xch;
use pump_traits::{BoxError, OperatingPoint, PointSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{BuildError, Result};

/// Uniform random draw from a fixed set of candidate points.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    points: Vec<OperatingPoint>,
    rng: StdRng,
}

impl FixtureSource {
    pub fn new(points: Vec<OperatingPoint>) -> Result<Self> {
        Self::with_rng(points, StdRng::from_entropy())
    }

    /// Reproducible draws for a given seed.
    pub fn with_seed(points: Vec<OperatingPoint>, seed: u64) -> Result<Self> {
        Self::with_rng(points, StdRng::seed_from_u64(seed))
    }

    fn with_rng(points: Vec<OperatingPoint>, rng: StdRng) -> Result<Self> {
        if points.is_empty() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "fixture source needs at least one point",
            )));
        }
        Ok(Self { points, rng })
    }

    pub fn points(&self) -> &[OperatingPoint] {
        &self.points
    }
}

impl PointSource for FixtureSource {
    fn next_point(&mut self) -> std::result::Result<Option<OperatingPoint>, BoxError> {
        let idx = self.rng.gen_range(0..self.points.len());
        Ok(Some(self.points[idx]))
    }
}

/// Telemetry-backed source: the host pushes points, each tick takes the newest.
#[derive(Debug)]
pub struct ChannelSource {
    rx: xch::Receiver<OperatingPoint>,
}

impl ChannelSource {
    pub fn new(rx: xch::Receiver<OperatingPoint>) -> Self {
        Self { rx }
    }

    /// Create a feed pair. The sender side belongs to the telemetry producer.
    pub fn create() -> (xch::Sender<OperatingPoint>, Self) {
        let (tx, rx) = xch::unbounded();
        (tx, Self::new(rx))
    }
}

impl PointSource for ChannelSource {
    fn next_point(&mut self) -> std::result::Result<Option<OperatingPoint>, BoxError> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(p) => latest = Some(p),
                Err(xch::TryRecvError::Empty) => return Ok(latest),
                Err(xch::TryRecvError::Disconnected) => {
                    return match latest {
                        Some(p) => Ok(Some(p)),
                        None => Err("telemetry feed disconnected".into()),
                    };
                }
            }
        }
    }
}
