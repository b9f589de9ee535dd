//! Shared capabilities between the monitor core and its hosts.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A live pump operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub head: f64,
    pub flow: f64,
}

impl OperatingPoint {
    pub const fn new(head: f64, flow: f64) -> Self {
        Self { head, flow }
    }
}

/// Supplier of the next operating point for a sampling tick.
///
/// `Ok(None)` means nothing new arrived since the last tick and the current
/// point stays published.
pub trait PointSource {
    fn next_point(&mut self) -> Result<Option<OperatingPoint>, BoxError>;
}

impl<P: PointSource + ?Sized> PointSource for Box<P> {
    fn next_point(&mut self) -> Result<Option<OperatingPoint>, BoxError> {
        (**self).next_point()
    }
}
