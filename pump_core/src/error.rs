use thiserror::Error;

use crate::edit::Field;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    #[error("invalid input for {field}: {raw:?} is not a finite number")]
    InvalidInput { field: Field, raw: String },
    #[error("unknown field {0:?} (expected \"head\" or \"flow\")")]
    UnknownField(String),
    #[error("point source error: {0}")]
    Source(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("duplicate head band {0}")]
    DuplicateHeadBand(u32),
    #[error("head band {head_band}: min_flow {min_flow} exceeds max_flow {max_flow}")]
    InvertedRange {
        head_band: u32,
        min_flow: f64,
        max_flow: f64,
    },
    #[error("head band must be >= 1")]
    ZeroHeadBand,
    #[error("head band {0}: flow bounds must be finite")]
    NonFiniteBound(u32),
    #[error("missing envelope table")]
    MissingEnvelope,
    #[error("missing point source")]
    MissingSource,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
