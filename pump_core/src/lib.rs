#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pump operating-point monitoring (host-agnostic).
//!
//! All live data enters through `pump_traits::PointSource`; rendering is left
//! to whatever consumes [`RenderSeries`].
//!
//! ## Architecture
//!
//! - **Curve**: rated performance curve (`curve` module)
//! - **Envelope**: head-banded flow limits and `ceil(head)` lookup (`envelope` module)
//! - **Classification**: pure point→band check (`classify` module)
//! - **Monitor**: current reading, whole-pair replacement (`monitor` module)
//! - **Sampler**: single cancellable schedule driving a source (`sampler` module)
//! - **Presentation**: chart-ready series (`presentation` module)
//! - **Session**: type-state builder that wires it all (`session` module)

pub mod classify;
pub mod conversions;
pub mod curve;
pub mod edit;
pub mod envelope;
pub mod error;
pub mod mocks;
pub mod monitor;
pub mod presentation;
pub mod sampler;
pub mod session;
pub mod source;

pub use classify::{Classification, classify};
pub use curve::{CurveModel, CurvePoint};
pub use edit::{Field, ManualEdit};
pub use envelope::{Envelope, EnvelopeTable, EnvelopeTableBuilder, band_for_head};
pub use error::{BuildError, MonitorError};
pub use monitor::{Monitor, Origin, Reading};
pub use presentation::{Axes, Axis, ColorMap, Highlight, PlotPoint, RenderSeries, color, render};
pub use pump_traits::{OperatingPoint, PointSource};
pub use sampler::{Sampler, SamplerEvent};
pub use session::{MonitorSession, MonitorSessionBuilder};
pub use source::{ChannelSource, FixtureSource};
