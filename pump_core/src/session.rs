//! Monitoring session and its type-state builder.
//!
//! The builder enforces at compile time that an envelope table and a point
//! source are provided before `start()` is available. `try_start()` is always
//! available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel as xch;
use pump_config::reference;
use pump_traits::clock::MonotonicClock;
use pump_traits::{OperatingPoint, PointSource};

use crate::curve::CurveModel;
use crate::envelope::EnvelopeTable;
use crate::error::{BuildError, Result};
use crate::monitor::{Monitor, Reading};
use crate::presentation::{Axes, ColorMap, RenderSeries, render};
use crate::sampler::{Sampler, SamplerEvent};

/// One monitoring session: static models plus the running sampler.
///
/// Ending the session (drop or [`MonitorSession::stop`]) cancels its schedule.
pub struct MonitorSession {
    curve: Arc<CurveModel>,
    table: Arc<EnvelopeTable>,
    colors: ColorMap,
    axes: Axes,
    sampler: Sampler,
}

impl core::fmt::Debug for MonitorSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MonitorSession")
            .field("bands", &self.table.len())
            .field("curve_points", &self.curve.len())
            .field("sampler", &self.sampler)
            .finish()
    }
}

impl MonitorSession {
    pub fn builder() -> MonitorSessionBuilder<Missing, Missing> {
        MonitorSessionBuilder::default()
    }

    pub fn current(&self) -> Reading {
        self.sampler.current()
    }

    pub fn apply_override(&self, field: &str, raw: &str) -> Result<Reading> {
        self.sampler.apply_override(field, raw)
    }

    /// Series for the current reading.
    pub fn render(&self) -> RenderSeries {
        render(
            &self.curve,
            &self.table,
            &self.current(),
            &self.colors,
            &self.axes,
        )
    }

    pub fn events(&self) -> &xch::Receiver<SamplerEvent> {
        self.sampler.events()
    }

    /// Milliseconds since the last successful scheduled sample.
    pub fn stale_for_now(&self) -> u64 {
        self.sampler.stale_for_now()
    }

    pub fn is_running(&self) -> bool {
        self.sampler.is_running()
    }

    pub fn curve(&self) -> &CurveModel {
        &self.curve
    }

    pub fn table(&self) -> &EnvelopeTable {
        &self.table
    }

    pub fn stop(self) {
        self.sampler.stop();
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

type BoxedSource = Box<dyn PointSource + Send>;

/// Builder for `MonitorSession`. Optional fields fall back to the reference
/// deployment.
pub struct MonitorSessionBuilder<E, S> {
    envelope: Option<EnvelopeTable>,
    source: Option<BoxedSource>,
    curve: Option<CurveModel>,
    interval: Option<Duration>,
    initial: Option<OperatingPoint>,
    colors: Option<ColorMap>,
    axes: Option<Axes>,
    ticks: Option<xch::Receiver<Instant>>,
    _e: PhantomData<E>,
    _s: PhantomData<S>,
}

impl Default for MonitorSessionBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            envelope: None,
            source: None,
            curve: None,
            interval: None,
            initial: None,
            colors: None,
            axes: None,
            ticks: None,
            _e: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<E, S> MonitorSessionBuilder<E, S> {
    fn retag<E2, S2>(self) -> MonitorSessionBuilder<E2, S2> {
        MonitorSessionBuilder {
            envelope: self.envelope,
            source: self.source,
            curve: self.curve,
            interval: self.interval,
            initial: self.initial,
            colors: self.colors,
            axes: self.axes,
            ticks: self.ticks,
            _e: PhantomData,
            _s: PhantomData,
        }
    }

    pub fn with_envelope(mut self, table: EnvelopeTable) -> MonitorSessionBuilder<Set, S> {
        self.envelope = Some(table);
        self.retag()
    }

    pub fn with_source<P: PointSource + Send + 'static>(
        mut self,
        source: P,
    ) -> MonitorSessionBuilder<E, Set> {
        self.source = Some(Box::new(source));
        self.retag()
    }

    pub fn with_curve(mut self, curve: CurveModel) -> Self {
        self.curve = Some(curve);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sentinel point published until the first sample lands.
    pub fn with_initial_point(mut self, point: OperatingPoint) -> Self {
        self.initial = Some(point);
        self
    }

    pub fn with_colors(mut self, colors: ColorMap) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_axes(mut self, axes: Axes) -> Self {
        self.axes = Some(axes);
        self
    }

    /// Drive sampling from an external tick channel instead of a fixed interval.
    pub fn with_ticks(mut self, ticks: xch::Receiver<Instant>) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Validate and start without compile-time guarantees.
    pub fn try_start(self) -> Result<MonitorSession> {
        let table = self
            .envelope
            .ok_or_else(|| eyre::Report::new(BuildError::MissingEnvelope))?;
        let source = self
            .source
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSource))?;
        let interval = self
            .interval
            .unwrap_or(Duration::from_millis(reference::INTERVAL_MS));
        if interval.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "sampling interval must be > 0",
            )));
        }
        let initial = self.initial.unwrap_or(OperatingPoint::new(
            reference::INITIAL_POINT.0,
            reference::INITIAL_POINT.1,
        ));

        let table = Arc::new(table);
        let curve = Arc::new(self.curve.unwrap_or_else(CurveModel::reference));
        let monitor = Monitor::new(table.clone(), initial);
        let clock = MonotonicClock::new();
        let sampler = match self.ticks {
            Some(ticks) => Sampler::spawn_with_ticks(monitor, source, ticks, clock),
            None => Sampler::spawn(monitor, source, interval, clock),
        };
        tracing::info!(
            bands = table.len(),
            curve_points = curve.len(),
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "monitoring session started"
        );

        Ok(MonitorSession {
            curve,
            table,
            colors: self.colors.unwrap_or_default(),
            axes: self.axes.unwrap_or_default(),
            sampler,
        })
    }
}

impl MonitorSessionBuilder<Set, Set> {
    pub fn start(self) -> Result<MonitorSession> {
        self.try_start()
    }
}
