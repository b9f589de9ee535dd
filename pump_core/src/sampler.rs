//! Background point sampling.
//!
//! A `Sampler` owns the shared [`Monitor`] and exactly one timer thread. It
//! runs one sampling cycle on the caller's thread at construction, then the
//! thread runs one cycle per tick until the `Sampler` is dropped. Every
//! update is pushed to a bounded event channel as well.
//!
//! Safety: dropping the `Sampler` disconnects the cancel channel, which wakes
//! the timer thread immediately, and then joins it. No timer outlives its
//! session.
use crossbeam_channel as xch;
use pump_traits::PointSource;
use pump_traits::clock::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{MonitorError, Result};
use crate::monitor::{Monitor, Origin, Reading};

/// Events buffered for observers before new ones are dropped.
pub const EVENT_CAPACITY: usize = 64;

/// Shortest accepted sampling interval.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Published update or a reported source failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerEvent {
    Published(Reading),
    SourceFailed(MonitorError),
}

#[inline]
fn lock(monitor: &Mutex<Monitor>) -> MutexGuard<'_, Monitor> {
    // State is replaced wholesale, so a poisoned guard still holds a consistent reading.
    monitor.lock().unwrap_or_else(PoisonError::into_inner)
}

fn emit(tx: &xch::Sender<SamplerEvent>, event: SamplerEvent) {
    if tx.try_send(event).is_err() {
        tracing::trace!("sampler event buffer full or unobserved; dropping event");
    }
}

struct Cycle<P, C> {
    source: P,
    monitor: Arc<Mutex<Monitor>>,
    tx: xch::Sender<SamplerEvent>,
    last_ok: Arc<AtomicU64>,
    clock: C,
    epoch: Instant,
}

impl<P: PointSource, C: Clock> Cycle<P, C> {
    fn run(&mut self) {
        // Query the source without holding the lock; it may block on I/O.
        match self.source.next_point() {
            Ok(Some(point)) => {
                let mut guard = lock(&self.monitor);
                let reading = guard.publish(point, Origin::Sampled);
                self.last_ok
                    .store(self.clock.ms_since(self.epoch), Ordering::Release);
                // Emit under the lock so event order matches `seq` order.
                emit(&self.tx, SamplerEvent::Published(reading));
                drop(guard);
                tracing::debug!(
                    head = reading.point.head,
                    flow = reading.point.flow,
                    classification = %reading.classification,
                    seq = reading.seq,
                    "sampled operating point"
                );
            }
            Ok(None) => {
                tracing::trace!("point source had nothing new");
            }
            Err(e) => {
                tracing::warn!(error = %e, "point source failed; keeping current reading");
                emit(&self.tx, SamplerEvent::SourceFailed(MonitorError::Source(e.to_string())));
            }
        }
    }
}

pub struct Sampler {
    monitor: Arc<Mutex<Monitor>>,
    tx: xch::Sender<SamplerEvent>,
    rx: xch::Receiver<SamplerEvent>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    /// Dropping this sender cancels the schedule.
    cancel: Option<xch::Sender<()>>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Sample once now, then every `interval` (clamped to [`MIN_INTERVAL`]).
    pub fn spawn<P, C>(monitor: Monitor, source: P, interval: Duration, clock: C) -> Self
    where
        P: PointSource + Send + 'static,
        C: Clock + Send + 'static,
    {
        let ticks = xch::tick(interval.max(MIN_INTERVAL));
        Self::spawn_with_ticks(monitor, source, ticks, clock)
    }

    /// Sample once now, then once per message on `ticks`.
    ///
    /// The schedule ends when the `Sampler` is dropped or `ticks` disconnects.
    pub fn spawn_with_ticks<P, C>(
        monitor: Monitor,
        source: P,
        ticks: xch::Receiver<Instant>,
        clock: C,
    ) -> Self
    where
        P: PointSource + Send + 'static,
        C: Clock + Send + 'static,
    {
        let monitor = Arc::new(Mutex::new(monitor));
        let (tx, rx) = xch::bounded(EVENT_CAPACITY);
        let last_ok = Arc::new(AtomicU64::new(0));
        let epoch = clock.now();

        let mut cycle = Cycle {
            source,
            monitor: monitor.clone(),
            tx: tx.clone(),
            last_ok: last_ok.clone(),
            clock,
            epoch,
        };
        cycle.run();

        let (cancel_tx, cancel_rx) = xch::bounded::<()>(0);
        let join_handle = std::thread::spawn(move || {
            loop {
                xch::select! {
                    recv(cancel_rx) -> _ => {
                        tracing::debug!("sampler schedule cancelled");
                        break;
                    }
                    recv(ticks) -> tick => match tick {
                        Ok(_) => cycle.run(),
                        Err(_) => {
                            tracing::debug!("tick source closed; sampler exiting");
                            break;
                        }
                    },
                }
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            monitor,
            tx,
            rx,
            last_ok,
            epoch,
            cancel: Some(cancel_tx),
            join_handle: Some(join_handle),
        }
    }

    /// Current published reading.
    pub fn current(&self) -> Reading {
        lock(&self.monitor).current()
    }

    /// Apply a raw `(field, value)` edit synchronously.
    ///
    /// On rejection the current reading is retained and the typed
    /// [`MonitorError`] is returned inside the report.
    pub fn apply_override(&self, field: &str, raw: &str) -> Result<Reading> {
        let mut guard = lock(&self.monitor);
        let reading = guard.apply_raw(field, raw)?;
        emit(&self.tx, SamplerEvent::Published(reading));
        Ok(reading)
    }

    /// Event stream of publications and source failures.
    pub fn events(&self) -> &xch::Receiver<SamplerEvent> {
        &self.rx
    }

    /// Drain buffered events and return the newest one.
    pub fn latest(&self) -> Option<SamplerEvent> {
        self.rx.try_iter().last()
    }

    /// Whether the timer thread is still running.
    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Milliseconds since the last successful scheduled sample, `now_ms`
    /// measured from this sampler's epoch.
    pub fn stale_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Acquire))
    }

    /// Convenience helper: staleness against a real monotonic clock.
    pub fn stale_for_now(&self) -> u64 {
        let elapsed = Instant::now().saturating_duration_since(self.epoch);
        let now_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.stale_for(now_ms)
    }

    /// End the schedule and wait for the timer thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Disconnect wakes the select immediately, even mid-interval.
        drop(self.cancel.take());
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("sampler thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we may be in Drop)
                    tracing::warn!(?e, "sampler thread panicked during shutdown");
                }
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("current", &self.current())
            .field("running", &self.is_running())
            .finish()
    }
}
