//! Sampler schedule lifecycle: one immediate cycle, one timer, prompt cancellation.
//!
//! Verifies that:
//! - Construction samples exactly once before returning
//! - Each tick produces exactly one sample (no duplicate timers)
//! - Dropping the Sampler cancels the schedule without waiting for the interval
//! - Source failures keep the current reading and are reported as events

use crossbeam_channel as xch;
use pump_core::error::MonitorError;
use pump_core::mocks::{FailingSource, ScriptedSource};
use pump_core::{
    EnvelopeTable, Monitor, OperatingPoint, Origin, Sampler, SamplerEvent, classify,
};
use pump_traits::clock::MonotonicClock;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(2);

fn monitor() -> Monitor {
    Monitor::new(
        Arc::new(EnvelopeTable::reference()),
        OperatingPoint::new(31.0, 40.0),
    )
}

fn script() -> Vec<OperatingPoint> {
    vec![
        OperatingPoint::new(0.9, 27.0),
        OperatingPoint::new(2.9, 10.0),
        OperatingPoint::new(7.0, 5.0),
    ]
}

fn next_published(s: &Sampler) -> pump_core::Reading {
    match s.events().recv_timeout(WAIT) {
        Ok(SamplerEvent::Published(r)) => r,
        other => panic!("expected a published reading, got {other:?}"),
    }
}

#[test]
fn construction_samples_once_before_returning() {
    let src = ScriptedSource::new(script());
    let calls = src.calls();
    let (_tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(monitor(), src, tick_rx, MonotonicClock::new());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let r = sampler.current();
    assert_eq!(r.point, OperatingPoint::new(0.9, 27.0));
    assert_eq!(r.seq, 1);
    assert_eq!(r.origin, Origin::Sampled);
}

#[test]
fn each_tick_samples_exactly_once() {
    let src = ScriptedSource::new(script());
    let calls = src.calls();
    let (tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(monitor(), src, tick_rx, MonotonicClock::new());

    assert_eq!(next_published(&sampler).seq, 1);
    for expected_seq in 2..=4u64 {
        tick_tx.send(Instant::now()).unwrap();
        let r = next_published(&sampler);
        assert_eq!(r.seq, expected_seq);
        assert_eq!(r.origin, Origin::Sampled);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // Script wraps around: 4th draw is the first point again.
    assert_eq!(sampler.current().point, OperatingPoint::new(0.9, 27.0));
}

#[test]
fn drop_cancels_schedule_without_waiting_for_interval() {
    let sampler = Sampler::spawn(
        monitor(),
        ScriptedSource::new(script()),
        Duration::from_secs(30),
        MonotonicClock::new(),
    );
    assert!(sampler.is_running());

    let start = Instant::now();
    drop(sampler);
    let shutdown_time = start.elapsed();
    assert!(
        shutdown_time < Duration::from_millis(500),
        "Shutdown took {shutdown_time:?}, expected prompt cancellation"
    );
}

#[test]
fn no_samples_after_stop() {
    let src = ScriptedSource::new(script());
    let calls = src.calls();
    let (tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(monitor(), src, tick_rx, MonotonicClock::new());
    sampler.stop();

    // The timer thread is gone; the tick may or may not be accepted.
    let _ = tick_tx.send(Instant::now());
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn closing_tick_source_ends_thread() {
    let (tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(
        monitor(),
        ScriptedSource::new(script()),
        tick_rx,
        MonotonicClock::new(),
    );
    drop(tick_tx);

    let deadline = Instant::now() + WAIT;
    while sampler.is_running() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!sampler.is_running());
    // State stays readable after the schedule ends.
    assert_eq!(sampler.current().seq, 1);
}

#[test]
fn paced_sampler_runs_a_single_schedule() {
    let src = ScriptedSource::new(script());
    let calls = src.calls();
    let sampler = Sampler::spawn(
        monitor(),
        src,
        Duration::from_millis(20),
        MonotonicClock::new(),
    );
    std::thread::sleep(Duration::from_millis(210));
    drop(sampler);

    // One immediate cycle plus ~10 ticks; a second timer would double this.
    let n = calls.load(Ordering::SeqCst);
    assert!((3..=14).contains(&n), "unexpected sample count {n}");
}

#[test]
fn source_failure_retains_state_and_reports() {
    let (tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(monitor(), FailingSource, tick_rx, MonotonicClock::new());

    let initial = sampler.current();
    assert_eq!(initial.seq, 0);
    assert_eq!(initial.origin, Origin::Initial);

    tick_tx.send(Instant::now()).unwrap();
    for _ in 0..2 {
        match sampler.events().recv_timeout(WAIT) {
            Ok(SamplerEvent::SourceFailed(MonitorError::Source(msg))) => {
                assert!(msg.contains("sensor offline"));
            }
            other => panic!("expected SourceFailed, got {other:?}"),
        }
    }
    assert_eq!(sampler.current(), initial);
}

#[test]
fn idle_source_keeps_current_reading() {
    let (tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(
        monitor(),
        ScriptedSource::new(Vec::new()),
        tick_rx,
        MonotonicClock::new(),
    );
    tick_tx.send(Instant::now()).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(sampler.current().seq, 0);
    assert!(sampler.latest().is_none());
}

#[test]
fn overrides_are_published_in_seq_order() {
    let (_tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(
        monitor(),
        ScriptedSource::new(script()),
        tick_rx,
        MonotonicClock::new(),
    );
    assert_eq!(next_published(&sampler).seq, 1);

    let r = sampler.apply_override("head", "5.4").unwrap();
    assert_eq!(r.origin, Origin::Override);
    assert_eq!(next_published(&sampler), r);

    assert!(sampler.apply_override("flow", "abc").is_err());
    assert!(sampler.latest().is_none());
    assert_eq!(sampler.current(), r);
}

#[test]
fn readings_stay_consistent_under_concurrent_overrides() {
    let table = EnvelopeTable::reference();
    let sampler = Sampler::spawn(
        monitor(),
        ScriptedSource::new(script()),
        Duration::from_millis(1),
        MonotonicClock::new(),
    );

    let mut last_seq = 0;
    for i in 0..300u32 {
        let raw = format!("{}", f64::from(i % 90) / 10.0);
        let field = if i % 2 == 0 { "head" } else { "flow" };
        sampler.apply_override(field, &raw).unwrap();
        let r = sampler.current();
        assert_eq!(r.classification, classify(&r.point, &table));
        assert!(r.seq > last_seq);
        last_seq = r.seq;
        // Keep the event buffer drained so nothing is held back.
        let _ = sampler.latest();
    }
}

#[test]
fn staleness_is_measured_from_last_sample() {
    let (_tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(
        monitor(),
        ScriptedSource::new(script()),
        tick_rx,
        MonotonicClock::new(),
    );
    let stale = sampler.stale_for(10_000);
    assert!((9_000..=10_000).contains(&stale), "stale={stale}");
    assert_eq!(sampler.stale_for(0), 0);
}

#[test]
fn staleness_against_wall_clock_grows_without_ticks() {
    let (tick_tx, tick_rx) = xch::unbounded();
    let sampler = Sampler::spawn_with_ticks(
        monitor(),
        ScriptedSource::new(script()),
        tick_rx,
        MonotonicClock::new(),
    );
    std::thread::sleep(Duration::from_millis(60));
    let before = sampler.stale_for_now();
    assert!(before >= 50, "stale={before}");

    // A fresh sample resets the age.
    tick_tx.send(Instant::now()).unwrap();
    next_published(&sampler);
    next_published(&sampler);
    assert!(sampler.stale_for_now() < before);
}
