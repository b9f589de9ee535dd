//! Session assembly from config and the subcommand bodies.

use crate::cli::JSON_MODE;
use crate::error_fmt::{ConfigError, humanize};
use crossbeam_channel as xch;
use eyre::WrapErr;
use pump_config::{Config, SourceKind};
use pump_core::conversions::{initial_point, interval};
use pump_core::{
    Axes, ChannelSource, ColorMap, CurveModel, EnvelopeTable, Field, FixtureSource, ManualEdit,
    Monitor, MonitorSession, OperatingPoint, Reading, SamplerEvent, render,
};
use serde_json::json;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How often the watch loop re-checks shutdown while idle.
const POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Default, Clone, Copy)]
pub struct WatchOpts {
    /// Stop after this many published readings.
    pub ticks: Option<u64>,
    pub interactive: bool,
}

fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

fn table_from(cfg: &Config) -> eyre::Result<EnvelopeTable> {
    EnvelopeTable::try_from(&cfg.envelope)
        .wrap_err_with(|| ConfigError("envelope.bands".to_string()))
}

/// Build a running session from config.
///
/// For the telemetry source the returned sender is the feed; the caller pushes
/// points into it. `ticks` replaces the interval schedule when given.
pub fn session_from_config(
    cfg: &Config,
    ticks: Option<xch::Receiver<Instant>>,
) -> eyre::Result<(MonitorSession, Option<xch::Sender<OperatingPoint>>)> {
    let table = table_from(cfg)?;
    let builder = MonitorSession::builder()
        .with_envelope(table)
        .with_curve(CurveModel::from(&cfg.curve))
        .with_interval(interval(&cfg.sampler))
        .with_initial_point(initial_point(&cfg.sampler))
        .with_colors(ColorMap::from(&cfg.display))
        .with_axes(Axes::from(&cfg.display));
    let builder = match ticks {
        Some(t) => builder.with_ticks(t),
        None => builder,
    };

    match cfg.source.kind {
        SourceKind::Fixture => {
            let source = FixtureSource::try_from(&cfg.source)
                .wrap_err_with(|| ConfigError("source.points".to_string()))?;
            Ok((builder.with_source(source).start()?, None))
        }
        SourceKind::Telemetry => {
            let (feed, source) = ChannelSource::create();
            Ok((builder.with_source(source).start()?, Some(feed)))
        }
    }
}

fn band_of(table: &EnvelopeTable, point: &OperatingPoint) -> Option<u32> {
    table.lookup(point.head).map(|e| e.head_band)
}

/// `stale_ms` is the age of the last successful scheduled sample.
fn print_reading(table: &EnvelopeTable, r: &Reading, stale_ms: u64) {
    let band = band_of(table, &r.point);
    if json_mode() {
        let line = json!({
            "seq": r.seq,
            "origin": r.origin,
            "head": r.point.head,
            "flow": r.point.flow,
            "band": band,
            "classification": r.classification,
            "stale_ms": stale_ms,
        });
        println!("{line}");
    } else {
        let band = band.map_or_else(|| "-".to_string(), |b| b.to_string());
        println!(
            "#{seq:<4} {origin:<8} head={head:>6.2} m  flow={flow:>6.2} m3/h  band={band:<3} {class}",
            seq = r.seq,
            origin = r.origin.as_str(),
            head = r.point.head,
            flow = r.point.flow,
            class = r.classification,
        );
    }
}

/// Parse one `field value` override line.
fn parse_override(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (field, raw) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    Some((field, raw.trim()))
}

/// Parse one `head flow` telemetry line (whitespace or comma separated).
fn parse_telemetry(line: &str) -> eyre::Result<Option<OperatingPoint>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let head = parts.next().unwrap_or_default();
    let flow = parts.next().unwrap_or_default();
    parse_point(head, flow).map(Some)
}

/// Coerce raw head and flow text the same way manual overrides are coerced.
fn parse_point(head: &str, flow: &str) -> eyre::Result<OperatingPoint> {
    let head = ManualEdit::for_field(Field::Head, head)?;
    let flow = ManualEdit::for_field(Field::Flow, flow)?;
    Ok(OperatingPoint::new(head.value, flow.value))
}

fn spawn_stdin_lines() -> xch::Receiver<String> {
    let (tx, rx) = xch::unbounded();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub fn watch(cfg: &Config, opts: WatchOpts) -> eyre::Result<()> {
    let telemetry = matches!(cfg.source.kind, SourceKind::Telemetry);
    if telemetry && opts.interactive {
        return Err(eyre::eyre!(
            "the telemetry source reads points from stdin; --interactive is unavailable"
        ))
        .wrap_err_with(|| ConfigError("source.kind".to_string()));
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    let (session, feed) = session_from_config(cfg, None)?;
    let table = session.table().clone();
    let lines = (telemetry || opts.interactive).then(spawn_stdin_lines);
    let mut published: u64 = 0;
    tracing::info!(interactive = opts.interactive, telemetry, "watch started");

    while !shutdown.load(Ordering::Relaxed) {
        if opts.ticks.is_some_and(|n| published >= n) {
            break;
        }
        let never = xch::never();
        let line_rx = lines.as_ref().unwrap_or(&never);
        xch::select! {
            recv(session.events()) -> ev => match ev {
                Ok(SamplerEvent::Published(r)) => {
                    print_reading(&table, &r, session.stale_for_now());
                    published += 1;
                }
                Ok(SamplerEvent::SourceFailed(e)) => {
                    tracing::warn!(error = %e, "point source failed");
                }
                Err(_) => break,
            },
            recv(line_rx) -> line => match line {
                Ok(line) => {
                    if let Some(feed) = &feed {
                        match parse_telemetry(&line) {
                            Ok(Some(p)) => {
                                if feed.send(p).is_err() {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(e) => eprintln!("{}", humanize(&e)),
                        }
                    } else if let Some((field, raw)) = parse_override(&line)
                        && let Err(e) = session.apply_override(field, raw)
                    {
                        eprintln!("{}", humanize(&e));
                    }
                }
                Err(_) => {
                    // stdin closed. Telemetry waits out two ticks so the
                    // last pushed point is sampled before draining.
                    if feed.is_some() {
                        std::thread::sleep(interval(&cfg.sampler) * 2 + POLL);
                    }
                    drain(&session, &table, opts.ticks, &mut published);
                    break;
                }
            },
            default(POLL) => {}
        }
    }

    tracing::info!(published, "watch finished");
    session.stop();
    Ok(())
}

/// Print readings already queued (e.g. the last override) before exiting.
fn drain(session: &MonitorSession, table: &EnvelopeTable, ticks: Option<u64>, published: &mut u64) {
    while let Ok(ev) = session.events().try_recv() {
        if ticks.is_some_and(|n| *published >= n) {
            break;
        }
        if let SamplerEvent::Published(r) = ev {
            print_reading(table, &r, session.stale_for_now());
            *published += 1;
        }
    }
}

pub fn classify(cfg: &Config, head: &str, flow: &str) -> eyre::Result<()> {
    let table = table_from(cfg)?;
    let point = parse_point(head, flow)?;
    let class = pump_core::classify(&point, &table);
    let band = band_of(&table, &point);
    if json_mode() {
        let out = json!({
            "head": point.head,
            "flow": point.flow,
            "band": band,
            "classification": class,
        });
        println!("{out}");
    } else {
        match table.lookup(point.head) {
            Some(e) => println!(
                "{class}: head {} m -> band {} [{}, {}], flow {} m3/h",
                point.head, e.head_band, e.min_flow, e.max_flow, point.flow
            ),
            None => println!("{class}: head {} m has no envelope band", point.head),
        }
    }
    Ok(())
}

pub fn render_cmd(cfg: &Config, point: Option<(&str, &str)>) -> eyre::Result<()> {
    let series = match point {
        Some((head, flow)) => {
            let table = Arc::new(table_from(cfg)?);
            let p = parse_point(head, flow)?;
            let reading = Monitor::new(table.clone(), p).current();
            render(
                &CurveModel::from(&cfg.curve),
                &table,
                &reading,
                &ColorMap::from(&cfg.display),
                &Axes::from(&cfg.display),
            )
        }
        None => {
            // Idle tick channel: only the construction-time sample runs.
            let (_tick_tx, ticks) = xch::unbounded();
            let (session, _feed) = session_from_config(cfg, Some(ticks))?;
            let series = session.render();
            session.stop();
            series
        }
    };
    let text = if json_mode() {
        serde_json::to_string(&series)
    } else {
        serde_json::to_string_pretty(&series)
    }
    .wrap_err("serialize render series")?;
    println!("{text}");
    Ok(())
}

pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let table = table_from(cfg)?;
    let kind = match cfg.source.kind {
        SourceKind::Fixture => "fixture",
        SourceKind::Telemetry => "telemetry",
    };
    if json_mode() {
        let out = json!({
            "status": "ok",
            "bands": table.len(),
            "curve_points": cfg.curve.points.len(),
            "source": kind,
            "source_points": cfg.source.points.len(),
            "interval_ms": cfg.sampler.interval_ms,
        });
        println!("{out}");
    } else {
        println!(
            "OK: {} envelope bands, {} curve points, {kind} source ({} points), interval {} ms",
            table.len(),
            cfg.curve.points.len(),
            cfg.source.points.len(),
            cfg.sampler.interval_ms
        );
    }
    Ok(())
}
