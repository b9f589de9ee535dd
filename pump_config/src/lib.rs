#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and table loaders for the pump monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; missing sections fall back to the reference
//!   deployment in [`reference`].
//! - Curve and envelope CSV loaders enforce exact headers.
use serde::Deserialize;
use std::collections::HashSet;

pub mod reference;

/// A `(head, flow)` pair. Accepts either `[head, flow]` or `{ head = .., flow = .. }`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(from = "PointToml")]
pub struct PointCfg {
    pub head: f64,
    pub flow: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointToml {
    Tuple((f64, f64)),
    Table { head: f64, flow: f64 },
}

impl From<PointToml> for PointCfg {
    fn from(p: PointToml) -> Self {
        match p {
            PointToml::Tuple((head, flow)) | PointToml::Table { head, flow } => {
                Self { head, flow }
            }
        }
    }
}

/// One envelope row. Accepts either `[head_band, min_flow, max_flow]` or a table.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(from = "BandToml")]
pub struct BandCfg {
    pub head_band: u32,
    pub min_flow: f64,
    pub max_flow: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BandToml {
    Tuple((u32, f64, f64)),
    Table {
        head_band: u32,
        min_flow: f64,
        max_flow: f64,
    },
}

impl From<BandToml> for BandCfg {
    fn from(b: BandToml) -> Self {
        match b {
            BandToml::Tuple((head_band, min_flow, max_flow))
            | BandToml::Table {
                head_band,
                min_flow,
                max_flow,
            } => Self {
                head_band,
                min_flow,
                max_flow,
            },
        }
    }
}

fn points_from(pairs: &[(f64, f64)]) -> Vec<PointCfg> {
    pairs
        .iter()
        .map(|&(head, flow)| PointCfg { head, flow })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplerCfg {
    /// Period of the recurring sampling schedule (ms).
    pub interval_ms: u64,
    /// Sentinel point published before the first sample.
    pub initial_head: f64,
    pub initial_flow: f64,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            interval_ms: reference::INTERVAL_MS,
            initial_head: reference::INITIAL_POINT.0,
            initial_flow: reference::INITIAL_POINT.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Uniform random draw from `source.points`.
    #[default]
    Fixture,
    /// Points are pushed by the host through a channel.
    Telemetry,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceCfg {
    pub kind: SourceKind,
    /// Optional RNG seed for reproducible fixture draws.
    pub seed: Option<u64>,
    pub points: Vec<PointCfg>,
}

impl Default for SourceCfg {
    fn default() -> Self {
        Self {
            kind: SourceKind::Fixture,
            seed: None,
            points: points_from(&reference::SAMPLES),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CurveCfg {
    pub points: Vec<PointCfg>,
}

impl Default for CurveCfg {
    fn default() -> Self {
        Self {
            points: points_from(&reference::CURVE),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EnvelopeCfg {
    pub bands: Vec<BandCfg>,
}

impl Default for EnvelopeCfg {
    fn default() -> Self {
        Self {
            bands: reference::BANDS
                .iter()
                .map(|&(head_band, min_flow, max_flow)| BandCfg {
                    head_band,
                    min_flow,
                    max_flow,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    /// x axis range `[min, max]`
    pub flow_axis: [f64; 2],
    /// y axis range `[min, max]`
    pub head_axis: [f64; 2],
    pub in_band_color: String,
    pub out_of_band_color: String,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            flow_axis: reference::FLOW_AXIS,
            head_axis: reference::HEAD_AXIS,
            in_band_color: reference::IN_BAND_COLOR.to_string(),
            out_of_band_color: reference::OUT_OF_BAND_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sampler: SamplerCfg,
    pub source: SourceCfg,
    pub curve: CurveCfg,
    pub envelope: EnvelopeCfg,
    pub display: DisplayCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

fn check_points(section: &str, points: &[PointCfg]) -> eyre::Result<()> {
    for (idx, p) in points.iter().enumerate() {
        if !(p.head.is_finite() && p.flow.is_finite()) {
            eyre::bail!("{section}[{idx}] must have finite head and flow");
        }
    }
    Ok(())
}

fn check_axis(name: &str, axis: [f64; 2]) -> eyre::Result<()> {
    let [lo, hi] = axis;
    if !(lo.is_finite() && hi.is_finite()) {
        eyre::bail!("display.{name} bounds must be finite");
    }
    if lo >= hi {
        eyre::bail!("display.{name} must satisfy min < max");
    }
    Ok(())
}

/// Validate envelope rows the way the core table builder will see them.
pub fn validate_bands(bands: &[BandCfg]) -> eyre::Result<()> {
    if bands.is_empty() {
        eyre::bail!("envelope.bands must not be empty");
    }
    let mut seen = HashSet::with_capacity(bands.len());
    for b in bands {
        if b.head_band == 0 {
            eyre::bail!("envelope.bands head_band must be >= 1");
        }
        if !(b.min_flow.is_finite() && b.max_flow.is_finite()) {
            eyre::bail!(
                "envelope.bands head_band {} must have finite flow bounds",
                b.head_band
            );
        }
        if b.min_flow > b.max_flow {
            eyre::bail!(
                "envelope.bands head_band {} must satisfy min_flow <= max_flow (got {} > {})",
                b.head_band,
                b.min_flow,
                b.max_flow
            );
        }
        if !seen.insert(b.head_band) {
            eyre::bail!("envelope.bands head_band {} is duplicated", b.head_band);
        }
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sampler
        if self.sampler.interval_ms == 0 {
            eyre::bail!("sampler.interval_ms must be >= 1");
        }
        if self.sampler.interval_ms > 60 * 60 * 1000 {
            eyre::bail!("sampler.interval_ms is unreasonably large (>1h)");
        }
        if !(self.sampler.initial_head.is_finite() && self.sampler.initial_flow.is_finite()) {
            eyre::bail!("sampler.initial_head and sampler.initial_flow must be finite");
        }

        // Source
        if self.source.kind == SourceKind::Fixture && self.source.points.is_empty() {
            eyre::bail!("source.points must not be empty for the fixture source");
        }
        check_points("source.points", &self.source.points)?;

        // Curve
        check_points("curve.points", &self.curve.points)?;

        // Envelope
        validate_bands(&self.envelope.bands)?;

        // Display
        check_axis("flow_axis", self.display.flow_axis)?;
        check_axis("head_axis", self.display.head_axis)?;
        if self.display.in_band_color.trim().is_empty() {
            eyre::bail!("display.in_band_color must not be empty");
        }
        if self.display.out_of_band_color.trim().is_empty() {
            eyre::bail!("display.out_of_band_color must not be empty");
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace");
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !ROTATIONS.contains(&rot.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

/// Curve CSV schema.
///
/// Expected headers:
/// head,flow
#[derive(Debug, Deserialize, Clone, Copy)]
struct CurveRow {
    head: f64,
    flow: f64,
}

/// Envelope CSV schema.
///
/// Expected headers:
/// head_band,min_flow,max_flow
///
/// Example:
/// head_band,min_flow,max_flow
/// 1,25,30
/// 3,15,28
#[derive(Debug, Deserialize, Clone, Copy)]
struct BandRow {
    head_band: u32,
    min_flow: f64,
    max_flow: f64,
}

fn read_csv<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
    what: &str,
    expected: &[&str],
) -> eyre::Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open {what} CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "{what} CSV must have headers '{}', got: {}",
            expected.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<T>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid {what} CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}

/// Load a rated curve from a `head,flow` CSV file.
pub fn load_curve_csv(path: &std::path::Path) -> eyre::Result<Vec<PointCfg>> {
    let rows: Vec<CurveRow> = read_csv(path, "curve", &["head", "flow"])?;
    let points: Vec<PointCfg> = rows
        .into_iter()
        .map(|r| PointCfg {
            head: r.head,
            flow: r.flow,
        })
        .collect();
    check_points("curve CSV", &points)?;
    Ok(points)
}

/// Load envelope rows from a `head_band,min_flow,max_flow` CSV file and validate them.
pub fn load_envelope_csv(path: &std::path::Path) -> eyre::Result<Vec<BandCfg>> {
    let rows: Vec<BandRow> = read_csv(path, "envelope", &["head_band", "min_flow", "max_flow"])?;
    let bands: Vec<BandCfg> = rows
        .into_iter()
        .map(|r| BandCfg {
            head_band: r.head_band,
            min_flow: r.min_flow,
            max_flow: r.max_flow,
        })
        .collect();
    validate_bands(&bands)?;
    Ok(bands)
}
