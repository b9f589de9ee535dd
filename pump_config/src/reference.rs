//! Reference deployment data: rated curve, sample fixture and envelope bands.

/// Rated performance curve as `(head_m, flow)` pairs, ordered by head.
pub const CURVE: [(f64, f64); 8] = [
    (0.0, 28.0),
    (1.6, 27.0),
    (2.3, 26.0),
    (3.8, 25.0),
    (4.2, 22.0),
    (4.6, 19.0),
    (5.4, 12.0),
    (6.5, 0.0),
];

/// Candidate operating points drawn by the fixture source, `(head_m, flow)`.
pub const SAMPLES: [(f64, f64); 33] = [
    (3.1, 19.0),
    (2.4, 17.0),
    (1.6, 23.0),
    (2.8, 19.0),
    (2.1, 20.0),
    (4.9, 22.0),
    (4.4, 29.0),
    (1.3, 19.0),
    (4.7, 16.0),
    (2.3, 17.0),
    (2.9, 27.0),
    (1.6, 27.0),
    (4.8, 26.0),
    (1.1, 12.0),
    (1.0, 30.0),
    (4.9, 23.0),
    (3.3, 22.0),
    (1.1, 4.0),
    (3.6, 13.0),
    (1.9, 25.0),
    (2.2, 28.0),
    (1.9, 23.0),
    (4.4, 3.0),
    (4.9, 21.0),
    (3.3, 13.0),
    (2.2, 23.0),
    (2.8, 30.0),
    (3.5, 27.0),
    (2.2, 25.0),
    (4.1, 17.0),
    (4.9, 14.0),
    (3.3, 26.0),
    (1.1, 27.0),
];

/// Acceptable flow per head band, `(head_band, min_flow, max_flow)`.
///
/// Illustrative defaults shaped to bracket the reference curve; they are
/// not measured pump data. Deployments supply their own `[envelope] bands`.
pub const BANDS: [(u32, f64, f64); 7] = [
    (1, 25.0, 30.0),
    (2, 24.0, 29.0),
    (3, 22.0, 28.0),
    (4, 18.0, 27.0),
    (5, 12.0, 24.0),
    (6, 4.0, 16.0),
    (7, 0.0, 8.0),
];

/// Sentinel point published before the first sample lands.
pub const INITIAL_POINT: (f64, f64) = (31.0, 40.0);

pub const INTERVAL_MS: u64 = 1000;

/// Chart ranges, `[min, max]`. Flow runs along x, head along y.
pub const FLOW_AXIS: [f64; 2] = [0.0, 30.0];
pub const HEAD_AXIS: [f64; 2] = [0.0, 8.0];

pub const IN_BAND_COLOR: &str = "ok";
pub const OUT_OF_BAND_COLOR: &str = "warn";
