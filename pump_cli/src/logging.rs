//! Tracing subscriber setup: console layer plus an optional rolling file.

use crate::cli::FILE_GUARD;
use eyre::{WrapErr, eyre};
use pump_config::Logging;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber.
///
/// Filter precedence: `RUST_LOG`, then `--log-level`, then `[logging] level`.
/// Console output goes to stderr so stdout stays machine-readable.
pub fn init(json: bool, cli_level: Option<&str>, cfg: &Logging) -> eyre::Result<()> {
    let level = cli_level
        .or(cfg.level.as_deref())
        .unwrap_or(DEFAULT_LEVEL);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let file_layer = match cfg.file.as_deref() {
        Some(path) => {
            let writer = file_writer(Path::new(path), cfg.rotation.as_deref())?;
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let res = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    res.wrap_err("install tracing subscriber")
}

fn file_writer(
    path: &Path,
    rotation: Option<&str>,
) -> eyre::Result<tracing_appender::non_blocking::NonBlocking> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre!("logging.file must name a file, got {}", path.display()))?;
    let appender = RollingFileAppender::new(rotation_of(rotation), dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    // Held for the whole process so buffered lines are flushed at exit.
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}

/// Map `logging.rotation` to an appender rotation. Matching ignores case,
/// as validation does; anything else never rotates.
fn rotation_of(rotation: Option<&str>) -> Rotation {
    match rotation.map(str::to_ascii_lowercase).as_deref() {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("daily"), Rotation::DAILY)]
    #[case(Some("Daily"), Rotation::DAILY)]
    #[case(Some("HOURLY"), Rotation::HOURLY)]
    #[case(Some("never"), Rotation::NEVER)]
    #[case(None, Rotation::NEVER)]
    fn rotation_matches_validation_case_insensitively(
        #[case] raw: Option<&str>,
        #[case] want: Rotation,
    ) {
        assert_eq!(rotation_of(raw), want);
    }
}
