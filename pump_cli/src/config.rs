//! Config loading for the CLI: TOML file, CSV table overlays, validation.

use crate::cli::Cli;
use crate::error_fmt::ConfigError;
use eyre::WrapErr;
use pump_config::Config;

/// Load the effective configuration.
///
/// CSV tables replace the matching TOML section wholesale. Every failure is
/// tagged with [`ConfigError`] so it maps to the configuration exit code.
pub fn load(cli: &Cli) -> eyre::Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("read config {}", path.display()))
                .wrap_err_with(|| ConfigError(path.display().to_string()))?;
            toml::from_str::<Config>(&text)
                .wrap_err_with(|| ConfigError(format!("parse {}", path.display())))?
        }
        None => Config::default(),
    };

    if let Some(path) = &cli.envelope_csv {
        cfg.envelope.bands = pump_config::load_envelope_csv(path)
            .wrap_err_with(|| ConfigError(format!("envelope table {}", path.display())))?;
    }
    if let Some(path) = &cli.curve_csv {
        cfg.curve.points = pump_config::load_curve_csv(path)
            .wrap_err_with(|| ConfigError(format!("curve {}", path.display())))?;
    }

    cfg.validate()
        .wrap_err_with(|| ConfigError("validation failed".to_string()))?;
    Ok(cfg)
}
