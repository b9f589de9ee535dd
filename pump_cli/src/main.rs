//! `pump`: host CLI for the operating-point monitor.

mod cli;
mod config;
mod error_fmt;
mod logging;
mod monitor;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    if let Err(e) = run() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let mut cfg = config::load(&cli)?;
    logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(
        bands = cfg.envelope.bands.len(),
        curve_points = cfg.curve.points.len(),
        "configuration loaded"
    );

    match &cli.cmd {
        Commands::Watch {
            ticks,
            interval_ms,
            seed,
            interactive,
        } => {
            if let Some(ms) = *interval_ms {
                cfg.sampler.interval_ms = ms;
            }
            if seed.is_some() {
                cfg.source.seed = *seed;
            }
            monitor::watch(
                &cfg,
                monitor::WatchOpts {
                    ticks: *ticks,
                    interactive: *interactive,
                },
            )
        }
        Commands::Classify { head, flow } => monitor::classify(&cfg, head, flow),
        Commands::Render { head, flow } => {
            let point = head.as_deref().zip(flow.as_deref());
            monitor::render_cmd(&cfg, point)
        }
        Commands::SelfCheck => monitor::self_check(&cfg),
    }
}
