//! oxsurface entrypoint.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::load_from;
use oxsurface::scenario;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name = "oxsurface",
    version,
    about = "Replay edit-surface scenarios against headless collaborators"
)]
struct Args {
    /// Scenario file (TOML).
    pub script: PathBuf,
    /// Optional configuration file path (overrides discovery of `oxsurface.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Directory receiving `oxsurface.log`.
    #[arg(long = "log-dir", default_value = ".")]
    pub log_dir: PathBuf,
}

fn configure_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let log_path = log_dir.join("oxsurface.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "oxsurface.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(&args.log_dir);
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone()).context("loading configuration")?;
    let tuning = config.tuning();
    let config_path = config.source.as_ref().map(|p| p.display().to_string());
    info!(
        target: "runtime.startup",
        config = config_path.as_deref(),
        shrink_factor = tuning.shrink_factor,
        idle_debounce_ms = tuning.idle_debounce_ms,
        "bootstrap_complete"
    );

    let script = scenario::load(&args.script)?;
    let replay = scenario::replay(&script, tuning)
        .with_context(|| format!("replaying {}", args.script.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    scenario::write_report(&replay, &mut out).context("writing report")?;
    info!(target: "runtime", passes = replay.passes.len(), "shutdown");
    Ok(())
}
