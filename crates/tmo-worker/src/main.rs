use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use tracing::{info, warn};

use tmo_observe::{init_local_offset, init_logger};

mod config;
mod lifecycle;

use config::WorkerConfig;

#[derive(Parser)]
#[command(name = "tmo-worker")]
#[command(about = "Runs a simulated test scenario under per-phase timeout budgets", long_about = None)]
struct Cli {
    /// JSON scenario file. The built-in scenario is used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the per-test budget in milliseconds. 0 disables enforcement.
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Debug mode: never time out.
    #[arg(short, long)]
    debug: bool,
}

fn load(cli: &Cli) -> anyhow::Result<WorkerConfig> {
    let mut cfg = match &cli.config {
        Some(path) => WorkerConfig::load(path)?,
        None => WorkerConfig::default(),
    };
    if let Some(ms) = cli.timeout_ms {
        cfg.timeouts.timeout_ms = ms;
    }
    cfg.timeouts.debug |= cli.debug;
    cfg.timeouts.validate()?;
    cfg.logger = cfg.logger.with_env_overrides()?;
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    // Local offset must be read while the process is still single-threaded.
    init_local_offset();

    let cli = Cli::parse();
    let cfg = load(&cli)?;
    init_logger(&cfg.logger)?;
    info!(
        tests = cfg.tests.len(),
        timeout_ms = cfg.timeouts.timeout_ms,
        debug = cfg.timeouts.debug,
        "worker starting"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let report = runtime.block_on(lifecycle::run(&cfg));

    let failures = report.failures();
    if failures > 0 {
        warn!(failures, "worker finished with timeouts");
        bail!("{failures} phase(s) timed out");
    }
    info!(tests = report.tests.len(), "worker finished");
    Ok(())
}
