use anyhow::Context;
use clap::Parser;
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use workflow::config::SimulationConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Timed RF link synchronization and delivery simulation")]
struct Args {
    /// Load a simulation config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Total run time in seconds
    #[arg(long)]
    duration: Option<u64>,
    /// Driver tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Directory receiving error logs and the run summary
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_ms = tick_ms;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating simulation runtime")?;
    let runner = Runner::new(config.clone());
    let summary = runtime.block_on(async {
        let shutdown = CancellationToken::new();
        let on_ctrl_c = shutdown.clone();
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => on_ctrl_c.cancel(),
                Err(err) => warn!("unable to listen for Ctrl+C: {}", err),
            }
        });
        runner.run(shutdown).await
    })?;

    for report in &summary.drivers {
        println!("{} -> {} ticks in {:?}", report.name, report.ticks, report.elapsed);
    }
    println!(
        "carrier records {} ({} diagnostics), doppler records {} ({} diagnostics)",
        summary.carrier_records,
        summary.carrier_diagnostics,
        summary.doppler_records,
        summary.doppler_diagnostics
    );
    println!(
        "link: sent {}, failed {}, reconnections {}/{}, unstable samples {}, failed connections {}",
        summary.link.frames_sent,
        summary.link.failed_sends,
        summary.link.successful_reconnections,
        summary.link.reconnection_attempts,
        summary.link.unstable_samples,
        summary.link.failed_connections
    );
    if summary.outcome.is_delivered() {
        println!("Mission success: data transmitted without errors.");
    } else {
        println!("Mission failed: could not recover from errors ({:?}).", summary.outcome);
    }

    let report_path = config.output_dir.join("run_summary.log");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&report_path)
        .with_context(|| format!("opening {}", report_path.display()))?;
    let line = serde_json::to_string(&summary).context("encoding run summary")?;
    writeln!(file, "{}", line)?;

    Ok(())
}
