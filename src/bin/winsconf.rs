use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use winsconf::cli::Args;
use winsconf::config::RunConfig;
use winsconf::host::SystemHost;
use winsconf::utils::tracing::enable_tracing;

fn main() -> Result<()> {
    let args: Args = Args::parse();

    let config = RunConfig::load(
        args.config_path.as_deref(),
        &args.env_prefix,
        &args.overrides(),
    )?;
    enable_tracing(&config.log.level)?;

    let host = SystemHost::new();
    let report = winsconf::run(&host, &config.desired, config.check)?;

    if report.reboot_required {
        info!("A reboot is required for the new WINS settings to take effect");
    }

    let output = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{output}");

    Ok(())
}
