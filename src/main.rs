use clap::Parser;
use faultroute::cli::{run_cli, Cli};
use faultroute::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging_with_config(&LogConfig::from_env())?;
    run_cli(Cli::parse())
}
