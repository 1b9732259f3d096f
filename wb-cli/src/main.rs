//! wb-cli - Command line tool for pool and spa water balancing.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "wb-cli",
    version,
    about = "Pool and spa water balance toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: wb_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("Running {:?}", cli.command);
    wb_cmd::run(cli.command)
}
