//! AQFR CLI - Command line tool for LCSQA air-quality station data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "aqfr-cli",
    version,
    about = "French air-quality station data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: aqfr_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("aqfr-cli {}", env!("CARGO_PKG_VERSION"));
    aqfr_cmd::run(cli.command).await
}
