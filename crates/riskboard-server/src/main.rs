mod bootstrap_helpers;
mod cli_args;

use anyhow::Result;
use clap::Parser;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    riskboard_server::run_dashboard_server(cli.into_server_config()).await
}
