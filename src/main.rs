use clap::Parser;
use tracing_subscriber::EnvFilter;

use wheel_scan::cli::{Cli, Command};
use wheel_scan::screen::ScreenArgs;
use wheel_scan::{dashboard, doctor, screen, smoke};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wheel_scan=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Screen {
            ticker,
            min_dte,
            max_dte,
            min_otm,
            max_otm,
            strategy,
            csv,
        } => {
            screen::run(&ScreenArgs {
                ticker,
                min_dte,
                max_dte,
                min_otm,
                max_otm,
                strategy,
                csv,
            })
            .await
        }
        Command::Dashboard { host, port } => dashboard::serve(&host, port).await,
        Command::Smoke { ticker } => smoke::run(&ticker).await,
        Command::Doctor => doctor::run().await,
    }
}
