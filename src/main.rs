use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use boxoffice::cli::{run, Cli};
use boxoffice::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = Config::load();

    run(cli, config).await
}
