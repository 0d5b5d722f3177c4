use std::path::PathBuf;

use clap::Parser;
use snipvault_lib::bootstrap::{self, AppPaths};

#[derive(Parser)]
#[command(name = "snipvault")]
#[command(about = "SnipVault sync and capture engine", long_about = None)]
struct Cli {
    /// Config file path (defaults to config.toml in the app config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep all data, config and logs under this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_dirs = bootstrap::resolve_app_dirs(cli.data_dir)?;
    let paths = AppPaths::from_app_dirs(&app_dirs);

    if let Err(err) = bootstrap::tracing::init_tracing_subscriber(&paths.logs_dir) {
        eprintln!("Failed to initialize tracing: {err:#}");
    }

    let config = bootstrap::load_or_default(cli.config, &paths.config_file)?;
    bootstrap::run_app(config, paths).await
}
