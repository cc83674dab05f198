mod app;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use emotional_chess::config::Config;

fn main() -> Result<()> {
    let args = app::Args::parse();
    let config = Config::load(args.config.as_deref())?;

    // RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    app::run(&args, &config)
}
