//! templeacct main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::runtime::Runtime;

use templeacct_api::start_server;
use templeacct_client::{BackendRef, HttpBackend};
use templeacct_config::Config;
use templeacct_core::CoreError;

#[derive(Parser, Debug)]
#[command(name = "templeacct")]
#[command(version = "0.1.0")]
#[command(about = "Financial report front end for a temple accounting backend", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match Config::load(args.config.clone()).map_err(CoreError::from) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error.to_details());
            return Err(error).with_context(|| format!("Failed to load {}", args.config.display()));
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();
    log::info!("Config loaded from {}", args.config.display());

    let backend: BackendRef = Arc::new(HttpBackend::new(&config.backend));

    let rt = Runtime::new().context("Failed to start the async runtime")?;
    rt.block_on(start_server(config, backend)).context("Report server failed")?;
    Ok(())
}
