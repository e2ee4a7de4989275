use cutstep::cli::Args;
use cutstep::config;
use cutstep::runner;

use clap::Parser;
use log::info;

fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());

    // Ensure directories exist
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    runner::init_logging(&args, &path_config)?;

    info!("Cutstep starting...");
    info!(
        "Config path: {}",
        config::config_file("cutstep.json", &path_config).display()
    );

    runner::run_app(args, path_config)
}
