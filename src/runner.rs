//! Application runner - logging setup, host selection and the eframe launch.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use log::{debug, error, info};

use crate::app::CutstepApp;
use crate::app::controller::{Controller, EXIT_HOST_UNAVAILABLE};
use crate::app::form::FormState;
use crate::cli::Args;
use crate::config::{self, PathConfig};
use crate::core::edit_points::TrackRef;
use crate::core::host::{HostConnector, HostError};
use crate::core::runner::StepRunner;
use crate::core::sim::{SimTimeline, SimulatedHost};
use crate::dialogs::RfdNotifier;

/// Verbosity count -> default filter (0 = warn, 1 = info, 2 = debug, 3+ = trace)
pub fn log_level(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Console logging (respects RUST_LOG) or, with `--log`, a log file.
pub fn init_logging(args: &Args, path_config: &PathConfig) -> Result<()> {
    let level = log_level(args.verbosity);

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file("cutstep.log", path_config));
        let file = std::fs::File::create(&log_path)
            .map_err(|e| anyhow!("Failed to create log file {}: {}", log_path.display(), e))?;

        env_logger::Builder::new()
            .filter_level(level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), level);
    } else {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
        )
        .filter_module("egui", log::LevelFilter::Info)
        .format_timestamp_millis()
        .init();
    }
    Ok(())
}

/// `--simulate FILE` wins; otherwise the live Resolve connector.
fn build_connector(args: &Args) -> Result<Arc<dyn HostConnector>> {
    if let Some(path) = &args.simulate {
        info!("Using simulated timeline: {}", path.display());
        let timeline = SimTimeline::from_json(path)?;
        return Ok(Arc::new(SimulatedHost::new(timeline)));
    }
    live_connector()
}

#[cfg(feature = "resolve")]
fn live_connector() -> Result<Arc<dyn HostConnector>> {
    Ok(Arc::new(crate::core::resolve::ResolveConnector::from_env()))
}

#[cfg(not(feature = "resolve"))]
fn live_connector() -> Result<Arc<dyn HostConnector>> {
    let e = HostError::ModuleNotFound("built without the `resolve` feature".to_string());
    error!("{}", e);
    eprintln!("{}", e);
    std::process::exit(EXIT_HOST_UNAVAILABLE);
}

fn prefill_form(args: &Args) -> FormState {
    FormState::new(
        args.fps.map(|n| n.to_string()).unwrap_or_default(),
        args.interval.map(|s| s.to_string()).unwrap_or_default(),
    )
}

/// Run the application with parsed arguments. Logging must be initialised.
///
/// Exits the process with code 1 if the scripting module cannot be loaded.
pub fn run_app(args: Args, path_config: PathConfig) -> Result<()> {
    debug!("Command-line args: {:?}", args);

    let connector = build_connector(&args)?;
    if let Err(e) = connector.probe() {
        fatal_host(&e);
    }
    info!("Host connector: {}", connector.name());

    let host_name = connector.name();
    let target = TrackRef::new(args.track_type, args.track_index);
    let controller = Controller::new(StepRunner::new(connector), RfdNotifier, prefill_form(&args))
        .with_target(target, args.scan_order);

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(format!("Cutstep v{} - edit point QC", env!("CARGO_PKG_VERSION")))
            .with_inner_size([400.0, 250.0])
            .with_resizable(true),
        persist_window: true,
        persistence_path: Some(config::config_file("cutstep.json", &path_config)),
        ..Default::default()
    };

    eframe::run_native(
        "Cutstep",
        native_options,
        Box::new(move |_cc| Ok(Box::new(CutstepApp::new(controller, host_name)))),
    )
    .map_err(|e| anyhow!("Window error: {}", e))?;

    info!("Application exiting");
    Ok(())
}

fn fatal_host(e: &HostError) -> ! {
    error!("{}", e);
    eprintln!("{}", e);
    std::process::exit(EXIT_HOST_UNAVAILABLE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(0), log::LevelFilter::Warn);
        assert_eq!(log_level(1), log::LevelFilter::Info);
        assert_eq!(log_level(2), log::LevelFilter::Debug);
        assert_eq!(log_level(7), log::LevelFilter::Trace);
    }

    #[test]
    fn test_prefill_form_from_args() {
        let args = Args::try_parse_from(["cutstep", "--fps", "24", "--interval", "0.25"]).unwrap();
        assert_eq!(prefill_form(&args), FormState::new("24", "0.25"));

        let args = Args::try_parse_from(["cutstep"]).unwrap();
        assert_eq!(prefill_form(&args), FormState::default());
    }

    #[test]
    fn test_simulated_connector_from_file() {
        let path = std::env::temp_dir().join("cutstep_sim_connector.json");
        std::fs::write(&path, r#"{ "tracks": [ { "starts": [0, 48] } ] }"#).unwrap();
        let args = Args::try_parse_from(["cutstep", "--simulate", path.to_str().unwrap()]).unwrap();

        let connector = build_connector(&args).unwrap();
        assert_eq!(connector.name(), "simulated");
        assert!(connector.probe().is_ok());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_simulated_connector_bad_file() {
        let args = Args::try_parse_from(["cutstep", "--simulate", "/nonexistent/cutstep.json"]).unwrap();
        assert!(build_connector(&args).is_err());
    }
}
