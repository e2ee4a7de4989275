use clap::Parser;
use std::path::PathBuf;

use crate::core::edit_points::{ScanOrder, TrackKind};

#[cfg(feature = "resolve")]
const HOST_BACKEND: &str = "DaVinci Resolve (pyo3)";
#[cfg(not(feature = "resolve"))]
const HOST_BACKEND: &str = "simulated only (built without `resolve`)";

const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Host:   ", HOST_BACKEND, "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Step a Resolve timeline cut by cut for visual QC
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Prefill the frame rate field
    #[arg(long = "fps", value_name = "N")]
    pub fps: Option<u32>,

    /// Prefill the interval field (seconds held at each position)
    #[arg(long = "interval", value_name = "SECONDS")]
    pub interval: Option<f64>,

    /// Track type to scan for edit points
    #[arg(long = "track-type", value_name = "TYPE", default_value = "video")]
    pub track_type: TrackKind,

    /// Track index to scan (1-based)
    #[arg(long = "track-index", value_name = "N", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub track_index: u32,

    /// How to pick the next edit point from the host's item list
    #[arg(long = "scan-order", value_enum, default_value_t = ScanOrder::HostOrder)]
    pub scan_order: ScanOrder,

    /// Drive a simulated timeline from a JSON file instead of Resolve
    #[arg(long = "simulate", value_name = "FILE")]
    pub simulate: Option<PathBuf>,

    /// Enable logging to file (default: cutstep.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
