//! Live DaVinci Resolve connector.
//!
//! Resolve only exposes its scripting API to Python (and Lua), so this
//! connector embeds an interpreter through pyo3, puts the Resolve scripting
//! directories on `sys.path` and imports `DaVinciResolveScript`.
//!
//! Environment:
//! - `RESOLVE_SCRIPT_API` - scripting root (platform default otherwise)
//! - `RESOLVE_SCRIPT_LIB` - path to fusionscript; read by the Python module itself

use std::path::PathBuf;

use log::{debug, warn};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::edit_points::TrackRef;
use crate::core::host::{HostConnector, HostError, Timeline};

const SCRIPT_MODULE: &str = "DaVinciResolveScript";

#[cfg(target_os = "macos")]
const DEFAULT_SCRIPT_API: &str =
    "/Library/Application Support/Blackmagic Design/DaVinci Resolve/Developer/Scripting";
#[cfg(target_os = "windows")]
const DEFAULT_SCRIPT_API: &str =
    r"C:\ProgramData\Blackmagic Design\DaVinci Resolve\Support\Developer\Scripting";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const DEFAULT_SCRIPT_API: &str = "/opt/resolve/Developer/Scripting";

fn call_err(e: PyErr) -> HostError {
    HostError::Call(e.to_string())
}

/// Scripting root plus its `Modules` subdirectory, in `sys.path` order
fn script_paths(api_root: PathBuf) -> Vec<PathBuf> {
    let modules = api_root.join("Modules");
    vec![api_root, modules]
}

pub struct ResolveConnector {
    script_paths: Vec<PathBuf>,
}

impl ResolveConnector {
    pub fn from_env() -> Self {
        let api_root = std::env::var_os("RESOLVE_SCRIPT_API")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_API));
        if std::env::var_os("RESOLVE_SCRIPT_LIB").is_none() {
            debug!("RESOLVE_SCRIPT_LIB not set, DaVinciResolveScript will use its default");
        }
        Self {
            script_paths: script_paths(api_root),
        }
    }

    fn import_module<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyModule>> {
        let sys_path = py.import("sys")?.getattr("path")?;
        for dir in &self.script_paths {
            let dir = dir.to_string_lossy();
            if !sys_path.contains(dir.as_ref())? {
                sys_path.call_method1("append", (dir.as_ref(),))?;
            }
        }
        py.import(SCRIPT_MODULE)
    }
}

impl HostConnector for ResolveConnector {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn probe(&self) -> Result<(), HostError> {
        Python::with_gil(|py| {
            self.import_module(py)
                .map(|_| ())
                .map_err(|e| HostError::ModuleNotFound(e.to_string()))
        })
    }

    fn connect(&self) -> Result<Box<dyn Timeline>, HostError> {
        Python::with_gil(|py| {
            let module = self
                .import_module(py)
                .map_err(|e| HostError::ModuleNotFound(e.to_string()))?;

            let resolve = module.call_method1("scriptapp", ("Resolve",)).map_err(call_err)?;
            if resolve.is_none() {
                return Err(HostError::NotRunning);
            }
            let manager = resolve.call_method0("GetProjectManager").map_err(call_err)?;
            if manager.is_none() {
                return Err(HostError::NotRunning);
            }
            let project = manager.call_method0("GetCurrentProject").map_err(call_err)?;
            if project.is_none() {
                return Err(HostError::NoProject);
            }
            let timeline = project.call_method0("GetCurrentTimeline").map_err(call_err)?;
            if timeline.is_none() {
                return Err(HostError::NoTimeline);
            }

            debug!("Connected to Resolve timeline");
            Ok(Box::new(ResolveTimeline { timeline: timeline.unbind() }) as Box<dyn Timeline>)
        })
    }
}

struct ResolveTimeline {
    timeline: Py<PyAny>,
}

/// `GetStart()` is an int on older Resolve builds and may be a float on newer ones
fn start_frame(item: &Bound<'_, PyAny>) -> PyResult<i64> {
    let start = item.call_method0("GetStart")?;
    match start.extract::<i64>() {
        Ok(frame) => Ok(frame),
        Err(_) => start.extract::<f64>().map(|f| f.floor() as i64),
    }
}

impl Timeline for ResolveTimeline {
    fn current_timecode(&mut self) -> Result<String, HostError> {
        Python::with_gil(|py| {
            self.timeline
                .bind(py)
                .call_method0("GetCurrentTimecode")
                .and_then(|tc| tc.extract::<String>())
                .map_err(call_err)
        })
    }

    fn set_current_timecode(&mut self, timecode: &str) -> Result<(), HostError> {
        Python::with_gil(|py| {
            let accepted = self
                .timeline
                .bind(py)
                .call_method1("SetCurrentTimecode", (timecode,))
                .map_err(call_err)?;
            if !accepted.is_truthy().unwrap_or(false) {
                warn!("Resolve did not accept timecode {}", timecode);
            }
            Ok(())
        })
    }

    fn item_starts(&mut self, track: TrackRef) -> Result<Vec<i64>, HostError> {
        Python::with_gil(|py| {
            let items = self
                .timeline
                .bind(py)
                .call_method1("GetItemsInTrack", (track.kind.as_str(), track.index))
                .map_err(call_err)?;

            if items.is_none() {
                return Ok(Vec::new());
            }

            // Dict keyed by 1-based item index; iteration order is host order
            let items = if items.is_instance_of::<PyDict>() {
                items.call_method0("values").map_err(call_err)?
            } else {
                items
            };

            let mut starts = Vec::new();
            for item in items.try_iter().map_err(call_err)? {
                let item = item.map_err(call_err)?;
                starts.push(start_frame(&item).map_err(call_err)?);
            }
            Ok(starts)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_paths_include_modules_dir() {
        let paths = script_paths(PathBuf::from("/opt/resolve/Developer/Scripting"));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/opt/resolve/Developer/Scripting"),
                PathBuf::from("/opt/resolve/Developer/Scripting/Modules"),
            ]
        );
    }
}
