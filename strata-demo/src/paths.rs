//! Where the demo keeps its config and logs.
//!
//! XDG directories on Linux, the platform's standard locations elsewhere.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use directories::ProjectDirs;

/// Log written by the current run.
const LATEST_LOG: &str = "latest.log";

/// Archived logs kept next to the latest one.
const KEPT_LOGS: usize = 10;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "strata", "strata-demo")
}

/// Layer config, read at startup when present.
///
/// - Linux: `~/.config/strata-demo/strata.json`
/// - macOS: `~/Library/Application Support/dev.strata.strata-demo/strata.json`
/// - Windows: `%APPDATA%\strata\strata-demo\config\strata.json`
pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("strata.json"))
}

/// Archive the previous run's log and return the path for this run's.
///
/// The log directory is the platform cache directory. It is created if
/// missing.
pub fn prepare_log_file() -> Option<PathBuf> {
    let dir = project_dirs()?.cache_dir().to_path_buf();
    fs::create_dir_all(&dir).ok()?;
    let latest = dir.join(LATEST_LOG);

    // Archives are named after when they were replaced.
    if latest.exists() {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let _ = fs::rename(&latest, dir.join(format!("{}.log", stamp)));
    }
    prune_archives(&dir);
    Some(latest)
}

/// Delete archived logs beyond the newest `KEPT_LOGS`.
fn prune_archives(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut archives: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .filter_map(|e| Some((e.metadata().ok()?.modified().ok()?, e.path())))
        .collect();

    archives.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in archives.into_iter().skip(KEPT_LOGS) {
        let _ = fs::remove_file(path);
    }
}
