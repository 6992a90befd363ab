// results folder structure:
// results/
// |- {label}/
// |  \- stats.txt
// |- summary.csv
// \- plots/
//    |- ipc.png
//    \- ...

use crate::Config;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub fn get_summary_path(config: &Config) -> PathBuf {
    config.results_dir.join(&config.summary_file)
}

pub fn get_plot_dir(config: &Config) -> PathBuf {
    config.results_dir.join(&config.plot_dir)
}

/// Run label of a stats file: the name of its parent directory
pub fn get_run_label<P: AsRef<Path>>(stats_path: P) -> String {
    stats_path
        .as_ref()
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Find `{results_dir}/*/{stats_file}`, sorted by path
pub fn discover_runs<P: AsRef<Path>>(
    results_dir: P,
    stats_file: &str,
) -> anyhow::Result<Vec<PathBuf>> {
    let results_dir = results_dir.as_ref();
    let mut paths = vec![];
    for entry in std::fs::read_dir(results_dir)
        .with_context(|| format!("Unable to list {}", results_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let stats_path = entry.path().join(stats_file);
        if stats_path.is_file() {
            paths.push(stats_path);
        } else {
            log::debug!("{} has no {}", entry.path().display(), stats_file);
        }
    }
    paths.sort();
    Ok(paths)
}
