use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tool configuration, usually loaded from `configs/*.toml`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding one sub-directory per run
    pub results_dir: PathBuf,
    /// Stats file name inside each run directory
    pub stats_file: String,
    /// Summary table, relative to `results_dir`
    pub summary_file: String,
    /// Plot directory, relative to `results_dir`
    pub plot_dir: String,
    /// Resolution of saved plots
    pub dpi: u32,
    /// Figure width in inches
    pub figure_width: f64,
    /// Figure height in inches
    pub figure_height: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            results_dir: PathBuf::from("results"),
            stats_file: "stats.txt".to_string(),
            summary_file: "summary.csv".to_string(),
            plot_dir: "plots".to_string(),
            dpi: 180,
            figure_width: 10.0,
            figure_height: 4.0,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Unable to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Config;
    use std::path::PathBuf;

    #[test]
    fn test_partial() {
        let config: Config = toml::from_str("results_dir = \"out\"\ndpi = 90\n").unwrap();
        assert_eq!(config.results_dir, PathBuf::from("out"));
        assert_eq!(config.dpi, 90);
        assert_eq!(config.stats_file, "stats.txt");
        assert_eq!(config.figure_height, 4.0);
    }

    #[test]
    fn test_default_file() {
        let config = Config::load("configs/default.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("configs/does-not-exist.toml").unwrap_err();
        assert!(err.to_string().contains("does-not-exist.toml"));
    }

    #[test]
    fn test_serialize() {
        let text = toml::to_string(&Config::default()).unwrap();
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config, Config::default());
    }
}
