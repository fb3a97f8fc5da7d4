//! Locating and loading `germinal.toml` for the CLI.

use anyhow::{Context, Result};
use germinal_runtime::config::GcConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "germinal.toml";

/// Load the config at `path`, or the nearest `germinal.toml` above the
/// current directory.
pub fn load(path: Option<PathBuf>) -> Result<(GcConfig, PathBuf)> {
    let path = match path {
        Some(p) => p,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            find_config_file(&cwd).with_context(|| {
                format!("No {} found. Run `germinal init` first.", CONFIG_FILE)
            })?
        }
    };
    let config = GcConfig::load(&path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok((config, path))
}

/// Find germinal.toml in `start` or its parent directories.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        assert_eq!(find_config_file(&nested), Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn explicit_path_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        GcConfig::template().save(&path).unwrap();
        let (config, found) = load(Some(path.clone())).unwrap();
        assert_eq!(found, path);
        assert_eq!(config, GcConfig::template());
    }

    #[test]
    fn unreadable_path_has_context() {
        let err = load(Some(PathBuf::from("/nonexistent/germinal.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
