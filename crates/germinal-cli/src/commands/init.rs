//! Write a starting configuration.

use anyhow::{Context, Result};
use colored::Colorize;
use germinal_runtime::config::GcConfig;
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let base_path = match path {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing germinal project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        GcConfig::template()
            .save(&config_path)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    println!();
    println!("Next steps:");
    println!("  {} edit {}", "1.".blue(), CONFIG_FILE);
    println!("  {} germinal check", "2.".blue());
    println!("  {} germinal run", "3.".blue());

    Ok(())
}
