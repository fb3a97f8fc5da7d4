//! Seed a germinal center and run cycles with the bit-string model.

use anyhow::{Context, Result};
use colored::Colorize;
use germinal_runtime::export::{summarize, to_json};
use germinal_runtime::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config;

pub fn run(
    path: Option<PathBuf>,
    cycles: Option<usize>,
    seed: Option<u64>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let (mut config, path) = config::load(path)?;
    if let Some(cycles) = cycles {
        config.run.cycles = cycles;
    }
    if seed.is_some() {
        config.run.seed = seed;
    }

    let policies = Arc::new(
        PolicySet::from_config(&config)
            .with_context(|| format!("Invalid config: {}", path.display()))?,
    );
    let mut rng = match config.run.seed {
        Some(seed) => SimRng::seeded(seed),
        None => SimRng::from_entropy(),
    };
    let mut hooks =
        BitHooks::from_config(&config.run, &mut rng).context("Invalid [run] section")?;
    let germlines = BitGermlines {
        width: config.run.receptor_bits,
    };

    let mut center: GerminalCenter<BitCell> = GerminalCenter::new(policies, rng);
    if !json {
        println!("{} Activating germlines...", "→".blue());
    }
    let founders = center
        .seed(hooks.pool(), &germlines)
        .context("Germline activation failed")?;
    if !json {
        println!("  Seeded: {} founder cells", founders.to_string().cyan());
    }

    let total = config.run.cycles;
    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} cycles")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let reports = center.run_with(total, &mut hooks, |report| {
        if verbose {
            pb.println(format!(
                "  cycle {}: {} entered, {} apoptotic, {} plasma, {} memory, mean affinity {:.3}",
                report.cycle,
                report.entered,
                report.apoptotic,
                report.plasma_exported,
                report.memory_exported,
                report.mean_affinity
            ));
        }
        pb.inc(1);
    })?;
    if reports.len() < total && center.is_extinct() {
        pb.println(format!("  {} population extinct", "!".red()));
    }
    pb.finish_and_clear();

    let summary = summarize(&reports, &center.stats());
    if json {
        println!("{}", to_json(&reports, &summary)?);
        return Ok(());
    }

    println!();
    println!("{} Simulation complete!", "✓".green().bold());
    println!("  Cycles:     {}", summary.cycles.to_string().cyan());
    println!(
        "  Affinity:   {} → {} (peak {})",
        format!("{:.3}", summary.initial_mean_affinity).yellow(),
        format!("{:.3}", summary.final_mean_affinity).green(),
        format!("{:.3}", summary.peak_affinity).green()
    );
    println!("  Apoptotic:  {}", summary.total_apoptotic.to_string().red());
    println!("  Plasma:     {}", summary.plasma_cells.to_string().green());
    println!("  Memory:     {}", summary.memory_cells.to_string().green());
    println!("  Population: {}", summary.final_population.to_string().cyan());

    Ok(())
}
