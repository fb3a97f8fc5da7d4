//! Validate a configuration.

use anyhow::{Context, Result};
use colored::Colorize;
use germinal_policy::prelude::*;
use germinal_runtime::policy_set::PolicySet;
use std::path::PathBuf;

use crate::config;

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let (config, path) = config::load(path)?;
    let policies = PolicySet::from_config(&config)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    config.run.validate().context("Invalid [run] section")?;

    println!("{} {} is valid", "✓".green().bold(), path.display());
    println!();
    print_policies(&policies);
    println!();
    println!("{}", "Run".bold());
    match config.run.seed {
        Some(seed) => println!("  seed:           {}", seed.to_string().cyan()),
        None => println!("  seed:           {}", "entropy".cyan()),
    }
    println!("  cycles:         {}", config.run.cycles.to_string().cyan());
    println!("  population cap: {}", config.run.population_cap.to_string().cyan());
    println!("  receptor bits:  {}", config.run.receptor_bits.to_string().cyan());
    println!("  epitopes:       {}", config.run.epitopes.to_string().cyan());

    Ok(())
}

fn print_policies(policies: &PolicySet) {
    println!("{}", "Policies".bold());

    let signaling = match &policies.signaling {
        SignalingPolicy::Threshold(t) => format!(
            "{} (dies below {})",
            policies.signaling.model().name(),
            t.threshold
        ),
        SignalingPolicy::Langmuir(_) => policies.signaling.model().name().to_string(),
    };
    println!("  signaling:  {}", signaling.cyan());

    println!(
        "  plasma:     {}",
        format!(
            "p = {}, affinity >= {}",
            policies.plasma.probability().value(),
            policies.plasma.affinity_threshold()
        )
        .cyan()
    );
    println!(
        "  memory:     {}",
        format!("p = {}", policies.memory.probability().value()).cyan()
    );
    println!(
        "  re-entry:   {}",
        format!("p = {}", policies.reentry.probability().value()).cyan()
    );

    let division = match &policies.division {
        DivisionPolicy::FixedCount(d) => format!("fixed-count ({})", d.count()),
        DivisionPolicy::MeanCaptureRatio(d) => {
            format!("mean-capture-ratio (max {})", d.max_division_count())
        }
    };
    println!("  division:   {}", division.cyan());

    let germline = &policies.germline;
    println!(
        "  germline:   {}",
        format!(
            "{} x {} = {} founders, affinity >= {}, budget {} attempts",
            germline.germline_count(),
            germline.replication_factor(),
            germline.founder_count(),
            germline.affinity_threshold(),
            germline.attempt_budget()
        )
        .cyan()
    );
}
