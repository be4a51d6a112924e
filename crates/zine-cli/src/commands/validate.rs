//! Scope config validation command

use anyhow::{bail, Context, Result};
use zine_particles::ScopeConfig;

pub fn run(path: &str, format: &str) -> Result<()> {
    let config = ScopeConfig::load(path).with_context(|| format!("Failed to load config {path}"))?;
    let violations: Vec<String> = config.violations().iter().map(|e| e.to_string()).collect();

    match format {
        "json" => {
            let report = serde_json::json!({
                "config": path,
                "valid": violations.is_empty(),
                "violations": violations,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "text" => {
            if violations.is_empty() {
                println!("{path}: ok");
            } else {
                println!("{path}: {} violation(s)", violations.len());
                for v in &violations {
                    println!("  - {v}");
                }
            }
        }
        other => bail!("unknown format '{other}'; valid values: text, json"),
    }

    if !violations.is_empty() {
        bail!("{} violation(s) in {path}", violations.len());
    }
    Ok(())
}
