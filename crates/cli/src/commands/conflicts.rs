use std::path::Path;
use std::process;

use serde_json::json;

use super::{load_table, EXIT_REJECTED};
use crate::OutputFormat;

/// List every conflict cell; exits 1 when the table has any.
pub(crate) fn cmd_conflicts(table: &Path, output: OutputFormat, quiet: bool) {
    let model = load_table(table, output, quiet);
    let conflicts = model.conflicts();

    if !quiet {
        match output {
            OutputFormat::Json => {
                let list: Vec<serde_json::Value> = conflicts
                    .iter()
                    .map(|c| {
                        let candidates: Vec<String> =
                            c.candidates.iter().map(|a| a.to_string()).collect();
                        json!({
                            "state": c.state.as_str(),
                            "symbol": c.symbol,
                            "candidates": candidates,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "conflicts": list }))
                        .unwrap_or_default()
                );
            }
            OutputFormat::Text => {
                if conflicts.is_empty() {
                    println!("no conflicts");
                } else {
                    println!("{} conflict(s):", conflicts.len());
                    for c in &conflicts {
                        let candidates: Vec<String> =
                            c.candidates.iter().map(|a| a.to_string()).collect();
                        println!(
                            "  state {}, symbol '{}': {}",
                            c.state,
                            c.symbol,
                            candidates.join(" | ")
                        );
                    }
                }
            }
        }
    }

    if !conflicts.is_empty() {
        process::exit(EXIT_REJECTED);
    }
}
