use std::path::Path;
use std::process;

use lrtable_core::{Executor, Symbol, Trace, Verdict};

use super::{load_table, read_json, EXIT_FATAL, EXIT_REJECTED};
use crate::config::ParserSettings;
use crate::{report_error, OutputFormat};

pub(crate) struct ParseOptions<'a> {
    pub table: &'a Path,
    pub input: &'a str,
    pub overrides: Option<&'a Path>,
    pub settings: &'a ParserSettings,
    pub trace: bool,
    pub output: OutputFormat,
    pub quiet: bool,
}

/// Split raw input on whitespace and append the end marker.
pub(crate) fn tokenize(input: &str, end_marker: &str) -> Vec<Symbol> {
    input
        .split_whitespace()
        .map(str::to_string)
        .chain(std::iter::once(end_marker.to_string()))
        .collect()
}

pub(crate) fn cmd_parse(opts: ParseOptions<'_>) {
    let mut model = load_table(opts.table, opts.output, opts.quiet)
        .with_start_state(opts.settings.start_state());

    if let Some(path) = opts.overrides {
        let doc = read_json(path, "override", opts.output, opts.quiet);
        match lrtable_interchange::overrides_from_value(&doc) {
            Ok(overrides) => {
                log::debug!(
                    "applying {} override cells from {}",
                    overrides.len(),
                    path.display()
                );
                model = model.with_overrides(overrides);
            }
            Err(e) => {
                let msg = format!(
                    "error: invalid override document {}: {}",
                    path.display(),
                    e
                );
                report_error(&msg, opts.output, opts.quiet);
                process::exit(EXIT_REJECTED);
            }
        }
    }

    let tokens = tokenize(opts.input, opts.settings.end_marker());
    let executor = Executor::new(&model, &tokens);

    let (verdict, trace) = if opts.trace {
        let (verdict, trace) = executor.run_traced();
        (verdict, Some(trace))
    } else {
        (executor.run(), None)
    };

    if !opts.quiet {
        match opts.output {
            OutputFormat::Json => print_json(&verdict, trace.as_ref()),
            OutputFormat::Text => print_text(&verdict, trace.as_ref()),
        }
    }

    match verdict {
        Verdict::Accepted => {}
        Verdict::Rejected(_) => process::exit(EXIT_REJECTED),
        Verdict::Fatal(_) => process::exit(EXIT_FATAL),
    }
}

fn print_json(verdict: &Verdict, trace: Option<&Trace>) {
    let mut json = verdict.to_json();
    if let Some(t) = trace {
        json["trace"] = t.to_json();
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&json)
            .unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}

fn print_text(verdict: &Verdict, trace: Option<&Trace>) {
    if let Some(t) = trace {
        print!("{}", t);
    }
    match verdict {
        Verdict::Fatal(_) => eprintln!("{}", verdict),
        _ => println!("{}", verdict),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_appends_end_marker() {
        assert_eq!(tokenize("id  +\tid", "$"), vec!["id", "+", "id", "$"]);
        assert_eq!(tokenize("   ", "<eof>"), vec!["<eof>"]);
    }
}
