pub(crate) mod conflicts;
pub(crate) mod parse;

use std::path::Path;
use std::process;

use lrtable_core::TableModel;

use crate::{report_error, OutputFormat};

/// Exit code for rejected input and for load/I/O failures.
pub(crate) const EXIT_REJECTED: i32 = 1;
/// Exit code for table/executor integrity failures.
pub(crate) const EXIT_FATAL: i32 = 2;

/// Read and parse a JSON file, exiting with a report on failure.
pub(crate) fn read_json(
    path: &Path,
    what: &str,
    output: OutputFormat,
    quiet: bool,
) -> serde_json::Value {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error: {} file '{}': {}", what, path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(EXIT_REJECTED);
        }
    };

    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error: invalid JSON in {}: {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(EXIT_REJECTED);
        }
    }
}

/// Load a table document into a model, exiting with a report on failure.
pub(crate) fn load_table(path: &Path, output: OutputFormat, quiet: bool) -> TableModel {
    let doc = read_json(path, "table", output, quiet);
    match lrtable_interchange::from_table_document(&doc) {
        Ok(model) => {
            log::debug!(
                "loaded {} cells and {} productions from {}",
                model.table().len(),
                model.productions().len(),
                path.display()
            );
            model
        }
        Err(e) => {
            let msg = format!("error: invalid table document {}: {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(EXIT_REJECTED);
        }
    }
}
