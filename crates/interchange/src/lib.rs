//! lrtable-interchange: parse-table JSON documents to the core table model.
//!
//! Table generators emit the table, the numbered productions and, when
//! conflicts have been patched by hand, a sparse override table. This crate
//! turns those `serde_json::Value` documents into a
//! [`lrtable_core::TableModel`] so the automaton never sees raw JSON.

pub mod deserialize;

pub use deserialize::{from_table_document, overrides_from_value, parse_action, InterchangeError};
