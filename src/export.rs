//! CSV and structured-text (YAML-like) exports of a [`Table`].

use std::collections::HashMap;

use tracing::debug;

use crate::codec;
use crate::columns::ColumnSelection;
use crate::error::Result;
use crate::table::{KEY_COLUMN, Table};

pub const YAML_BANNER: &str = "# THIS IS AN AUTO GENERATED FILE. Do not modify it directly.";

/// Environment columns in the order their values take precedence.
pub const DEFAULT_ENVIRONMENTS: [&str; 4] = ["common", "develop", "staging", "devRemote"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Structured,
}

impl ExportFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Structured => "text/plain",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "edited.csv",
            ExportFormat::Structured => "edited.yaml",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Structured => "YAML",
        }
    }
}

/// CSV of the full table, data cells filtered by column selection.
///
/// Disabled columns and empty values become empty fields; rows left with no
/// values are dropped. The header is always written unfiltered. Flag cells
/// are not part of the output.
pub fn export_csv(table: &Table, selection: &ColumnSelection) -> Result<String> {
    let header = table.header().iter().map(|h| Some(h.as_str())).collect::<Vec<_>>();

    let data = table.rows().iter().filter_map(|row| {
        let filtered: Vec<Option<&str>> = row
            .cells
            .iter()
            .enumerate()
            .map(|(i, v)| (selection.is_enabled_at(i) && !v.is_empty()).then_some(v.as_str()))
            .collect();
        filtered.iter().any(Option::is_some).then_some(filtered)
    });

    let records: Vec<Vec<Option<&str>>> = std::iter::once(header).chain(data).collect();
    debug!(records = records.len(), "csv export built");
    codec::unparse(records)
}

pub fn export_structured(table: &Table) -> String {
    export_structured_with(table, &DEFAULT_ENVIRONMENTS)
}

/// Flatten each row into `key: value` lines, taking the value from the first
/// environment column that has one. Column selection does not apply here.
/// Rows with an empty or missing `key` produce no line.
pub fn export_structured_with<S: AsRef<str>>(table: &Table, environments: &[S]) -> String {
    let mut lines = vec![YAML_BANNER.to_string()];

    for row in table.rows() {
        let values: HashMap<&str, &str> = table
            .header()
            .iter()
            .zip(&row.cells)
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let env_values = environments
            .iter()
            .map(|env| values.get(env.as_ref()).copied().unwrap_or(""));

        let key = values.get(KEY_COLUMN).copied().unwrap_or("");
        if key.is_empty() {
            continue;
        }

        if key.starts_with('#') {
            lines.extend(key.split('\n').map(str::to_string));
        } else if key.starts_with("app.") || key.starts_with("platform.") {
            if let Some(value) = env_values.map(format_value).find(|v| !v.is_empty()) {
                lines.push(format!("{key}: {value}"));
            }
        } else if let Some(value) = env_values.into_iter().find(|v| !v.is_empty()) {
            lines.push(format!("{key}: {value}"));
        }
    }

    lines.join("\n")
}

/// Multi-line values are kept verbatim; single-line values are trimmed.
fn format_value(value: &str) -> &str {
    if value.contains('\n') {
        value
    } else {
        value.trim()
    }
}
