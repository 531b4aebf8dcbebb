//! CSV parse/unparse adapter around the csv crate.
//!
//! Parsing is RFC 4180 compliant and deliberately lenient about ragged rows:
//! width normalisation happens when the rows are loaded into a [`Table`].
//!
//! [`Table`]: crate::table::Table

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use crate::error::{Result, TableError};

/// Raw result of parsing a sheet: the first record and everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsv {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse CSV text. The first record becomes the header.
pub fn parse(content: &str) -> Result<ParsedCsv> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.map_err(|e| TableError::Parse {
            message: e.to_string(),
            line: Some(line_num + 1),
        })?;
        records.push(record.iter().map(|s| s.to_string()).collect());
    }

    let mut records = records.into_iter();
    let header = records
        .next()
        .ok_or_else(|| TableError::parse("input has no header row"))?;
    Ok(ParsedCsv {
        header,
        rows: records.collect(),
    })
}

/// Serialize records with every field quoted, CRLF between records and no
/// trailing terminator. `None` fields are written as empty fields.
pub fn unparse<'a, I, R>(records: I) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = Option<&'a str>>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .flexible(true)
        .from_writer(Vec::new());

    for record in records {
        let fields: Vec<&str> = record.into_iter().map(|f| f.unwrap_or("")).collect();
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TableError::Csv(e.into_error().into()))?;
    let mut out = String::from_utf8(bytes)?;
    if out.ends_with("\r\n") {
        out.truncate(out.len() - 2);
    }
    Ok(out)
}
