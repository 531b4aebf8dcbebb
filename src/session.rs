use tracing::info;

use crate::codec::ParsedCsv;
use crate::columns::ColumnSelection;
use crate::error::Result;
use crate::table::Table;

/// Everything one loaded file owns. Built as a whole and replaced as a whole.
#[derive(Debug, Clone)]
pub struct Session {
    pub source: String,
    pub table: Table,
    pub columns: ColumnSelection,
}

impl Session {
    pub fn load(source: impl Into<String>, parsed: ParsedCsv) -> Result<Self> {
        let table = Table::load(parsed.header, parsed.rows)?;
        let columns = ColumnSelection::all_enabled(table.header());
        let source = source.into();
        info!(
            source = %source,
            columns = table.header().len(),
            rows = table.row_count(),
            "sheet loaded"
        );
        Ok(Self {
            source,
            table,
            columns,
        })
    }

    /// Replace `current` with a freshly loaded session. On error `current` is
    /// left as it was.
    pub fn replace(
        current: &mut Option<Session>,
        source: impl Into<String>,
        parsed: ParsedCsv,
    ) -> Result<()> {
        *current = Some(Session::load(source, parsed)?);
        Ok(())
    }
}
