use tracing::{debug, warn};

use crate::error::{Result, TableError};

/// Cell text that marks a row as carrying a flag cell.
pub const COMMENT_MARKER: &str = "comment";
/// Suffix appended to the comment-content cell while a row is flagged.
pub const ADD_SUFFIX: &str = " [ADD]";
/// Header name of the column holding configuration keys.
pub const KEY_COLUMN: &str = "key";

/// Kinds a value can take; stored in the column left of `key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Boolean,
    Number,
    Comment,
    Literal,
    EscapeString,
}

impl ValueKind {
    pub const ALL: [ValueKind; 6] = [
        ValueKind::String,
        ValueKind::Boolean,
        ValueKind::Number,
        ValueKind::Comment,
        ValueKind::Literal,
        ValueKind::EscapeString,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::Comment => "comment",
            ValueKind::Literal => "literal",
            ValueKind::EscapeString => "escape_string",
        }
    }

    pub fn from_cell(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    /// Trailing flag cell, present only on rows containing a `comment` cell.
    pub flag: Option<bool>,
}

impl Row {
    fn new(cells: Vec<String>) -> Self {
        let flag = cells.iter().any(|c| c == COMMENT_MARKER).then_some(false);
        Self { cells, flag }
    }

    pub fn width(&self) -> usize {
        self.cells.len() + usize::from(self.flag.is_some())
    }

    /// Index of the first cell whose text contains `comment`. The cell right
    /// after it holds the comment content touched by the row flag.
    ///
    /// This is a substring match on values, not a header lookup, so a value
    /// like `"no comments"` also qualifies.
    pub fn find_comment_column(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.contains(COMMENT_MARKER))
    }

    fn apply_add_marker(&mut self, flagged: bool) {
        let Some(target) = self.find_comment_column().map(|i| i + 1) else {
            return;
        };
        let Some(cell) = self.cells.get_mut(target) else {
            return;
        };
        if flagged {
            if !cell.ends_with(ADD_SUFFIX) {
                cell.push_str(ADD_SUFFIX);
            }
        } else if let Some(stripped) = cell.strip_suffix(ADD_SUFFIX) {
            *cell = stripped.to_string();
        }
    }
}

/// Parsed sheet plus per-row flag and visibility state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
    flags: Vec<bool>,
    hidden: Vec<bool>,
}

impl Table {
    /// Build a table from a header row and data rows.
    ///
    /// Rows shorter than the header are padded with empty cells and longer
    /// rows are cut to the header width. A `comment` cell past the header
    /// width still gives the row its flag cell.
    ///
    /// A header whose names are all empty is rejected: no column could be
    /// addressed by name, so neither export has anything to key on.
    pub fn load(header: Vec<String>, data_rows: Vec<Vec<String>>) -> Result<Self> {
        if header.iter().all(|h| h.is_empty()) {
            return Err(TableError::parse("header row has no columns"));
        }

        let width = header.len();
        let rows: Vec<Row> = data_rows
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| {
                // flag is decided on the full parsed row, before truncation
                let mut row = Row::new(cells);
                if row.cells.len() > width {
                    warn!(
                        "row {} has {} cells, header has {}; extra cells dropped",
                        idx + 1,
                        row.cells.len(),
                        width
                    );
                }
                row.cells.resize(width, String::new());
                row
            })
            .collect();

        let n = rows.len();
        Ok(Self {
            header,
            rows,
            flags: vec![false; n],
            hidden: vec![false; n],
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    pub fn flag(&self, row: usize) -> Option<bool> {
        self.flags.get(row).copied()
    }

    pub fn is_row_hidden(&self, row: usize) -> bool {
        self.hidden.get(row).copied().unwrap_or(false)
    }

    /// Replace one cell. The trailing flag cell accepts `true`/`false` only.
    pub fn edit_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let target = self.rows.get_mut(row).ok_or(TableError::Index { row, col })?;

        if col < target.cells.len() {
            debug!(row, col, "cell edited");
            target.cells[col] = value;
            return Ok(());
        }
        if col == target.cells.len() && target.flag.is_some() {
            let wanted: bool = value
                .trim()
                .parse()
                .map_err(|_| TableError::InvalidFlag(value.clone()))?;
            if self.flags[row] != wanted {
                self.toggle_row_flag(row)?;
            }
            return Ok(());
        }
        Err(TableError::Index { row, col })
    }

    /// Flip the row flag and add/remove the `[ADD]` marker on the comment
    /// content cell. Returns the new flag value.
    pub fn toggle_row_flag(&mut self, row: usize) -> Result<bool> {
        let target = self
            .rows
            .get_mut(row)
            .ok_or(TableError::Index { row, col: 0 })?;
        let flagged = !self.flags[row];
        self.flags[row] = flagged;
        if target.flag.is_some() {
            target.flag = Some(flagged);
        }
        target.apply_add_marker(flagged);
        debug!(row, flagged, "row flag toggled");
        Ok(flagged)
    }

    /// Display-only row visibility. Returns true when the row is now hidden.
    pub fn toggle_row_hidden(&mut self, row: usize) -> Result<bool> {
        let hidden = self
            .hidden
            .get_mut(row)
            .ok_or(TableError::Index { row, col: 0 })?;
        *hidden = !*hidden;
        Ok(*hidden)
    }

    /// Column holding the value kind: the one directly left of `key`.
    pub fn kind_column(&self) -> Option<usize> {
        self.column_index(KEY_COLUMN)?.checked_sub(1)
    }

    /// Advance the row's value kind to the next option. Unknown text restarts
    /// at `string`. `Ok(None)` when the sheet has no kind column.
    pub fn cycle_value_kind(&mut self, row: usize) -> Result<Option<ValueKind>> {
        let Some(col) = self.kind_column() else {
            return Ok(None);
        };
        let current = self
            .rows
            .get(row)
            .ok_or(TableError::Index { row, col })?
            .cells[col]
            .as_str();
        let next = ValueKind::from_cell(current).map_or(ValueKind::String, ValueKind::next);
        self.edit_cell(row, col, next.as_str())?;
        Ok(Some(next))
    }
}
