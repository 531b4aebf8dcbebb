use std::cmp::min;
use std::ops::Range;
use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, warn};

use crate::codec::ParsedCsv;
use crate::columns::ColumnSelection;
use crate::config::Config;
use crate::editor::TextEditor;
use crate::error::TableError;
use crate::export::{self, ExportFormat};
use crate::paging::{self, PageWindow};
use crate::session::Session;
use crate::table::Row;
use crate::worker::{WorkerRequest, WorkerResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Editing {
        row: usize, // absolute row index
        col: usize,
    },
    OpenPrompt,
}

pub struct App {
    pub should_quit: bool,

    // UI state
    pub mode: AppMode,
    pub status: String,
    pub config: Config,

    // Loaded sheet
    pub session: Option<Session>,
    pub page: PageWindow,

    // Cell selection, row relative to the current page
    pub sel_row: usize,
    pub sel_col: usize,

    // Editing
    pub editor: TextEditor,
    pub prompt_buffer: String,

    // Channels
    pub req_tx: Sender<WorkerRequest>,
    pub resp_rx: Receiver<WorkerResponse>,
}

impl App {
    pub fn new(config: Config, req_tx: Sender<WorkerRequest>, resp_rx: Receiver<WorkerResponse>) -> Self {
        let page = PageWindow::new(config.page_size);
        Self {
            should_quit: false,
            mode: AppMode::Normal,
            status: "Press o to open a CSV file, q to quit.".into(),
            config,
            session: None,
            page,
            sel_row: 0,
            sel_col: 0,
            editor: TextEditor::default(),
            prompt_buffer: String::new(),
            req_tx,
            resp_rx,
        }
    }

    pub fn request_load(&mut self, path: PathBuf) {
        self.status = format!("Loading {}...", path.display());
        let _ = self.req_tx.send(WorkerRequest::Load { path });
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Loaded { path, parsed } => self.apply_loaded(path, parsed),
            WorkerResponse::Written {
                ok,
                path,
                format,
                message,
            } => {
                self.status = if ok {
                    format!("Exported {} to {}", format.label(), path.display())
                } else {
                    format!(
                        "Export failed: {}",
                        message.unwrap_or_else(|| "unknown error".into())
                    )
                };
            }
            WorkerResponse::Error(msg) => {
                self.status = format!("Error: {msg}");
            }
        }
    }

    /// Swap in a freshly parsed sheet. A sheet that fails to load leaves the
    /// current one in place.
    pub fn apply_loaded(&mut self, path: PathBuf, parsed: ParsedCsv) {
        let source = path.display().to_string();
        match Session::replace(&mut self.session, source, parsed) {
            Ok(()) => {
                self.mode = AppMode::Normal;
                self.page.index = 0;
                self.sel_row = 0;
                self.sel_col = 0;
                let rows = self.row_count();
                self.status = format!("Loaded {} ({} rows)", path.display(), rows);
            }
            Err(e) => {
                warn!("load of {} rejected: {e}", path.display());
                self.status = format!("Load failed: {e}");
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.table.row_count())
    }

    pub fn column_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.table.header().len())
    }

    pub fn page_count(&self) -> usize {
        if self.config.features.pagination {
            paging::page_count(self.row_count(), self.page.size)
        } else {
            usize::from(self.row_count() > 0)
        }
    }

    /// Absolute row range shown on screen.
    pub fn visible_range(&self) -> Range<usize> {
        let total = self.row_count();
        if !self.config.features.pagination {
            return 0..total;
        }
        let start = min(self.page.offset(), total);
        start..min(start + self.page.size, total)
    }

    pub fn page_rows(&self) -> &[Row] {
        match &self.session {
            Some(s) if self.config.features.pagination => {
                paging::page(s.table.rows(), self.page.index, self.page.size)
            }
            Some(s) => s.table.rows(),
            None => &[],
        }
    }

    /// Absolute index of the selected row.
    pub fn current_row(&self) -> Option<usize> {
        let range = self.visible_range();
        let row = range.start + self.sel_row;
        range.contains(&row).then_some(row)
    }

    pub fn current_column_name(&self) -> Option<&str> {
        self.session
            .as_ref()?
            .table
            .header()
            .get(self.sel_col)
            .map(|s| s.as_str())
    }

    pub fn current_cell_text(&self) -> Option<&str> {
        let row = self.current_row()?;
        self.session
            .as_ref()?
            .table
            .row(row)?
            .cells
            .get(self.sel_col)
            .map(|s| s.as_str())
    }

    // ===== Navigation =====

    pub fn move_cell_left(&mut self) {
        self.sel_col = self.sel_col.saturating_sub(1);
    }

    pub fn move_cell_right(&mut self) {
        self.sel_col = min(self.sel_col + 1, self.column_count().saturating_sub(1));
    }

    pub fn move_cell_up(&mut self) {
        if self.sel_row > 0 {
            self.sel_row -= 1;
        } else if self.config.features.pagination && self.page.prev() {
            self.sel_row = self.visible_range().len().saturating_sub(1);
        }
    }

    pub fn move_cell_down(&mut self) {
        let last = self.visible_range().len().saturating_sub(1);
        if self.sel_row < last {
            self.sel_row += 1;
        } else if self.config.features.pagination && self.page.next(self.row_count()) {
            self.sel_row = 0;
        }
    }

    pub fn next_page(&mut self) {
        if self.config.features.pagination && self.page.next(self.row_count()) {
            self.clamp_selection();
            self.status = format!("Page {} of {}", self.page.index + 1, self.page_count());
        }
    }

    pub fn prev_page(&mut self) {
        if self.config.features.pagination && self.page.prev() {
            self.clamp_selection();
            self.status = format!("Page {} of {}", self.page.index + 1, self.page_count());
        }
    }

    /// Grow or shrink the page by `delta` rows, keeping the page index valid.
    pub fn change_page_size(&mut self, delta: isize) {
        if !self.config.features.pagination {
            return;
        }
        let size = self.page.size.saturating_add_signed(delta).max(1);
        self.page.set_size(size, self.row_count());
        self.clamp_selection();
        self.status = format!("{} rows per page", self.page.size);
    }

    fn clamp_selection(&mut self) {
        self.page.clamp(self.row_count());
        self.sel_row = min(self.sel_row, self.visible_range().len().saturating_sub(1));
        self.sel_col = min(self.sel_col, self.column_count().saturating_sub(1));
    }

    // ===== Row and column toggles =====

    pub fn toggle_current_row_flag(&mut self) {
        if !self.config.features.flag_toggle {
            self.status = "Row flags are disabled".into();
            return;
        }
        let Some(row) = self.current_row() else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            match session.table.toggle_row_flag(row) {
                Ok(true) => self.status = format!("Row {}: [ADD] on", row + 1),
                Ok(false) => self.status = format!("Row {}: [ADD] off", row + 1),
                Err(e) => self.report(e),
            }
        }
    }

    pub fn toggle_current_row_hidden(&mut self) {
        let Some(row) = self.current_row() else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            match session.table.toggle_row_hidden(row) {
                Ok(hidden) => {
                    self.status = format!(
                        "Row {} {}",
                        row + 1,
                        if hidden { "collapsed" } else { "expanded" }
                    )
                }
                Err(e) => self.report(e),
            }
        }
    }

    pub fn cycle_current_value_kind(&mut self) {
        let Some(row) = self.current_row() else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            match session.table.cycle_value_kind(row) {
                Ok(Some(kind)) => self.status = format!("Row {}: kind {}", row + 1, kind.as_str()),
                Ok(None) => self.status = "No kind column (needs a column left of `key`)".into(),
                Err(e) => self.report(e),
            }
        }
    }

    pub fn toggle_current_column(&mut self) {
        if !self.config.features.column_selection {
            self.status = "Column selection is disabled".into();
            return;
        }
        let Some(name) = self.current_column_name().map(str::to_string) else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.columns.toggle(&name);
            let enabled = session.columns.is_enabled(&name).unwrap_or(true);
            self.status = format!(
                "Column {name} {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
    }

    pub fn restore_all_columns(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.columns.restore_all();
            self.status = "All columns restored".into();
        }
    }

    // ===== Cell editing =====

    pub fn begin_edit_cell(&mut self) {
        let Some(row) = self.current_row() else {
            return;
        };
        let col = self.sel_col;
        if let AppMode::Editing { row: erow, col: ecol } = self.mode
            && erow == row
            && ecol == col
        {
            return;
        }
        let Some(current) = self.current_cell_text().map(str::to_string) else {
            return;
        };
        self.editor = TextEditor::new(current);
        self.mode = AppMode::Editing { row, col };
        self.status = "Editing: Enter new line, Ctrl-S save, Esc cancel".into();
    }

    pub fn cancel_edit_cell(&mut self) {
        self.mode = AppMode::Normal;
        self.status = "Edit cancelled".into();
    }

    pub fn submit_cell_edit(&mut self) {
        let AppMode::Editing { row, col } = self.mode else {
            return;
        };
        self.mode = AppMode::Normal;
        let value = std::mem::take(&mut self.editor).into_text();
        if let Some(session) = self.session.as_mut() {
            match session.table.edit_cell(row, col, value) {
                Ok(()) => self.status = format!("Cell ({}, {}) updated", row + 1, col + 1),
                Err(e) => self.report(e),
            }
        }
    }

    pub fn edit_input_insert(&mut self, ch: char) {
        self.editor.insert(ch);
    }
    pub fn edit_input_newline(&mut self) {
        self.editor.insert_newline();
    }
    pub fn edit_input_backspace(&mut self) {
        self.editor.backspace();
    }
    pub fn edit_input_delete(&mut self) {
        self.editor.delete();
    }
    pub fn edit_input_left(&mut self) {
        self.editor.left();
    }
    pub fn edit_input_right(&mut self) {
        self.editor.right();
    }
    pub fn edit_input_home(&mut self) {
        self.editor.home();
    }
    pub fn edit_input_end(&mut self) {
        self.editor.end();
    }

    // ===== Open-file prompt =====

    pub fn begin_open_prompt(&mut self) {
        self.mode = AppMode::OpenPrompt;
        self.prompt_buffer.clear();
        self.status = "Open CSV: type a path and Enter (Esc to cancel)".into();
    }

    pub fn prompt_insert(&mut self, ch: char) {
        self.prompt_buffer.push(ch);
    }

    pub fn prompt_backspace(&mut self) {
        self.prompt_buffer.pop();
    }

    pub fn cancel_prompt(&mut self) {
        self.mode = AppMode::Normal;
        self.prompt_buffer.clear();
        self.status = "Open cancelled".into();
    }

    pub fn submit_prompt(&mut self) {
        self.mode = AppMode::Normal;
        let path = std::mem::take(&mut self.prompt_buffer);
        let path = path.trim();
        if path.is_empty() {
            self.status = "Open cancelled".into();
        } else {
            self.request_load(PathBuf::from(path));
        }
    }

    // ===== Export =====

    /// Build the payload for `format` and hand it to the worker for writing.
    pub fn export(&mut self, format: ExportFormat) {
        let Some(session) = self.session.as_ref() else {
            self.status = "Nothing to export (no file loaded)".into();
            return;
        };
        let contents = match format {
            ExportFormat::Csv if self.config.features.column_selection => {
                export::export_csv(&session.table, &session.columns)
            }
            ExportFormat::Csv => export::export_csv(
                &session.table,
                &ColumnSelection::all_enabled(session.table.header()),
            ),
            ExportFormat::Structured => Ok(export::export_structured_with(
                &session.table,
                &self.config.environments,
            )),
        };
        match contents {
            Ok(contents) => {
                let path = self.config.export_path(format);
                info!(format = format.label(), bytes = contents.len(), "export requested");
                self.status = format!("Exporting {} to {}...", format.label(), path.display());
                let _ = self.req_tx.send(WorkerRequest::Write {
                    path,
                    format,
                    contents,
                });
            }
            Err(e) => self.report(e),
        }
    }

    fn report(&mut self, e: TableError) {
        error!("{e}");
        self.status = format!("Error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::config::FeatureSet;

    const SHEET: &str = "title,type,key,common,develop\n\
                         Timeout,number,app.timeout,5,10\n\
                         Note,comment,#note,,\n\
                         Port,number,server.port,,8080\n";

    fn app_with(config: Config) -> (App, Receiver<WorkerRequest>) {
        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (_resp_tx, resp_rx) = crossbeam_channel::unbounded();
        let mut app = App::new(config, req_tx, resp_rx);
        app.apply_loaded(PathBuf::from("sheet.csv"), codec::parse(SHEET).unwrap());
        (app, req_rx)
    }

    fn app() -> (App, Receiver<WorkerRequest>) {
        app_with(Config::default())
    }

    fn written(rx: &Receiver<WorkerRequest>) -> (PathBuf, String) {
        match rx.try_recv().unwrap() {
            WorkerRequest::Write { path, contents, .. } => (path, contents),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn edit_flow_updates_the_table() {
        let (mut app, _rx) = app();
        app.sel_col = 3;
        app.begin_edit_cell();
        assert_eq!(app.mode, AppMode::Editing { row: 0, col: 3 });
        app.edit_input_backspace();
        app.edit_input_insert('7');
        app.submit_cell_edit();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.current_cell_text(), Some("7"));
    }

    #[test]
    fn cancelled_edit_leaves_cell_alone() {
        let (mut app, _rx) = app();
        app.sel_col = 3;
        app.begin_edit_cell();
        app.edit_input_insert('9');
        app.cancel_edit_cell();
        assert_eq!(app.current_cell_text(), Some("5"));
    }

    #[test]
    fn paging_moves_selection_across_pages() {
        let mut config = Config::default();
        config.page_size = 2;
        let (mut app, _rx) = app_with(config);
        assert_eq!(app.page_count(), 2);
        assert_eq!(app.page_rows().len(), 2);
        app.move_cell_down();
        app.move_cell_down();
        assert_eq!(app.page.index, 1);
        assert_eq!(app.current_row(), Some(2));
        app.move_cell_down();
        assert_eq!(app.current_row(), Some(2));
        app.move_cell_up();
        assert_eq!(app.page.index, 0);
        assert_eq!(app.current_row(), Some(1));
        app.next_page();
        assert_eq!(app.page_rows().len(), 1);
        assert_eq!(app.current_row(), Some(2));
    }

    #[test]
    fn shrinking_rows_per_page_clamps_the_view() {
        let mut config = Config::default();
        config.page_size = 1;
        let (mut app, _rx) = app_with(config);
        app.next_page();
        app.next_page();
        assert_eq!(app.current_row(), Some(2));
        app.change_page_size(2);
        assert_eq!(app.page.size, 3);
        assert_eq!(app.page.index, 0);
        assert_eq!(app.sel_row, 0);
        app.change_page_size(-10);
        assert_eq!(app.page.size, 1);
    }

    #[test]
    fn pagination_feature_off_shows_everything() {
        let mut config = Config::default();
        config.page_size = 1;
        config.features.pagination = false;
        let (mut app, _rx) = app_with(config);
        assert_eq!(app.page_rows().len(), 3);
        assert_eq!(app.page_count(), 1);
        app.next_page();
        assert_eq!(app.visible_range(), 0..3);
    }

    #[test]
    fn flag_toggle_marks_comment_row() {
        let (mut app, _rx) = app();
        app.sel_row = 1;
        app.toggle_current_row_flag();
        let table = &app.session.as_ref().unwrap().table;
        assert_eq!(table.rows()[1].cells[2], "#note [ADD]");
        assert_eq!(table.flag(1), Some(true));
    }

    #[test]
    fn disabled_features_are_no_ops() {
        let config = Config {
            features: FeatureSet {
                column_selection: false,
                pagination: true,
                flag_toggle: false,
            },
            ..Config::default()
        };
        let (mut app, rx) = app_with(config);
        app.sel_row = 1;
        app.toggle_current_row_flag();
        app.sel_col = 4;
        app.toggle_current_column();
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.table.flag(1), Some(false));
        assert_eq!(session.columns.is_enabled("develop"), Some(true));

        app.export(ExportFormat::Csv);
        let (_, contents) = written(&rx);
        assert!(contents.contains("\"10\""));
    }

    #[test]
    fn csv_export_respects_column_selection() {
        let (mut app, rx) = app();
        app.sel_col = 4;
        app.toggle_current_column();
        app.export(ExportFormat::Csv);
        let (path, contents) = written(&rx);
        assert_eq!(path, PathBuf::from("./edited.csv"));
        assert!(contents.starts_with("\"title\",\"type\",\"key\",\"common\",\"develop\"\r\n"));
        assert!(!contents.contains("\"10\""));
        assert!(!contents.contains("8080"));

        app.restore_all_columns();
        app.export(ExportFormat::Csv);
        let (_, contents) = written(&rx);
        assert!(contents.contains("\"10\""));
    }

    #[test]
    fn yaml_export_uses_configured_environments() {
        let (mut app, rx) = app();
        app.export(ExportFormat::Structured);
        let (path, contents) = written(&rx);
        assert_eq!(path, PathBuf::from("./edited.yaml"));
        assert_eq!(
            contents,
            format!(
                "{}\napp.timeout: 5\n#note\nserver.port: 8080",
                export::YAML_BANNER
            )
        );

        app.config.environments = vec!["develop".into(), "common".into()];
        app.export(ExportFormat::Structured);
        let (_, contents) = written(&rx);
        assert!(contents.contains("app.timeout: 10"));
    }

    #[test]
    fn failed_reload_keeps_current_sheet() {
        let (mut app, _rx) = app();
        app.sel_row = 1;
        app.toggle_current_row_hidden();
        let bad = ParsedCsv {
            header: vec![String::new()],
            rows: vec![],
        };
        app.apply_loaded(PathBuf::from("bad.csv"), bad);
        assert!(app.status.starts_with("Load failed"));
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.source, "sheet.csv");
        assert!(session.table.is_row_hidden(1));
    }

    #[test]
    fn open_prompt_sends_load_request() {
        let (mut app, rx) = app();
        app.begin_open_prompt();
        for ch in "next.csv".chars() {
            app.prompt_insert(ch);
        }
        app.submit_prompt();
        assert_eq!(app.mode, AppMode::Normal);
        match rx.try_recv().unwrap() {
            WorkerRequest::Load { path } => assert_eq!(path, PathBuf::from("next.csv")),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn kind_cycle_on_current_row() {
        let (mut app, _rx) = app();
        app.cycle_current_value_kind();
        let table = &app.session.as_ref().unwrap().table;
        assert_eq!(table.rows()[0].cells[1], "comment");
    }

    #[test]
    fn export_without_sheet_is_reported() {
        let (req_tx, rx) = crossbeam_channel::unbounded();
        let (_resp_tx, resp_rx) = crossbeam_channel::unbounded();
        let mut app = App::new(Config::default(), req_tx, resp_rx);
        app.export(ExportFormat::Csv);
        assert!(rx.try_recv().is_err());
        assert!(app.status.starts_with("Nothing to export"));
    }
}
