use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{backend::CrosstermBackend, prelude::*};
use tracing::info;

use cfgsheet::app::{App, AppMode};
use cfgsheet::config::{self, CliOverrides};
use cfgsheet::export::ExportFormat;
use cfgsheet::worker::{WorkerRequest, WorkerResponse, start_file_worker};
use cfgsheet::{logging, ui};

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit a configuration CSV and export it as CSV or YAML")]
struct Args {
    /// CSV file to open on start
    #[arg(value_name = "CSV_PATH")]
    csv_path: Option<PathBuf>,

    /// Rows per page
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,

    /// Directory that receives edited.csv / edited.yaml
    #[arg(short = 'o', long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Config file (TOML); defaults to <config dir>/cfgsheet/config.toml
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file; filter with RUST_LOG
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(logging::default_log_path);
    let _log_guard = logging::init(&log_path)?;

    let file_config = config::load_file(args.config.as_deref()).context("loading config")?;
    let cli = CliOverrides {
        page_size: args.page_size.map(|n| n as usize),
        out_dir: args.out_dir.clone(),
    };
    let config = config::resolve(&file_config, &cli);
    info!(?config, "starting");

    // File worker channels
    let (req_tx, req_rx) = crossbeam_channel::unbounded::<WorkerRequest>();
    let (resp_tx, resp_rx) = crossbeam_channel::unbounded::<WorkerResponse>();
    std::thread::spawn(move || start_file_worker(req_rx, resp_tx));

    let mut app = App::new(config, req_tx, resp_rx);
    if let Some(path) = args.csv_path {
        app.request_load(path);
    }

    let mut terminal = setup_terminal()?;
    let res = run_app(&mut terminal, &mut app, Duration::from_millis(100));
    restore_terminal(terminal)?;
    if let Err(e) = res {
        eprintln!("Error: {e:?}");
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();
    // Redraw only when state changes or on tick
    let mut dirty = true;
    loop {
        // Process worker responses without blocking
        while let Ok(msg) = app.resp_rx.try_recv() {
            app.handle_worker_response(msg);
            dirty = true;
        }

        let tick_due = last_tick.elapsed() >= tick_rate;
        if dirty || tick_due {
            terminal.draw(|f| ui::draw(f, app))?;
            dirty = false;
            if tick_due {
                last_tick = Instant::now();
            }
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.mode {
                AppMode::Normal => handle_key_normal(app, key.code),
                AppMode::Editing { .. } => handle_key_editing(app, key),
                AppMode::OpenPrompt => handle_key_prompt(app, key),
            }
            dirty = true;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_normal(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.move_cell_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_cell_down(),
        KeyCode::Left | KeyCode::Char('h') => app.move_cell_left(),
        KeyCode::Right | KeyCode::Char('l') => app.move_cell_right(),
        KeyCode::PageDown => app.next_page(),
        KeyCode::PageUp => app.prev_page(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_page_size(1),
        KeyCode::Char('-') | KeyCode::Char('_') => app.change_page_size(-1),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit_cell(),
        KeyCode::Char(' ') => app.toggle_current_row_flag(),
        KeyCode::Char('x') => app.toggle_current_row_hidden(),
        KeyCode::Char('t') => app.cycle_current_value_kind(),
        KeyCode::Char('c') => app.toggle_current_column(),
        KeyCode::Char('R') => app.restore_all_columns(),
        KeyCode::Char('E') => app.export(ExportFormat::Csv),
        KeyCode::Char('Y') => app.export(ExportFormat::Structured),
        KeyCode::Char('o') => app.begin_open_prompt(),
        _ => {}
    }
}

fn handle_key_editing(app: &mut App, key: event::KeyEvent) {
    use crossterm::event::KeyCode::*;

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        Char('s') if ctrl => app.submit_cell_edit(),
        Enter => app.edit_input_newline(),
        Esc => app.cancel_edit_cell(),
        Backspace => app.edit_input_backspace(),
        Delete => app.edit_input_delete(),
        Left => app.edit_input_left(),
        Right => app.edit_input_right(),
        Home => app.edit_input_home(),
        End => app.edit_input_end(),
        Tab => app.edit_input_insert('\t'),
        // ignore other control chords in insert
        Char(c) if !ctrl => app.edit_input_insert(c),
        _ => {}
    }
}

fn handle_key_prompt(app: &mut App, key: event::KeyEvent) {
    use crossterm::event::KeyCode::*;

    match key.code {
        Enter => app.submit_prompt(),
        Esc => app.cancel_prompt(),
        Backspace => app.prompt_backspace(),
        Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.prompt_insert(c),
        _ => {}
    }
}
