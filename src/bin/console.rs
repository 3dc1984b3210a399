//! Scan Console - interactive capture TUI
//!
//! Terminal front-end for the capture station: editable store code, barcode
//! and date fields, live row listing, and one-key export/share. Scanner
//! decodes arrive over the same TCP intake as the daemon.
//!
//! Keyboard shortcuts:
//! - Tab / Shift+Tab: cycle input focus (store code / barcode / date)
//! - Enter: add a row from the fields (empty barcode takes the staged scan)
//! - Ctrl-E: export CSV
//! - Ctrl-S: share the latest export
//! - Esc: quit
//!
//! Usage:
//!   cargo run --bin scan-console -- --config config/dev.toml

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use scan_station::domain::types::{CaptureEvent, SessionView};
use scan_station::infra::{Config, Metrics};
use scan_station::io::{start_scanner_listener, CommandShare, ScannerListenerConfig};
use scan_station::services::CaptureController;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

// ============================================================================
// CLI Args
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "scan-console")]
#[command(about = "Interactive barcode capture console")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

// ============================================================================
// Input state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Store,
    Barcode,
    Date,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Store => Focus::Barcode,
            Focus::Barcode => Focus::Date,
            Focus::Date => Focus::Store,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Store => Focus::Date,
            Focus::Barcode => Focus::Store,
            Focus::Date => Focus::Barcode,
        }
    }
}

#[derive(Debug)]
struct ConsoleState {
    store: String,
    barcode: String,
    date: String,
    focus: Focus,
    // Last values pushed to the controller, to skip redundant sends
    committed_store: String,
    committed_date: String,
}

impl ConsoleState {
    fn new(store: &str) -> Self {
        Self {
            store: store.to_string(),
            barcode: String::new(),
            date: String::new(),
            focus: if store.is_empty() { Focus::Store } else { Focus::Barcode },
            committed_store: store.to_string(),
            committed_date: String::new(),
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::Store => &mut self.store,
            Focus::Barcode => &mut self.barcode,
            Focus::Date => &mut self.date,
        }
    }

    /// Push store code and date to the controller if they changed
    async fn commit_context(&mut self, event_tx: &mpsc::Sender<CaptureEvent>) {
        if self.store != self.committed_store {
            self.committed_store = self.store.clone();
            let _ = event_tx.send(CaptureEvent::SetStoreCode(self.store.clone())).await;
        }
        if self.date != self.committed_date {
            self.committed_date = self.date.clone();
            let date = if self.date.trim().is_empty() { None } else { Some(self.date.clone()) };
            let _ = event_tx.send(CaptureEvent::SetDate(date)).await;
        }
    }
}

// ============================================================================
// UI Rendering
// ============================================================================

fn draw_ui(f: &mut Frame, view: &SessionView, state: &ConsoleState, station_id: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Fields + rows
            Constraint::Length(3), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_header(f, chunks[0], view, station_id);
    draw_main(f, chunks[1], view, state);
    draw_status(f, chunks[2], view);
    draw_help(f, chunks[3]);
}

fn draw_header(f: &mut Frame, area: Rect, view: &SessionView, station_id: &str) {
    let station = Span::styled(format!("{station_id}  "), Style::default().fg(Color::Cyan));
    let rows = Span::raw(format!("Total rows: {}  ", view.count()));
    let staged = if view.pending_barcode.is_some() {
        Span::styled("staged scan waiting", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };

    let header = Paragraph::new(Line::from(vec![station, rows, staged])).block(
        Block::default()
            .title(" Scan Console ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn draw_main(f: &mut Frame, area: Rect, view: &SessionView, state: &ConsoleState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_fields(f, chunks[0], view, state);
    draw_rows(f, chunks[1], view);
}

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let marker = if focused { "▸ " } else { "  " };
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::raw(marker),
        Span::raw(format!("{label:<11}")),
        Span::styled(format!("{value}{cursor}"), style),
    ])
}

fn draw_fields(f: &mut Frame, area: Rect, view: &SessionView, state: &ConsoleState) {
    let barcode_value = if state.barcode.is_empty() {
        match &view.pending_barcode {
            Some(staged) => format!("(staged: {staged})"),
            None => String::new(),
        }
    } else {
        state.barcode.clone()
    };
    let date_value = if state.date.is_empty() {
        "(today)".to_string()
    } else {
        state.date.clone()
    };

    let lines = vec![
        field_line("Store code", state.store.clone(), state.focus == Focus::Store),
        field_line("Barcode", barcode_value, state.focus == Focus::Barcode),
        field_line("Date", date_value, state.focus == Focus::Date),
    ];

    let para = Paragraph::new(lines).block(
        Block::default()
            .title(" Entry (Tab=focus, Enter=add) ")
            .borders(Borders::ALL),
    );

    f.render_widget(para, area);
}

fn draw_rows(f: &mut Frame, area: Rect, view: &SessionView) {
    let visible = (area.height as usize).saturating_sub(2);
    let skip = view.rows.len().saturating_sub(visible);

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(idx, row)| ListItem::new(format!("{}. {}", idx + 1, row)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" Rows ({}) ", view.count()))
            .borders(Borders::ALL),
    );

    f.render_widget(list, area);
}

fn draw_status(f: &mut Frame, area: Rect, view: &SessionView) {
    let status = Paragraph::new(view.status.as_str())
        .style(Style::default().fg(Color::Green))
        .block(Block::default().title(" Status ").borders(Borders::ALL));

    f.render_widget(status, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = "Tab=focus  Enter=add  Ctrl-E=export  Ctrl-S=share  Esc=quit";
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, area);
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config::load_from_path(&args.config);
    let station_id = config.station_id().to_string();

    // Shared components and channels
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let metrics = Arc::new(Metrics::new());
    let (view_tx, view_rx) = watch::channel(SessionView::default());
    let (event_tx, event_rx) = mpsc::channel(256);

    // Scanner intake feeds the same controller as the daemon
    let scanner_config = ScannerListenerConfig {
        port: config.scanner_listener_port(),
        enabled: config.scanner_listener_enabled(),
    };
    let scanner_tx = event_tx.clone();
    let scanner_metrics = metrics.clone();
    tokio::spawn(async move {
        let _ =
            start_scanner_listener(scanner_config, scanner_tx, scanner_metrics, shutdown_rx).await;
    });

    // Capture controller on its own task
    let share_target = Arc::new(CommandShare::new(config.share_command(), config.share_args()));
    let mut controller = CaptureController::new(&config, share_target, metrics, view_tx);
    let controller_handle = tokio::spawn(async move {
        controller.run(event_rx).await;
    });

    let mut state = ConsoleState::new(config.default_store_code());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        // Draw
        {
            let view = view_rx.borrow().clone();
            terminal.draw(|f| draw_ui(f, &view, &state, &station_id))?;
        }

        // Handle input
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

                    match key.code {
                        KeyCode::Esc => break,
                        KeyCode::Char('c') if ctrl => break,

                        KeyCode::Char('e') if ctrl => {
                            state.commit_context(&event_tx).await;
                            let _ = event_tx.send(CaptureEvent::Export).await;
                        }
                        KeyCode::Char('s') if ctrl => {
                            let _ = event_tx.send(CaptureEvent::ShareLatest).await;
                        }

                        KeyCode::Tab => {
                            state.commit_context(&event_tx).await;
                            state.focus = state.focus.next();
                        }
                        KeyCode::BackTab => {
                            state.commit_context(&event_tx).await;
                            state.focus = state.focus.prev();
                        }

                        KeyCode::Enter => {
                            state.commit_context(&event_tx).await;
                            let barcode = if state.barcode.trim().is_empty() {
                                None
                            } else {
                                Some(state.barcode.trim().to_string())
                            };
                            let _ = event_tx.send(CaptureEvent::ManualAdd { barcode }).await;
                            state.barcode.clear();
                        }

                        KeyCode::Backspace => {
                            state.field_mut().pop();
                        }
                        KeyCode::Char(c) if !ctrl => {
                            state.field_mut().push(c);
                        }

                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    // Cleanup
    let _ = shutdown_tx.send(true);
    drop(event_tx);
    let _ = controller_handle.await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
