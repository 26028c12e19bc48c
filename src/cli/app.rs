//! Interactive terminal app: symbol list, entry box, chart and status bar

use super::worker::{DisplayGate, WorkerEvent, spawn_request};
use crate::chart::figure::Figure;
use crate::chart::widget::FigureWidget;
use crate::core::history::Period;
use crate::core::pipeline::PricePipeline;
use crate::core::symbol::Symbol;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Popup {
    title: String,
    message: String,
}

pub struct App {
    pipeline: Arc<PricePipeline>,
    period: Period,
    symbols: Vec<String>,
    list_state: ListState,
    input: String,
    mode: InputMode,
    status: String,
    banner: Option<String>,
    /// Request currently running; the fetch trigger is disabled meanwhile.
    in_flight: Option<u64>,
    gate: DisplayGate,
    figure: Figure,
    cursor: Option<usize>,
    popup: Option<Popup>,
    should_quit: bool,
}

impl App {
    pub fn new(pipeline: Arc<PricePipeline>, symbols: Vec<String>, period: Period) -> Self {
        let mut list_state = ListState::default();
        if !symbols.is_empty() {
            list_state.select(Some(0));
        }
        App {
            pipeline,
            period,
            symbols,
            list_state,
            input: String::new(),
            mode: InputMode::Normal,
            status: "Idle".to_string(),
            banner: None,
            in_flight: None,
            gate: DisplayGate::default(),
            figure: Figure::new(),
            cursor: None,
            popup: None,
            should_quit: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn selected_symbol(&self) -> Option<&str> {
        self.list_state
            .selected()
            .and_then(|i| self.symbols.get(i))
            .map(String::as_str)
    }

    fn show_error(&mut self, title: &str, message: String) {
        self.popup = Some(Popup {
            title: title.to_string(),
            message,
        });
    }

    /// Updates state for a key press. Returns the raw symbol text when the
    /// key asks for a fetch.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        if self.popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.popup = None;
            }
            return None;
        }

        match self.mode {
            InputMode::Editing => match key.code {
                KeyCode::Enter => {
                    self.mode = InputMode::Normal;
                    Some(self.input.clone())
                }
                KeyCode::Esc => {
                    self.mode = InputMode::Normal;
                    None
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    None
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    None
                }
                _ => None,
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                    None
                }
                KeyCode::Char('/') | KeyCode::Char('i') => {
                    self.mode = InputMode::Editing;
                    None
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.list_state.select_previous();
                    self.input.clear();
                    None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.list_state.select_next();
                    self.input.clear();
                    None
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    self.move_cursor(-1);
                    None
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.move_cursor(1);
                    None
                }
                KeyCode::Char('p') => {
                    let next = Period::ALL
                        .iter()
                        .position(|p| *p == self.period)
                        .map_or(0, |i| (i + 1) % Period::ALL.len());
                    self.period = Period::ALL[next];
                    None
                }
                KeyCode::Enter | KeyCode::Char('f') => {
                    if self.input.trim().is_empty() {
                        Some(self.selected_symbol().unwrap_or_default().to_string())
                    } else {
                        Some(self.input.clone())
                    }
                }
                _ => None,
            },
        }
    }

    fn move_cursor(&mut self, step: isize) {
        let count = self.figure.axes().hover.len();
        if count == 0 {
            return;
        }
        let current = self.cursor.unwrap_or(count - 1) as isize;
        self.cursor = Some((current + step).clamp(0, count as isize - 1) as usize);
    }

    /// Starts a request for `raw` unless one is running or the symbol is
    /// unusable. Returns the request id and the normalized symbol.
    pub fn trigger(&mut self, raw: &str) -> Option<(u64, Symbol)> {
        if self.is_busy() {
            debug!("Fetch ignored; a request is already running");
            return None;
        }
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(e) => {
                let message = if raw.trim().is_empty() {
                    "Please select or enter a stock symbol.".to_string()
                } else {
                    e.to_string()
                };
                self.show_error(e.kind(), message);
                return None;
            }
        };

        let id = self.gate.next_id();
        self.in_flight = Some(id);
        self.status = format!("Fetching {symbol}...");
        Some((id, symbol))
    }

    /// Applies a message from a worker task.
    pub fn apply(&mut self, event: WorkerEvent) {
        if event.is_final() && self.in_flight == Some(event.id()) {
            self.in_flight = None;
        }
        if !self.gate.is_fresh(event.id()) {
            debug!("Dropping stale result for request {}", event.id());
            return;
        }

        match event {
            WorkerEvent::Fetched {
                symbol, records, ..
            } => {
                self.status = format!("Fetched {records} records for {symbol}.");
            }
            WorkerEvent::Ready {
                id,
                symbol,
                series,
                rate,
            } => {
                self.gate.accept(id);
                let result =
                    self.pipeline
                        .renderer()
                        .render(&symbol, &series, rate, Some(&mut self.figure));
                match result {
                    Ok(rendered) => {
                        self.banner = Some(rendered.rate.banner());
                        self.cursor = rendered.axes().hover.len().checked_sub(1);
                        self.status = format!("Plot displayed for {symbol}.");
                    }
                    Err(e) => {
                        warn!("Plotting failed: {}", e);
                        self.status = "Error".to_string();
                        self.show_error(e.kind(), e.to_string());
                    }
                }
            }
            WorkerEvent::Failed { error, .. } => {
                warn!("Request failed: {}", error);
                self.status = "Error".to_string();
                self.show_error(error.kind(), format!("Failed to fetch data: {error}"));
            }
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let [header, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        let [sidebar, chart] =
            Layout::horizontal([Constraint::Length(24), Constraint::Min(20)]).areas(body);
        let [list_area, input_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(sidebar);

        let mut title = vec![
            Span::styled(
                "📈 Stock Price Tracker",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  period {}", self.period),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if let Some(banner) = &self.banner {
            title.push(Span::raw("  "));
            title.push(Span::styled(banner.clone(), Style::default().fg(Color::Green)));
        }
        frame.render_widget(Line::from(title), header);

        let items: Vec<ListItem> = self
            .symbols
            .iter()
            .map(|s| ListItem::new(s.as_str()))
            .collect();
        let list = List::new(items)
            .block(Block::bordered().title("Symbols"))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        let input_style = match self.mode {
            InputMode::Editing => Style::default().fg(Color::Yellow),
            InputMode::Normal => Style::default(),
        };
        frame.render_widget(
            Paragraph::new(self.input.as_str())
                .style(input_style)
                .block(Block::bordered().title("Stock Symbol")),
            input_area,
        );

        if self.figure.axes().is_blank() {
            frame.render_widget(
                Paragraph::new("Pick a symbol and press Enter to fetch and plot.")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::bordered()),
                chart,
            );
        } else {
            frame.render_widget(FigureWidget::new(&self.figure).cursor(self.cursor), chart);
        }

        let hints = if self.is_busy() {
            "  busy"
        } else {
            "  ↑↓ select  / type  Enter fetch  ←→ hover  p period  q quit"
        };
        frame.render_widget(
            Line::from(vec![
                Span::styled(self.status.clone(), Style::default().fg(Color::White)),
                Span::styled(hints, Style::default().fg(Color::DarkGray)),
            ])
            .style(Style::default().bg(Color::Rgb(30, 30, 30))),
            status,
        );

        if let Some(popup) = &self.popup {
            let area = centered(frame.area(), 50, 7);
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(popup.message.as_str())
                    .wrap(Wrap { trim: true })
                    .block(
                        Block::bordered()
                            .title(popup.title.as_str())
                            .title_bottom("Enter to close")
                            .border_style(Style::default().fg(Color::Red)),
                    ),
                area,
            );
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Runs the app until the user quits. Requests run on worker tasks; their
/// results are drained here between frames.
pub async fn run(
    pipeline: Arc<PricePipeline>,
    symbols: Vec<String>,
    period: Period,
) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = run_loop(&mut terminal, App::new(pipeline, symbols, period)).await;
    ratatui::restore();
    result
}

async fn run_loop(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    while !app.should_quit {
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(raw) = app.handle_key(key) {
                    if let Some((id, symbol)) = app.trigger(&raw) {
                        spawn_request(
                            Arc::clone(&app.pipeline),
                            id,
                            symbol.to_string(),
                            app.period,
                            tx.clone(),
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
