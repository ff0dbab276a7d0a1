// src/tui/mod.rs
use crate::core::portfolio::{pnl_table_totals, PNL_TABLE_OFFSETS};
use crate::core::simulation::{DashboardView, InstrumentView};
use crate::types::{Command, Notification, NotificationKind, UiEvent};
use crate::utils::format::{dollars, dollars_or_dash, market_cap, percent, signed_dollars, volume};
use crossterm::{
    cursor::Show,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Sparkline, Table, Wrap},
    Terminal,
};
use std::{io, time::Duration};
use tokio::sync::mpsc;

const GAIN: Color = Color::Rgb(0, 212, 160);
const LOSS: Color = Color::Rgb(255, 77, 109);
const AMBER: Color = Color::Rgb(251, 191, 36);

fn trend_color(value: f64) -> Color {
    if value >= 0.0 {
        GAIN
    } else {
        LOSS
    }
}

fn kind_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Entry => GAIN,
        NotificationKind::Sell => LOSS,
        NotificationKind::Hold => AMBER,
    }
}

pub struct App {
    pub view: Option<DashboardView>,
    pub selected: usize,
    pub logs: Vec<String>,
    /// P&L tracker instead of the watchlist/detail panes.
    pub show_pnl: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: None,
            selected: 0,
            logs: Vec::new(),
            show_pnl: false,
        }
    }

    pub fn on_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Snapshot(view) => {
                self.view = Some(*view);
            }
            UiEvent::Log(msg) => {
                self.logs.push(msg);
                if self.logs.len() > 20 {
                    self.logs.remove(0);
                }
            }
        }
    }

    fn selected_instrument(&self) -> Option<&InstrumentView> {
        self.view.as_ref()?.instruments.get(self.selected)
    }

    fn instrument_count(&self) -> usize {
        self.view.as_ref().map_or(0, |v| v.instruments.len())
    }

    /// Maps a key press to an engine command; navigation is handled locally.
    pub fn on_key(&mut self, key: KeyCode) -> Option<Command> {
        match key {
            KeyCode::Char('q') => Some(Command::Shutdown),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.instrument_count() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('p') => {
                self.show_pnl = !self.show_pnl;
                None
            }
            KeyCode::Char('a') => self
                .selected_instrument()
                .map(|i| Command::Activate(i.meta.ticker.to_string())),
            KeyCode::Char('x') => self
                .view
                .as_ref()
                .and_then(|v| v.toasts.first())
                .map(|n| Command::DismissToast(n.id)),
            KeyCode::Char('m') => Some(Command::MarkAllRead),
            KeyCode::Char('c') => Some(Command::ClearLog),
            KeyCode::Char('R') => Some(Command::Reset),
            _ => None,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw mode and the alternate screen, undone on drop so an error anywhere
/// in `run` still hands the shell back intact.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    }
}

pub async fn run(
    mut rx: mpsc::Receiver<UiEvent>,
    commands: mpsc::Sender<Command>,
) -> anyhow::Result<()> {
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                if let Some(command) = app.on_key(code) {
                    let quit = command == Command::Shutdown;
                    // engine may already be gone on quit
                    let _ = commands.send(command).await;
                    if quit {
                        break;
                    }
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.on_event(event);
        }
    }

    Ok(())
}

fn ui(f: &mut ratatui::Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(10),
        ])
        .split(f.size());

    let Some(view) = app.view.as_ref() else {
        let waiting = Paragraph::new("Waiting for data...")
            .block(Block::default().borders(Borders::ALL).title("APEX MKTS"));
        f.render_widget(waiting, rows[0]);
        return;
    };

    render_header(f, rows[0], view);

    if app.show_pnl {
        render_pnl(f, rows[1], view);
    } else {
        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(40)])
            .split(rows[1]);
        render_rail(f, middle[0], view, app.selected);
        if let Some(inst) = view.instruments.get(app.selected) {
            render_detail(f, middle[1], inst);
        }
    }

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    render_notifications(f, bottom[0], "Alerts", &view.toasts);
    render_log(f, bottom[1], view, &app.logs);
}

fn render_header(f: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let p = &view.portfolio;
    let tick = view
        .last_tick
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    let header = Paragraph::new(Line::from(vec![
        Span::styled("APEX MKTS", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" | Portfolio: "),
        Span::styled(
            dollars(p.value, 0),
            Style::default().fg(trend_color(p.pnl)).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!("{} ({})", signed_dollars(p.pnl, 0), percent(p.return_pct)),
            Style::default().fg(trend_color(p.pnl)),
        ),
        Span::raw(format!(" | LIVE {} | unread {}", tick, view.unread)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(header, area);
}

fn render_rail(f: &mut ratatui::Frame, area: Rect, view: &DashboardView, selected: usize) {
    let items: Vec<ListItem> = view
        .instruments
        .iter()
        .enumerate()
        .map(|(i, inst)| {
            let marker = if i == selected { ">" } else { " " };
            let badge = match (&inst.assessment, inst.pending) {
                (Some(a), _) => format!(
                    " {} {} {}",
                    a.rating.icon(),
                    "\u{25AE}".repeat(usize::from(a.rating.strength())),
                    a.rating
                ),
                (None, true) => " LOADING...".to_string(),
                (None, false) => String::new(),
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {:<5}", marker, inst.meta.ticker)),
                Span::styled(
                    format!(
                        "{:>11} {:>7}",
                        dollars(inst.state.price, 2),
                        percent(inst.state.pct_change)
                    ),
                    Style::default().fg(trend_color(inst.state.pct_change)),
                ),
                Span::styled(badge, Style::default().fg(AMBER)),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Watchlist"));
    f.render_widget(list, area);
}

fn render_detail(f: &mut ratatui::Frame, area: Rect, inst: &InstrumentView) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    let s = &inst.state;
    let m = inst.meta;
    let stats = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("{} \u{00B7} {} \u{00B7} {}  ", m.ticker, m.name, m.sector),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "{} {} ({})",
                    dollars(s.price, 2),
                    signed_dollars(s.change, 2),
                    percent(s.pct_change)
                ),
                Style::default().fg(trend_color(s.pct_change)),
            ),
        ]),
        Line::from(format!(
            "Open {}  High {}  Low {}  Vol {}  Mkt Cap {}",
            dollars(s.open, 2),
            dollars(s.high, 2),
            dollars(s.low, 2),
            volume(s.volume),
            market_cap(m.market_cap)
        )),
        Line::from(format!(
            "P/E {}x  EPS {}  Beta {:.2}  Div {}%  52W {}\u{2013}{}  Held {} @ {} P&L {}",
            m.pe,
            dollars(m.eps, 2),
            m.beta,
            m.dividend_yield,
            dollars(m.low_52w, 2),
            dollars(m.high_52w, 2),
            inst.position.shares,
            dollars(inst.position.entry, 2),
            signed_dollars(inst.position.pnl, 0),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title("Quote"));
    f.render_widget(stats, parts[0]);

    let scaled = scale_history(&s.history);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title("30-Day History"))
        .data(&scaled)
        .style(Style::default().fg(trend_color(s.pct_change)));
    f.render_widget(spark, parts[1]);

    let lines = match (&inst.assessment, &inst.guidance) {
        (Some(a), Some(g)) => {
            let ep = &a.entry_point;
            let ss = &a.sell_sentiment;
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} {}  ", a.rating.icon(), a.rating),
                        Style::default().fg(AMBER).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(
                        "Target {} ({})  {} \u{00B7} {} \u{00B7} {}",
                        dollars(a.target_price, 2),
                        percent(a.upside_pct),
                        ep.urgency.label(),
                        a.hold_strategy.optimal_hold,
                        ss.sell_signal.label()
                    )),
                ]),
                Line::from(format!(
                    "Entry {} zone {}\u{2013}{}{}  gauge {:.0}%",
                    dollars(ep.ideal_entry, 2),
                    dollars(ep.entry_low, 2),
                    dollars(ep.entry_high, 2),
                    if g.in_entry_zone { "  PRICE IN ZONE" } else { "" },
                    g.entry_gauge_pct
                )),
                Line::from(format!(
                    "Target {}  Trigger {}  Stop {}",
                    dollars(ss.profit_target, 2),
                    dollars_or_dash(ss.sell_trigger_price),
                    dollars(ss.stop_loss, 2)
                )),
                Line::from(
                    g.sell_ladder
                        .iter()
                        .map(|(level, p)| format!("{} {}", level.label(), dollars(*p, 2)))
                        .collect::<Vec<_>>()
                        .join("  >  "),
                ),
            ];
            if !a.thesis.is_empty() {
                lines.push(Line::from(a.thesis.clone()));
            }
            lines
        }
        _ if inst.pending => vec![Line::from("LOADING...")],
        _ => vec![Line::from("Press 'a' to activate AI signals")],
    };
    let guidance = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Signals"));
    f.render_widget(guidance, parts[2]);
}

fn offset_label(offset: i32) -> String {
    if offset == 0 {
        "Today".to_string()
    } else {
        format!("{}d", offset)
    }
}

fn pnl_cell(value: f64) -> Cell<'static> {
    Cell::from(signed_dollars(value, 0)).style(Style::default().fg(trend_color(value)))
}

fn render_pnl(f: &mut ratatui::Frame, area: Rect, view: &DashboardView) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(5)])
        .split(area);

    let latest = view.pnl_series.last().copied().unwrap_or(0.0);
    let scaled = scale_history(&view.pnl_series);
    let spark = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("30-Day P&L {}", signed_dollars(latest, 0))),
        )
        .data(&scaled)
        .style(Style::default().fg(trend_color(latest)));
    f.render_widget(spark, parts[0]);

    let header = Row::new(
        std::iter::once(Cell::from("Ticker"))
            .chain(PNL_TABLE_OFFSETS.iter().map(|&d| Cell::from(offset_label(d)))),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let mut rows: Vec<Row> = view
        .pnl_table
        .iter()
        .map(|(ticker, values)| {
            Row::new(
                std::iter::once(Cell::from(*ticker))
                    .chain(values.iter().map(|&v| pnl_cell(v))),
            )
        })
        .collect();
    let totals = pnl_table_totals(&view.pnl_table);
    rows.push(
        Row::new(
            std::iter::once(Cell::from("PORTFOLIO TOTAL"))
                .chain(totals.iter().map(|&v| pnl_cell(v))),
        )
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let widths = std::iter::once(Constraint::Length(16))
        .chain(PNL_TABLE_OFFSETS.iter().map(|_| Constraint::Length(10)));
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("P&L Tracker"));
    f.render_widget(table, parts[1]);
}

fn notification_item(n: &Notification) -> ListItem<'_> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{} \u{00B7} {} ", n.kind.title(), n.ticker),
            Style::default().fg(kind_color(n.kind)),
        ),
        Span::raw(n.message.as_str()),
        Span::styled(
            format!("  {}", n.timestamp.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

fn render_notifications(f: &mut ratatui::Frame, area: Rect, title: &str, items: &[Notification]) {
    let list = List::new(items.iter().map(notification_item).collect::<Vec<_>>())
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(list, area);
}

fn render_log(f: &mut ratatui::Frame, area: Rect, view: &DashboardView, logs: &[String]) {
    let mut items: Vec<ListItem> = logs
        .iter()
        .rev()
        .map(|s| ListItem::new(Line::from(Span::raw(s.as_str()))))
        .collect();
    items.extend(view.log.iter().map(notification_item));

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Signal Log \u{00B7} {}", view.log.len())),
    );
    f.render_widget(list, area);
}

/// Sparkline wants u64; shift the window so its minimum sits at zero.
fn scale_history(history: &[f64]) -> Vec<u64> {
    let min = history.iter().copied().fold(f64::INFINITY, f64::min);
    history
        .iter()
        .map(|p| ((p - min) * 100.0).round().max(0.0) as u64)
        .collect()
}
