use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs, Wrap};

use rugby_dashboard::config::{AppConfig, LayoutVariant};
use rugby_dashboard::dataset::{Dataset, DatasetCache, SessionRow};
use rugby_dashboard::export::{export_player_report, report_file_name};
use rugby_dashboard::metrics::Metric;
use rugby_dashboard::state::{
    AppState, MATCH_PLACEHOLDER, PLAYER_PLACEHOLDER, SidebarFocus, Tab,
};

const DARK_GREEN: Color = Color::Rgb(0x1b, 0x4d, 0x3e);
const DARK_GOLD: Color = Color::Rgb(0xb8, 0x86, 0x0b);

struct App<'a> {
    dataset: &'a Dataset,
    config: AppConfig,
    state: AppState,
    should_quit: bool,
}

impl<'a> App<'a> {
    fn new(dataset: &'a Dataset, config: AppConfig) -> Self {
        let mut state = AppState::new(dataset, config.layout);
        state.push_log(format!(
            "[INFO] {} sesiones cargadas de {}",
            dataset.len(),
            dataset.source().display()
        ));
        for notice in &config.notices {
            state.push_log(format!("[WARN] {notice}"));
        }
        Self {
            dataset,
            config,
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.state.help_overlay = false;
            } else if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('r') | KeyCode::Home => self.state.reset(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(self.dataset),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(self.dataset),
            KeyCode::Char('p') => self.state.focus = SidebarFocus::Players,
            KeyCode::Char('m') | KeyCode::Enter => self.state.toggle_focus(),
            KeyCode::Tab => self.state.cycle_tab(),
            KeyCode::Char('1') => self.state.set_tab(Tab::Match),
            KeyCode::Char('2') => self.state.set_tab(Tab::Comparison),
            KeyCode::Char('3') => self.state.set_tab(Tab::Evolution),
            KeyCode::Right | KeyCode::Char(']') => self.state.cycle_metric_next(),
            KeyCode::Left | KeyCode::Char('[') => self.state.cycle_metric_prev(),
            KeyCode::Char('x') => self.export_selected_player(),
            _ => {}
        }
    }

    fn export_selected_player(&mut self) {
        let Some(player) = self.state.selected_player().map(str::to_string) else {
            self.state.push_log("[INFO] Selecciona un jugador para exportar");
            return;
        };
        let path = self.config.export_dir.join(report_file_name(&player));
        match export_player_report(&path, self.dataset, &player) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Informe exportado: {} ({} partidos)",
                path.display(),
                report.history_rows
            )),
            Err(err) => self
                .state
                .push_log(format!("[WARN] Exportación fallida: {err:#}")),
        }
    }
}

fn main() -> Result<()> {
    let args = AppConfig::load_env();
    let env = |key: &str| std::env::var(key).ok();
    init_logging(AppConfig::resolve_log_file(&args, env))?;
    let config = AppConfig::resolve(&args, env);

    let cache = DatasetCache::new(config.csv_path.clone());
    let dataset = cache.get_or_load()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(dataset, config);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("dashboard loop failed")
}

fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file =
        File::create(&path).with_context(|| format!("create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("RUGBY_LOG", "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App<'_>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(30)])
        .split(chunks[1]);

    render_sidebar(frame, body[0], &app.state);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(5)])
        .split(body[1]);

    match app.state.selected_player() {
        None => render_welcome(frame, main[0]),
        Some(player) => render_player(frame, main[0], app, player),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Consola").borders(Borders::ALL));
    frame.render_widget(console, main[1]);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.selected_player() {
        Some(player) => format!("Estadísticas: {player}"),
        None => "Rugby Performance Dashboard".to_string(),
    };
    let line1 = format!("   __   {title}");
    let line2 = "  (__)  Solo filas Session".to_string();
    let line3 = String::new();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text() -> &'static str {
    "j/k/↑/↓ Mover | Enter/m Partido | p Jugador | Tab/1-3 Pestaña | ←/→ Métrica | x Exportar | r Inicio | ? Ayuda | q Salir"
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Menú de Selección")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Percentage(50),
            Constraint::Min(3),
        ])
        .split(inner);

    let reset = Paragraph::new("[r] Volver al Inicio")
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(reset, sections[0]);

    let players = std::iter::once(PLAYER_PLACEHOLDER).chain(state.players.iter().map(String::as_str));
    render_selector(
        frame,
        sections[1],
        "Jugador:",
        players.collect(),
        state.player_cursor,
        state.focus == SidebarFocus::Players,
    );

    if state.selected_player().is_some() {
        let matches = std::iter::once(MATCH_PLACEHOLDER).chain(state.match_labels.labels());
        render_selector(
            frame,
            sections[2],
            "Partido:",
            matches.collect(),
            state.match_cursor,
            state.focus == SidebarFocus::Matches,
        );
    }
}

fn render_selector(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<&str>,
    cursor: usize,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(DARK_GOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let (start, end) = visible_range(cursor, items.len(), inner.height as usize);
    let lines = (start..end)
        .map(|idx| {
            let selected = idx == cursor;
            let prefix = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::White).bg(DARK_GREEN)
            } else {
                Style::default()
            };
            Line::styled(format!("{prefix}{}", items[idx]), style)
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let text = "Bienvenido. Selecciona un jugador para comenzar.\n\nUsa j/k o ↑/↓ en el menú lateral.";
    let welcome = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(welcome, area);
}

fn render_player(frame: &mut Frame, area: Rect, app: &App, player: &str) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let layout = app.state.layout;
    let titles = Tab::ALL
        .iter()
        .map(|tab| tab.label(layout))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(app.state.tab.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(DARK_GOLD).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, sections[0]);

    match app.state.tab {
        Tab::Match => render_match_tab(frame, sections[1], app),
        Tab::Comparison => render_comparison_tab(frame, sections[1], app, player),
        Tab::Evolution => render_evolution_tab(frame, sections[1], app, player),
    }
}

fn render_prompt(frame: &mut Frame, area: Rect, text: &str) {
    let prompt = Paragraph::new(text)
        .style(Style::default().fg(DARK_GOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(prompt, area);
}

fn render_match_tab(frame: &mut Frame, area: Rect, app: &App) {
    let Some((label, _)) = app.state.selected_match() else {
        render_prompt(frame, area, "Selecciona un partido en el menú lateral.");
        return;
    };
    let Some(row) = app.state.current_row(app.dataset) else {
        render_prompt(frame, area, "Sin datos para este partido. Selecciona otro.");
        return;
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(Metric::ALL.map(|_| Constraint::Ratio(1, Metric::ALL.len() as u32)))
        .split(sections[0]);
    for (metric, card) in Metric::ALL.iter().zip(cards.iter()) {
        let value = Paragraph::new(format!("{:.1}", row.value(*metric)))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().title(metric.label()).borders(Borders::ALL));
        frame.render_widget(value, *card);
    }

    match app.state.layout {
        LayoutVariant::Classic => {
            let charts = metric_grid(sections[1]);
            for (metric, cell) in Metric::ALL.iter().zip(charts) {
                let chart = single_bar_chart(
                    format!("{} en {label}", metric.label()),
                    metric.label(),
                    row.value(*metric),
                );
                frame.render_widget(chart, cell);
            }
        }
        LayoutVariant::Compact => {
            frame.render_widget(match_overview_chart(label, row), sections[1]);
        }
    }
}

fn render_comparison_tab(frame: &mut Frame, area: Rect, app: &App, player: &str) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let metric = app.state.comparison_metric;
    let selector = Paragraph::new(format!("Métrica: {}  (←/→ cambiar)", metric.label()));
    frame.render_widget(selector, sections[0]);

    let legend = Line::from(vec![
        Span::styled("■ Jugador  ", Style::default().fg(DARK_GREEN)),
        Span::styled("■ Promedio Equipo", Style::default().fg(DARK_GOLD)),
    ]);
    frame.render_widget(Paragraph::new(legend), sections[1]);

    let history = app.dataset.player_history(player);
    let team = app.dataset.team_average_by_match(metric);

    let mut chart = BarChart::default()
        .block(
            Block::default()
                .title(format!("Comparativa: {} (Solo Session)", metric.label()))
                .borders(Borders::ALL),
        )
        .bar_width(5)
        .bar_gap(1)
        .group_gap(3);
    for avg in &team {
        let player_value = history
            .iter()
            .find(|h| h.row.activity_name == avg.activity_name)
            .map(|h| h.row.value(metric));
        let player_bar = match player_value {
            Some(value) => value_bar(value, DARK_GREEN),
            None => Bar::default().value(0).text_value("-".to_string()),
        };
        let group = BarGroup::default()
            .label(Line::from(avg.label.clone()))
            .bars(&[player_bar, value_bar(avg.mean, DARK_GOLD)]);
        chart = chart.data(group);
    }
    frame.render_widget(chart, sections[2]);
}

fn render_evolution_tab(frame: &mut Frame, area: Rect, app: &App, player: &str) {
    let history = app.dataset.player_history(player);
    if history.is_empty() {
        render_prompt(frame, area, "Sin partidos para este jugador.");
        return;
    }
    for (metric, cell) in Metric::ALL.iter().zip(metric_grid(area)) {
        let bars = history
            .iter()
            .map(|h| value_bar(h.row.value(*metric), DARK_GREEN).label(Line::from(h.label.clone())))
            .collect::<Vec<_>>();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .title(format!("Evolución: {}", metric.label()))
                    .borders(Borders::ALL),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(6)
            .bar_gap(1);
        frame.render_widget(chart, cell);
    }
}

/// Three rows of two cells, one per metric.
fn metric_grid(area: Rect) -> Vec<Rect> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);
    rows.iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect()
}

// Bars carry tenths so small metrics (velocity) still show a visible difference.
fn value_bar(value: f64, color: Color) -> Bar<'static> {
    Bar::default()
        .value((value.max(0.0) * 10.0).round() as u64)
        .text_value(format!("{value:.1}"))
        .style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::White).bg(color))
}

fn single_bar_chart(title: String, label: &str, value: f64) -> BarChart<'static> {
    let bar = value_bar(value, DARK_GREEN).label(Line::from(label.to_string()));
    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(BarGroup::default().bars(&[bar]))
        .bar_width(9)
}

fn match_overview_chart(label: &str, row: &SessionRow) -> BarChart<'static> {
    let bars = Metric::ALL
        .iter()
        .map(|m| value_bar(row.value(*m), DARK_GREEN).label(Line::from(m.label().to_string())))
        .collect::<Vec<_>>();
    BarChart::default()
        .block(
            Block::default()
                .title(format!("Rendimiento en {label}"))
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(2)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "Sin mensajes".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Rugby Performance Dashboard - Ayuda",
        "",
        "Menú lateral:",
        "  j/k or ↑/↓   Mover selección",
        "  Enter / m    Alternar Jugador/Partido",
        "  p            Volver al selector de jugador",
        "  r / Home     Volver al Inicio",
        "",
        "Pestañas:",
        "  Tab / 1-3    Cambiar pestaña",
        "  ←/→ or [ ]   Métrica de la comparativa",
        "",
        "  x            Exportar informe del jugador (.xlsx)",
        "  ?            Ayuda",
        "  q            Salir",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Ayuda").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
