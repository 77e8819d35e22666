use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use poi_atlas::map::POSITION_LABEL;
use poi_atlas::session::{CLEAR_QUESTION, DELETE_QUESTION};
use poi_atlas::{
    Action, Confirm, CountryLookup, MarkerLayer, Outcome, PoiId, PoiKind, PointOfInterest, Session,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    /// Typing the search text (applied on every keystroke)
    Search,
    /// Typing the path of a CSV file to import
    ImportPath,
    ConfirmDelete(PoiId),
    ConfirmClear,
}

pub struct App<L: CountryLookup> {
    pub session: Session<L, MarkerLayer>,
    pub state: TableState,
    pub show_detail: bool,
    pub mode: InputMode,
    pub input: String,
    /// Last message for the status bar
    pub notice: Option<String>,
}

impl<L: CountryLookup> App<L> {
    pub fn new(session: Session<L, MarkerLayer>) -> Self {
        let mut app = Self {
            session,
            state: TableState::default(),
            show_detail: false,
            mode: InputMode::Normal,
            input: String::new(),
            notice: None,
        };
        app.fix_selection();
        app
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn visible_len(&self) -> usize {
        self.session.visible().len()
    }

    pub fn selected_point(&self) -> Option<&PointOfInterest> {
        let visible = self.session.visible();
        self.state.selected().and_then(|i| visible.get(i).copied())
    }

    /// Keep the selection inside the visible list
    fn fix_selection(&mut self) {
        let len = self.visible_len();
        let selected = match self.state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.state.select(selected);
    }

    /// Run an action and turn its outcome into a status line
    pub async fn dispatch(&mut self, action: Action, confirm: &mut dyn Confirm) {
        let outcome = self.session.dispatch(action, confirm).await;

        self.notice = match outcome {
            Outcome::Imported(summary) => Some(format!(
                "✓ Imported {} points ({} issues)",
                summary.imported,
                summary.issues.len()
            )),
            Outcome::Added(_) => Some("✓ Point added".to_string()),
            Outcome::ViewChanged { visible: 0 } => {
                Some("No results match the filters (r to reset)".to_string())
            }
            Outcome::ViewChanged { .. } => None,
            Outcome::Deleted(_) => Some("✓ Point deleted".to_string()),
            Outcome::Cleared { removed } => Some(format!("✓ Cleared {} points", removed)),
            Outcome::Declined => Some("Cancelled".to_string()),
            Outcome::Ignored => None,
            Outcome::Failed { notice } => Some(format!("❌ {}", notice)),
        };

        self.fix_selection();
    }

    pub fn next(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(20),
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Returns true when the user asked to quit
    pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode.clone() {
            InputMode::Normal => return self.handle_normal_key(key).await,
            InputMode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.mode = InputMode::Normal,
                KeyCode::Backspace => {
                    self.input.pop();
                    self.dispatch(Action::SetSearch(self.input.clone()), &mut true).await;
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    self.dispatch(Action::SetSearch(self.input.clone()), &mut true).await;
                }
                _ => {}
            },
            InputMode::ImportPath => match key.code {
                KeyCode::Esc => self.mode = InputMode::Normal,
                KeyCode::Enter => {
                    self.mode = InputMode::Normal;
                    let path = PathBuf::from(self.input.trim());
                    self.dispatch(Action::Import(path), &mut true).await;
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            InputMode::ConfirmDelete(id) => {
                self.mode = InputMode::Normal;
                let mut answer = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
                self.dispatch(Action::Delete(id), &mut answer).await;
            }
            InputMode::ConfirmClear => {
                self.mode = InputMode::Normal;
                let mut answer = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
                self.dispatch(Action::Clear, &mut answer).await;
            }
        }
        false
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Char('i') => {
                self.input.clear();
                self.mode = InputMode::ImportPath;
            }
            KeyCode::Char('/') => {
                self.input = self.session.criteria().text.clone();
                self.mode = InputMode::Search;
            }
            KeyCode::Char('t') => self.dispatch(Action::CycleCategory, &mut true).await,
            KeyCode::Char('o') => self.dispatch(Action::CycleOrder, &mut true).await,
            KeyCode::Char('r') => self.dispatch(Action::ResetFilters, &mut true).await,
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_point().map(|p| p.id()) {
                    self.mode = InputMode::ConfirmDelete(id);
                }
            }
            KeyCode::Char('C') => {
                if !self.session.catalog().is_empty() {
                    self.mode = InputMode::ConfirmClear;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.state.select(Some(0)),
            KeyCode::End => {
                let len = self.visible_len();
                if len > 0 {
                    self.state.select(Some(len - 1));
                }
            }
            _ => {}
        }
        false
    }
}

pub async fn run_ui<L: CountryLookup>(app: &mut App<L>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend, L: CountryLookup>(
    terminal: &mut Terminal<B>,
    app: &mut App<L>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = next_event(event::read).await? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key).await {
                return Ok(());
            }
        }
    }
}

/// Wait for the next terminal event on the blocking pool
async fn next_event<F>(read: F) -> io::Result<Event>
where
    F: FnOnce() -> io::Result<Event> + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(io::Error::other)?
}

fn ui<L: CountryLookup>(f: &mut Frame, app: &mut App<L>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with counts and filters
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar / prompt
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(62), // Point list
            Constraint::Percentage(38), // Detail or country + map
        ])
        .split(chunks[1]);

    render_table(f, content_chunks[0], app);
    if app.show_detail {
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_side_panel(f, content_chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn kind_color(kind: &PoiKind) -> Color {
    match kind {
        PoiKind::Attraction(_) => Color::Yellow,
        PoiKind::Museum { .. } => Color::Magenta,
        PoiKind::Generic => Color::White,
    }
}

fn render_header<L: CountryLookup>(f: &mut Frame, area: Rect, app: &App<L>) {
    let catalog = app.session.catalog();
    let stats = catalog.stats();
    let criteria = app.session.criteria();

    let spans = vec![
        Span::styled(
            "🗺️  POI Atlas",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total: {}", catalog.live_count()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(format!("🎡 {}", stats.attractions), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(format!("🏛️ {}", stats.museums), Style::default().fg(Color::Magenta)),
        Span::raw("  "),
        Span::styled(format!("📍 {}", stats.generic), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(
            format!("Type: {}", criteria.category.label()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(format!("Order: {}", criteria.order), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(
            format!("Search: \"{}\"", criteria.text),
            Style::default().fg(Color::Green),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_table<L: CountryLookup>(f: &mut Frame, area: Rect, app: &mut App<L>) {
    let header_cells = ["Name", "City", "Type", "Rating", "Price"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let taxes = app.session.catalog().taxes();
    let visible = app.session.visible();
    let empty = visible.is_empty();

    let rows = visible.iter().map(|point| {
        let color = kind_color(&point.kind);
        let price = point
            .taxed_price(taxes)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());

        let cells = vec![
            Cell::from(truncate(point.name(), 30)),
            Cell::from(truncate(&point.base.city, 16)),
            Cell::from(truncate(&point.base.category, 14)).style(Style::default().fg(color)),
            Cell::from(point.base.rating.to_string()),
            Cell::from(price).style(Style::default().fg(color)),
        ];

        Row::new(cells).height(1)
    });

    let title = if empty && !app.session.catalog().is_empty() {
        " Points of interest (no matches, r to reset) "
    } else if empty {
        " Points of interest (i to import a CSV) "
    } else {
        " Points of interest "
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(18),
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn label(name: &str) -> Span<'static> {
    Span::styled(
        format!("  {}: ", name),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {}", title),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

fn render_side_panel<L: CountryLookup>(f: &mut Frame, area: Rect, app: &App<L>) {
    let panel = Paragraph::new(side_panel_lines(app)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Country & Map "),
    );

    f.render_widget(panel, area);
}

fn side_panel_lines<L: CountryLookup>(app: &App<L>) -> Vec<Line<'static>> {
    let mut content = vec![Line::from(""), section("COUNTRY"), Line::from("")];

    match app.session.country() {
        Some(country) => {
            content.push(Line::from(vec![label("Capital"), Span::raw(country.city.clone())]));
            if country.has_flag() {
                content.push(Line::from(vec![
                    label("Flag"),
                    Span::styled(wrap_text(&country.flag, 30), Style::default().fg(Color::Green)),
                ]));
            }
            let coords = country
                .map_center()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            content.push(Line::from(vec![label("Coordinates"), Span::raw(coords)]));
        }
        None => content.push(Line::from(Span::styled(
            "  No country information",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))),
    }

    let map = app.session.map();
    content.push(Line::from(""));
    content.push(Line::from("  ─────────────────────────────────────"));
    content.push(Line::from(""));
    content.push(section("MAP"));
    content.push(Line::from(""));
    content.push(Line::from(vec![
        label("Center"),
        Span::raw(format!("{} (zoom {})", map.center(), map.zoom())),
    ]));
    if let Some(position) = map.position() {
        content.push(Line::from(vec![label(POSITION_LABEL), Span::raw(position.to_string())]));
    }
    content.push(Line::from(vec![
        label("Markers"),
        Span::styled(map.markers().len().to_string(), Style::default().fg(Color::Green)),
    ]));

    content
}

fn render_detail_panel<L: CountryLookup>(f: &mut Frame, area: Rect, app: &App<L>) {
    let point = match app.selected_point() {
        Some(p) => p,
        None => {
            let no_selection = Paragraph::new("No point selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Point Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let base = &point.base;
    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            label("Name"),
            Span::styled(base.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![label("City"), Span::raw(format!("{}, {}", base.city, base.country))]),
        Line::from(vec![label("Address"), Span::raw(wrap_text(&base.address, 30))]),
        Line::from(vec![
            label("Type"),
            Span::styled(
                format!("{} ({})", base.category, point.kind.as_str()),
                Style::default().fg(kind_color(&point.kind)),
            ),
        ]),
        Line::from(vec![label("Coordinates"), Span::raw(base.location.to_string())]),
        Line::from(vec![label("Rating"), Span::raw(base.rating.to_string())]),
    ];

    if let (Some(admission), Some(price)) = (point.admission(), point.taxed_price(app.session.catalog().taxes())) {
        content.push(Line::from(vec![label("Hours"), Span::raw(admission.opening_hours.clone())]));
        content.push(Line::from(vec![
            label("Price"),
            Span::styled(price.to_string(), Style::default().fg(Color::Green)),
        ]));
    }

    if let Some(description) = point.description() {
        content.push(Line::from(""));
        content.push(section("DESCRIPTION"));
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                wrap_text(description, 35),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from("  ─────────────────────────────────────"));
    content.push(Line::from(""));
    content.push(section("PROVENANCE"));
    content.push(Line::from(""));
    content.push(Line::from(vec![
        label("Source"),
        Span::styled(
            if point.is_manual() { "added by hand" } else { "imported" },
            Style::default().fg(Color::Green),
        ),
    ]));
    content.push(Line::from(vec![
        label("Added"),
        Span::raw(point.created_at().format("%Y-%m-%d %H:%M:%S").to_string()),
    ]));
    content.push(Line::from(vec![label("Id"), Span::raw(point.id().to_string())]));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let detail_panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Point Details "),
    );

    f.render_widget(detail_panel, area);
}

fn render_status_bar<L: CountryLookup>(f: &mut Frame, area: Rect, app: &App<L>) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let status_spans = match &app.mode {
        InputMode::Search => vec![
            Span::styled(" Search: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("{}_", app.input)),
            Span::raw("  | "),
            key("Enter"),
            Span::raw(" done"),
        ],
        InputMode::ImportPath => vec![
            Span::styled(" CSV file: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("{}_", app.input)),
            Span::raw("  | "),
            key("Enter"),
            Span::raw(" import | "),
            key("Esc"),
            Span::raw(" cancel"),
        ],
        InputMode::ConfirmDelete(_) | InputMode::ConfirmClear => {
            let question = if app.mode == InputMode::ConfirmClear {
                CLEAR_QUESTION
            } else {
                DELETE_QUESTION
            };
            vec![
                Span::styled(format!(" {} ", question), Style::default().fg(Color::Red)),
                key("y"),
                Span::raw("/"),
                key("n"),
            ]
        }
        InputMode::Normal => {
            let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
            let mut spans = vec![Span::styled(
                format!(" Row: {}/{} ", selected, app.visible_len()),
                Style::default().fg(Color::Cyan),
            )];

            if let Some(notice) = &app.notice {
                spans.push(Span::raw("| "));
                spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Green)));
                spans.push(Span::raw(" "));
            }

            spans.extend([
                Span::raw("| "),
                key("i"),
                Span::raw(" Import | "),
                key("/"),
                Span::raw(" Search | "),
                key("t"),
                Span::raw(" Type | "),
                key("o"),
                Span::raw(" Order | "),
                key("r"),
                Span::raw(" Reset | "),
                key("d"),
                Span::raw(" Delete | "),
                key("C"),
                Span::raw(" Clear | "),
                key("Enter"),
                Span::raw(" Details | "),
                Span::styled("q", Style::default().fg(Color::Red)),
                Span::raw(" Quit"),
            ]);
            spans
        }
    };

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

/// Cut to `max_len` characters, ending in "..."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }

    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.chars().count() + word.chars().count() + 1 <= width {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        } else {
            if !result.is_empty() {
                result.push_str("\n  ");
            }
            result.push_str(&current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        if !result.is_empty() {
            result.push_str("\n  ");
        }
        result.push_str(&current_line);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use poi_atlas::country::CountryRecord;
    use poi_atlas::map::DEFAULT_POSITION;
    use poi_atlas::{Catalog, CatalogBuilder, LookupError};

    struct NoLookup;

    #[async_trait]
    impl CountryLookup for NoLookup {
        async fn lookup(&self, _code: &str) -> Result<CountryRecord, LookupError> {
            Err(LookupError::Status(404))
        }
    }

    fn panel_text(app: &App<NoLookup>) -> Vec<String> {
        side_panel_lines(app)
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_side_panel_shows_position_once_known() {
        let session = Session::new(Catalog::new(), CatalogBuilder::default(), NoLookup, MarkerLayer::new());
        let mut app = App::new(session);
        assert!(!panel_text(&app).iter().any(|l| l.contains(POSITION_LABEL)));

        app.session
            .start(None, std::time::Duration::from_millis(10), DEFAULT_POSITION)
            .await;
        let lines = panel_text(&app);
        assert!(lines.iter().any(|l| l.contains("You are here: 41.3874, 2.1686")));
        assert!(lines.iter().any(|l| l.contains("No country information")));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Plaça", 10), "Plaça");
        assert_eq!(truncate("Basílica de Santa Maria del Mar", 12), "Basílica ...");
    }

    #[tokio::test]
    async fn test_key_read_leaves_runtime_free() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let ticker = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            tx.send(()).unwrap();
        });

        // the read only returns once the ticker task has run
        let event = next_event(move || {
            rx.recv_timeout(std::time::Duration::from_secs(5))
                .map_err(io::Error::other)?;
            Ok(Event::FocusGained)
        })
        .await
        .unwrap();

        assert_eq!(event, Event::FocusGained);
        ticker.await.unwrap();
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("curt", 10), "curt");
        assert_eq!(
            wrap_text("Obres de joventut de Picasso", 12),
            "Obres de\n  joventut de\n  Picasso"
        );
    }
}
