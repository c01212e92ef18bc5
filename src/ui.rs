//! TUI module using ratatui.
//!
//! One input line for the topic, a status line, and a list of collapsible digest
//! entries. The digest is awaited in place; the status line is redrawn first so the
//! user sees what is being fetched.

use crate::briefing::Briefing;
use crate::digest::DigestEntry;
use chrono::{Datelike, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{DefaultTerminal, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Hint(String),
    Busy(String),
    Success(String),
    Warning(String),
    Error(String),
}

/// What the event loop should do after a key press
#[derive(Debug, PartialEq, Eq)]
enum Action {
    None,
    Submit(String),
    Quit,
}

struct App {
    input: String,
    focus: Focus,
    results: Option<Vec<DigestEntry>>,
    expanded: Vec<bool>,
    selected: usize,
    notice: Notice,
    summarizer: String,
}

impl App {
    fn new(summarizer: &str) -> Self {
        Self {
            input: String::new(),
            focus: Focus::Input,
            results: None,
            expanded: Vec::new(),
            selected: 0,
            notice: Notice::Hint(
                "e.g. iPhone 17 features, AI regulation, electric vehicles".to_string(),
            ),
            summarizer: summarizer.to_string(),
        }
    }

    fn reset(&mut self) {
        *self = App::new(&self.summarizer);
    }

    fn on_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Char('r') if ctrl => {
                self.reset();
                return Action::None;
            }
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Input if self.entry_count() > 0 => Focus::Results,
                    _ => Focus::Input,
                };
                return Action::None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Input => self.on_input_key(key),
            Focus::Results => {
                self.on_results_key(key);
                Action::None
            }
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => {
                if self.input.trim().is_empty() {
                    self.notice =
                        Notice::Warning("Please enter a topic to search for news.".to_string());
                    Action::None
                } else {
                    Action::Submit(self.input.clone())
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) {
        let count = self.entry_count();
        if count == 0 {
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(count - 1)
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(open) = self.expanded.get_mut(self.selected) {
                    *open = !*open;
                }
            }
            _ => {}
        }
    }

    fn begin_fetch(&mut self, topic: &str) {
        self.notice = Notice::Busy(format!("Fetching and summarizing news about {}...", topic));
    }

    fn show_results(&mut self, entries: Vec<DigestEntry>) {
        self.notice = if entries.is_empty() {
            Notice::Error("No articles found. Try a different topic.".to_string())
        } else {
            Notice::Success(format!("Found {} articles!", entries.len()))
        };
        self.expanded = vec![false; entries.len()];
        self.selected = 0;
        self.focus = if entries.is_empty() {
            Focus::Input
        } else {
            Focus::Results
        };
        self.results = Some(entries);
    }

    fn show_error(&mut self, message: String) {
        self.notice = Notice::Error(format!(
            "Something went wrong while fetching the news: {}",
            message
        ));
    }

    fn entry_count(&self) -> usize {
        self.results.as_ref().map_or(0, Vec::len)
    }

    /// Lines of the results pane and the index of the selected header line
    fn result_lines(&self, width: usize) -> (Vec<Line<'static>>, usize) {
        let mut lines = Vec::new();
        let mut selected_line = 0;
        let Some(entries) = &self.results else {
            return (lines, selected_line);
        };

        let body_width = width.saturating_sub(4).max(10);
        for (i, entry) in entries.iter().enumerate() {
            let open = self.expanded.get(i).copied().unwrap_or(false);
            let is_selected = i == self.selected && self.focus == Focus::Results;
            if i == self.selected {
                selected_line = lines.len();
            }

            let marker = if open { "▾" } else { "▸" };
            let mut header_style = Style::default().add_modifier(Modifier::BOLD);
            if is_selected {
                header_style = header_style.fg(Color::Black).bg(Color::Cyan);
            }
            lines.push(Line::from(Span::styled(
                format!(
                    "{} {}. {} ({}, {})",
                    marker,
                    i + 1,
                    entry.title,
                    entry.source,
                    entry.date
                ),
                header_style,
            )));

            if open {
                push_section(&mut lines, "Summary", &entry.summary, body_width);
                push_section(&mut lines, "Why it matters", &entry.why_it_matters, body_width);
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled("Read full article: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        entry.url.clone(),
                        Style::default().add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
                lines.push(Line::default());
            }
        }
        (lines, selected_line)
    }
}

fn push_section(lines: &mut Vec<Line<'static>>, heading: &str, text: &str, width: usize) {
    lines.push(Line::from(Span::styled(
        format!("    {}", heading),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    for row in wrap(text, width) {
        lines.push(Line::from(format!("    {}", row)));
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Column for the input cursor, pinned inside the box border
fn cursor_x(area: Rect, typed: &str) -> u16 {
    let typed = u16::try_from(typed.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    x.min(area.right().saturating_sub(2))
}

fn draw(frame: &mut Frame, app: &App) {
    let [header, input, status, body, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                "NewsBrief: real-time news summarizer",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("Latest articles on any topic, summarized, with why they matter."),
        ]),
        header,
    );

    let input_style = if app.focus == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(app.input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(input_style)
                .title(" Enter a news topic "),
        ),
        input,
    );
    if app.focus == Focus::Input {
        frame.set_cursor_position((cursor_x(input, &app.input), input.y.saturating_add(1)));
    }

    let (text, color) = match &app.notice {
        Notice::Hint(t) => (t, Color::DarkGray),
        Notice::Busy(t) => (t, Color::Cyan),
        Notice::Success(t) => (t, Color::Green),
        Notice::Warning(t) => (t, Color::Yellow),
        Notice::Error(t) => (t, Color::Red),
    };
    frame.render_widget(
        Paragraph::new(text.as_str()).style(Style::default().fg(color)),
        status,
    );

    let (lines, selected_line) = app.result_lines(body.width as usize);
    let visible = body.height.saturating_sub(2) as usize;
    let scroll = selected_line.saturating_sub(visible / 2) as u16;
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Digest "))
            .scroll((scroll, 0)),
        body,
    );

    frame.render_widget(
        Paragraph::new(format!(
            "Enter: search/expand  Tab: focus  ↑↓: select  Ctrl-R: reset  Esc: quit  |  {} · © {} NewsBrief",
            app.summarizer,
            Utc::now().year()
        ))
        .style(Style::default().fg(Color::DarkGray)),
        footer,
    );
}

/// Run the interactive digest browser until the user quits
pub async fn run(briefing: &Briefing) -> anyhow::Result<()> {
    let mut terminal = ratatui::try_init()?;
    let result = event_loop(&mut terminal, briefing).await;
    ratatui::restore();
    result
}

async fn event_loop(terminal: &mut DefaultTerminal, briefing: &Briefing) -> anyhow::Result<()> {
    let mut app = App::new(briefing.summarizer_name());

    loop {
        terminal.draw(|frame| draw(frame, &app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.on_key(key) {
            Action::None => {}
            Action::Quit => return Ok(()),
            Action::Submit(topic) => {
                app.begin_fetch(&topic);
                terminal.draw(|frame| draw(frame, &app))?;
                match briefing.digest(&topic).await {
                    Ok(entries) => app.show_results(entries),
                    Err(e) => app.show_error(e.to_string()),
                }
            }
        }
    }
}
