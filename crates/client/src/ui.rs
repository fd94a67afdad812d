use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::api::BooksApi;
use crate::form::Field;
use crate::state::{App, FormState, LoadState, Overlay, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    List,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::Field(Field::Title),
        Focus::Field(Field::Author),
        Focus::Field(Field::PublishedYear),
        Focus::List,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Work that needs the API, produced by key handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Submit(Submission),
    Delete,
    Reload,
    Quit,
}

pub struct View {
    pub app: App,
    pub focus: Focus,
    pub selection: ListState,
}

impl View {
    pub fn new(app: App) -> Self {
        let mut view = Self {
            app,
            focus: Focus::Field(Field::Title),
            selection: ListState::default(),
        };
        view.sync_selection();
        view
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.selected()
    }

    /// Keep the highlighted row inside the list after it changes.
    fn sync_selection(&mut self) {
        let len = self.app.books.len();
        let selected = match self.selection.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.selection.select(selected);
    }

    fn move_selection(&mut self, forward: bool) {
        let len = self.app.books.len();
        if len == 0 {
            return;
        }
        let i = match self.selection.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.selection.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        if matches!(self.app.overlay, Overlay::Alert(_)) {
            self.app.dismiss_overlay();
            return Action::None;
        }
        if matches!(self.app.overlay, Overlay::ConfirmDelete { .. }) {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Action::Delete,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.app.dismiss_overlay();
                    Action::None
                }
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                Action::None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                Action::None
            }
            KeyCode::Esc => {
                if self.app.editing_id().is_some() {
                    self.app.cancel_edit();
                }
                Action::None
            }
            _ => match self.focus {
                Focus::Field(field) => self.handle_field_key(field, key),
                Focus::List => self.handle_list_key(key),
            },
        }
    }

    fn handle_field_key(&mut self, field: Field, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => match self.app.begin_submit() {
                Some(submission) => Action::Submit(submission),
                None => Action::None,
            },
            KeyCode::Backspace if !self.app.is_submitting() => {
                self.app.form.value_mut(field).pop();
                Action::None
            }
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL) && !self.app.is_submitting() =>
            {
                self.app.form.value_mut(field).push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Char('e') => {
                if let Some(index) = self.selected() {
                    self.app.edit(index);
                    self.focus = Focus::Field(Field::Title);
                }
            }
            KeyCode::Char('d') => {
                if let Some(index) = self.selected() {
                    self.app.request_delete(index);
                }
            }
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Char('q') => return Action::Quit,
            _ => {}
        }
        Action::None
    }

    pub async fn perform(&mut self, action: Action, api: &dyn BooksApi) {
        match action {
            Action::Submit(submission) => self.app.dispatch(submission, api).await,
            Action::Delete => self.app.confirm_delete(api).await,
            Action::Reload => self.app.load(api).await,
            Action::None | Action::Quit => {}
        }
        self.sync_selection();
    }
}

/// Take over the terminal until the user quits.
pub async fn run(api: &dyn BooksApi) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut view = View::new(App::new());
    let res = run_app(&mut terminal, &mut view, api).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    view: &mut View,
    api: &dyn BooksApi,
) -> Result<()> {
    terminal.draw(|f| draw(f, view))?;
    view.perform(Action::Reload, api).await;

    loop {
        terminal.draw(|f| draw(f, view))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };

        match view.handle_key(key) {
            Action::None => {}
            Action::Quit => return Ok(()),
            action => {
                // Show the in-flight state before waiting on the server
                terminal.draw(|f| draw(f, view))?;
                view.perform(action, api).await;
            }
        }
    }
}

pub fn draw(f: &mut Frame, view: &mut View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_form(f, chunks[1], view);
    render_form_error(f, chunks[2], &view.app);
    render_buttons(f, chunks[3], &view.app);
    render_books(f, chunks[4], view);
    render_help(f, chunks[5], view.focus);
    render_overlay(f, &view.app.overlay);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        "Book Store",
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, view: &View) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (field, column) in Field::ALL.into_iter().zip(columns.iter()) {
        let focused = view.focus == Focus::Field(field);
        let value = view.app.form.value(field);

        let text = if value.is_empty() {
            Span::styled(field.label(), Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(value)
        };
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let input = Paragraph::new(Line::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} ", field.label())),
        );
        f.render_widget(input, *column);

        if focused && view.app.overlay == Overlay::None {
            let offset = (value.chars().count() as u16).min(column.width.saturating_sub(3));
            f.set_cursor(column.x + 1 + offset, column.y + 1);
        }
    }
}

fn render_form_error(f: &mut Frame, area: Rect, app: &App) {
    if let Some(message) = &app.form_error {
        let error = Paragraph::new(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        ));
        f.render_widget(error, area);
    }
}

fn render_buttons(f: &mut Frame, area: Rect, app: &App) {
    let submit = match &app.form_state {
        FormState::Creating => "[Enter] Add Book",
        FormState::Editing { .. } => "[Enter] Update Book",
        FormState::Submitting { editing: None } => "Adding...",
        FormState::Submitting { editing: Some(_) } => "Updating...",
    };

    let mut spans = vec![Span::styled(
        submit,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if matches!(app.form_state, FormState::Editing { .. }) {
        spans.push(Span::raw("   [Esc] Cancel"));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
        area,
    );
}

fn render_books(f: &mut Frame, area: Rect, view: &mut View) {
    let app = &view.app;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if view.focus == Focus::List {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        })
        .title(format!(" Books ({}) ", app.books.len()));

    match &app.load {
        LoadState::Loading => {
            let loading = Paragraph::new("Loading books...")
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(loading, area);
        }
        LoadState::Failed(message) => {
            let error = Paragraph::new(Span::styled(
                format!("Error: {}", message),
                Style::default().fg(Color::Red),
            ))
            .alignment(Alignment::Center)
            .block(block);
            f.render_widget(error, area);
        }
        LoadState::Ready => {
            let editing = app.editing_id();
            let items: Vec<ListItem> = app
                .books
                .iter()
                .map(|book| {
                    let title_style = if Some(book.id.as_str()) == editing {
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().add_modifier(Modifier::BOLD)
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(book.title.clone(), title_style),
                        Span::styled(
                            format!("  by {}", book.author),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::styled(
                            format!("  ({})", book.published_year),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            f.render_stateful_widget(list, area, &mut view.selection);
        }
    }
}

fn render_help(f: &mut Frame, area: Rect, focus: Focus) {
    let help = match focus {
        Focus::Field(_) => "Tab: next field | Enter: save | Esc: cancel edit | Ctrl-C: quit",
        Focus::List => "j/k: move | e: edit | d: delete | r: reload | Tab: form | q: quit",
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn render_overlay(f: &mut Frame, overlay: &Overlay) {
    let (title, body, color) = match overlay {
        Overlay::None => return,
        Overlay::ConfirmDelete { title, .. } => (
            " Delete ",
            format!(
                "Are you sure you want to delete \"{}\"?\n\n[y] Delete   [n] Keep",
                title
            ),
            Color::Yellow,
        ),
        Overlay::Alert(message) => (
            " Error ",
            format!("{}\n\nPress any key to continue", message),
            Color::Red,
        ),
    };

    let area = centered_rect(60, 30, f.size());
    let popup = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title),
        );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
