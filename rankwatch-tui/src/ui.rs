use crate::app::{App, KeyManager, Modal, StatusLevel};
use crate::form::{FormField, ProjectForm};
use rankwatch_core::interpret::NOT_AVAILABLE;
use rankwatch_core::model::{KeywordStatus, Project};
use rankwatch_core::session::View;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Main area
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Hints bar
        ])
        .split(f.area());

    match app.session().view() {
        View::ProjectList => render_project_list(f, app, chunks[0]),
        View::Project(id) => match app.session().projects().get(id) {
            Some(project) => render_project(f, app, project, chunks[0]),
            None => render_project_list(f, app, chunks[0]),
        },
    }

    render_status(f, app, chunks[1]);
    render_hints(f, app, chunks[2]);

    match app.modal() {
        Some(Modal::NewProject(form)) => render_form(f, form),
        Some(Modal::ConfirmDelete { name, .. }) => render_confirm_delete(f, name),
        Some(Modal::Keys(manager)) => render_key_manager(f, app, manager),
        None => {}
    }
}

fn render_project_list(f: &mut Frame, app: &App, area: Rect) {
    let projects = app.session().projects().list_all();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Projects ({}) ", projects.len()))
        .border_style(Style::default().fg(Color::Cyan));

    if projects.is_empty() {
        let empty = Paragraph::new("No projects yet. Press 'n' to create one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = projects
        .iter()
        .map(|project| {
            let mut spans = vec![
                Span::styled(
                    project.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(project.domain.clone(), Style::default().fg(Color::Blue)),
                Span::styled(
                    format!(
                        "  {} keywords | {} | {}",
                        project.keywords.len(),
                        project.device,
                        project.location_display()
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if app.is_checking(&project.id) {
                spans.push(Span::styled(
                    "  Checking...",
                    Style::default().fg(Color::Yellow),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected.min(projects.len() - 1)));
    f.render_stateful_widget(list, area, &mut state);
}

fn status_style(status: KeywordStatus) -> Style {
    match status {
        KeywordStatus::Pending => Style::default().fg(Color::DarkGray),
        KeywordStatus::Loading => Style::default().fg(Color::Yellow),
        KeywordStatus::Success => Style::default().fg(Color::Green),
        KeywordStatus::Error => Style::default().fg(Color::Red),
    }
}

fn render_project(f: &mut Frame, app: &App, project: &Project, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let checking = app.is_checking(&project.id);
    let header = vec![
        Line::from(vec![
            Span::styled("Domain:   ", Style::default().fg(Color::DarkGray)),
            Span::styled(project.domain.clone(), Style::default().fg(Color::Blue)),
        ]),
        Line::from(vec![
            Span::styled("Keywords: ", Style::default().fg(Color::DarkGray)),
            Span::raw(project.keywords.len().to_string()),
            Span::styled("   Device: ", Style::default().fg(Color::DarkGray)),
            Span::raw(project.device.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Location: ", Style::default().fg(Color::DarkGray)),
            Span::raw(project.location_display()),
        ]),
    ];
    let title = if checking {
        format!(" {} - Checking... ", project.name)
    } else {
        format!(" {} ", project.name)
    };
    let header_block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(if checking { Color::Yellow } else { Color::Cyan }));
    f.render_widget(Paragraph::new(header).block(header_block), chunks[0]);

    let rows: Vec<Row> = project
        .results
        .iter()
        .map(|result| {
            let status = match (&result.status, &result.error) {
                (KeywordStatus::Error, Some(error)) => format!("Error: {}", error),
                (status, _) => status.label().to_string(),
            };
            Row::new(vec![
                Cell::from(result.keyword.clone()),
                Cell::from(result.rank().to_string())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(result.ranking_url().unwrap_or(NOT_AVAILABLE).to_string())
                    .style(Style::default().fg(Color::Blue)),
                Cell::from(status).style(status_style(result.status)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Length(10),
            Constraint::Percentage(40),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["Keyword", "Rank", "Ranking URL", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Results ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(table, chunks[1]);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let Some((level, message)) = &app.status else {
        return;
    };
    let style = match level {
        StatusLevel::Info => Style::default().fg(Color::Green),
        StatusLevel::Error => Style::default().fg(Color::Red),
    };
    f.render_widget(Paragraph::new(format!(" {}", message)).style(style), area);
}

fn hint(key: &str, label: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
        Span::raw(format!(" {}  ", label)),
    ]
}

fn render_hints(f: &mut Frame, app: &App, area: Rect) {
    let pairs: &[(&str, &str)] = match (app.modal(), app.session().view()) {
        (Some(Modal::NewProject(_)), _) => &[
            ("Tab", "Next field"),
            ("←/→", "Change"),
            ("Enter", "Create"),
            ("Ctrl+S", "Create"),
            ("Esc", "Cancel"),
        ],
        (Some(Modal::ConfirmDelete { .. }), _) => &[("y", "Delete"), ("n/Esc", "Cancel")],
        (Some(Modal::Keys(_)), _) => &[
            ("Enter", "Add key"),
            ("↑/↓", "Select"),
            ("Del", "Remove"),
            ("Esc", "Close"),
        ],
        (None, View::ProjectList) => &[
            ("↑/↓", "Select"),
            ("Enter", "Open"),
            ("n", "New"),
            ("d", "Delete"),
            ("k", "API keys"),
            ("q", "Quit"),
        ],
        (None, View::Project(_)) => &[
            ("c", "Check ranks"),
            ("d", "Delete"),
            ("k", "API keys"),
            ("Esc", "Back"),
        ],
    };

    let spans: Vec<Span> = pairs
        .iter()
        .flat_map(|(key, label)| hint(key, label))
        .collect();
    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black).fg(Color::Gray));
    f.render_widget(paragraph, area);
}

/// A rectangle of the given percentage size centred in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn modal_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(color))
}

fn render_form(f: &mut Frame, form: &ProjectForm) {
    let area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, area);

    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if focused { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{}{}", marker, field.label()),
            label_style,
        )));

        match field {
            FormField::Name => lines.push(Line::from(format!("    {}", form.name))),
            FormField::Domain => lines.push(Line::from(format!("    {}", form.domain))),
            FormField::Keywords => {
                if form.keywords.is_empty() {
                    lines.push(Line::from("    "));
                }
                for keyword in form.keywords.split('\n') {
                    lines.push(Line::from(format!("    {}", keyword)));
                }
                lines.push(Line::from(Span::styled(
                    format!("    ({} keywords)", form.keyword_count()),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            FormField::Device => lines.push(Line::from(format!("    < {} >", form.device))),
            FormField::Country => lines.push(Line::from(format!("    < {} >", form.country()))),
            FormField::City => lines.push(Line::from(format!("    {}", form.city))),
        }
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(modal_block("New Project", Color::Cyan))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_confirm_delete(f: &mut Frame, name: &str) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(format!(
            "Are you sure you want to delete the project \"{}\"?",
            name
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Delete   [n] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(text)
        .block(modal_block("Delete Project", Color::Red))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_key_manager(f: &mut Frame, app: &App, manager: &KeyManager) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let block = modal_block("Manage API Keys", Color::Magenta);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Stored keys
            Constraint::Length(3), // Input
            Constraint::Length(1), // Error
        ])
        .split(inner);

    let keys = app.masked_keys();
    if keys.is_empty() {
        f.render_widget(
            Paragraph::new("No API keys stored. Type one below and press Enter.")
                .style(Style::default().fg(Color::DarkGray)),
            chunks[0],
        );
    } else {
        let items: Vec<ListItem> = keys
            .iter()
            .enumerate()
            .map(|(i, masked)| ListItem::new(format!("{:>2}. {}", i + 1, masked)))
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(manager.selected);
        f.render_stateful_widget(list, chunks[0], &mut state);
    }

    let input = Paragraph::new(manager.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" New key ")
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(input, chunks[1]);

    if let Some(ref error) = manager.error {
        f.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            chunks[2],
        );
    }
}
