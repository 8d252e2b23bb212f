use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::search::{Filter, View};
use crate::theme::Theme;

// Theme is fixed for the lifetime of the process
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme built from config. Only the first call has an effect.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn inactive() -> Color { theme().inactive }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }

const PLACEHOLDER: &str = "Type something to search...";

pub fn draw<C>(f: &mut Frame, app: &App<C>) {
    let area = f.area();
    let view = app.search.view();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),                                      // Title / info line
            Constraint::Length(3),                                      // Search box
            Constraint::Length(if view.error.is_some() { 1 } else { 0 }), // Error banner
            Constraint::Length(3),                                      // Filters
            Constraint::Min(4),                                         // Results
            Constraint::Length(1),                                      // Pager
            Constraint::Length(1),                                      // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_search_box(f, app, chunks[1]);
    if let Some(error) = view.error {
        draw_error_banner(f, error, chunks[2]);
    }
    draw_filters(f, app, chunks[3]);
    draw_results(f, app, &view, chunks[4]);
    draw_pager(f, &view, chunks[5]);
    draw_footer(f, app, chunks[6]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn section_block(title: &str, is_active: bool) -> Block<'_> {
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn draw_info_line<C>(f: &mut Frame, app: &App<C>, area: Rect) {
    // Priority: status message > current query summary > ready
    let detail = if let Some(ref status) = app.status_message {
        Span::styled(status.clone(), Style::default().fg(accent()))
    } else if !app.search.query().is_empty() && app.search.total_pages() > 0 {
        Span::styled(
            format!("\"{}\" · {} images", app.search.query(), app.search.total()),
            Style::default().fg(text_dim()),
        )
    } else {
        Span::styled("Ready", Style::default().fg(text_dim()))
    };

    let line = Line::from(vec![
        Span::styled("Image Explorer", Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
        Span::styled(" │ ", Style::default().fg(inactive())),
        detail,
    ]);

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_search_box<C>(f: &mut Frame, app: &App<C>, area: Rect) {
    let is_active = app.section == Section::Search;
    let block = section_block(" Search ", is_active);

    let line = if app.input.is_empty() {
        Line::from(Span::styled(PLACEHOLDER, Style::default().fg(text_dim())))
    } else {
        let mut spans = vec![Span::styled(app.input.as_str(), Style::default().fg(text()))];
        if is_active {
            spans.push(Span::styled("▏", Style::default().fg(accent())));
        }
        Line::from(spans)
    };

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_error_banner(f: &mut Frame, error: &str, area: Rect) {
    let banner = Paragraph::new(Line::from(Span::styled(
        error,
        Style::default().fg(danger()).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);

    f.render_widget(banner, area);
}

fn draw_filters<C>(f: &mut Frame, app: &App<C>, area: Rect) {
    let is_active = app.section == Section::Filters;
    let block = section_block(" Filters ", is_active);

    let mut spans = Vec::new();
    for (i, filter) in Filter::ALL.iter().enumerate() {
        let style = if is_active && i == app.selected_filter {
            Style::default().bg(bg_selected()).fg(text()).add_modifier(Modifier::BOLD)
        } else if app.search.query() == filter.term() {
            Style::default().fg(accent())
        } else {
            Style::default().fg(text())
        };

        spans.push(Span::styled(format!("{}", i + 1), Style::default().fg(text_dim())));
        spans.push(Span::styled(format!(" {} ", filter.label()), style));
        spans.push(Span::raw("  "));
    }

    let filters = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    f.render_widget(filters, area);
}

fn draw_results<C>(f: &mut Frame, app: &App<C>, view: &View<'_>, area: Rect) {
    let is_active = app.section == Section::Results;
    let block = section_block(" Results ", is_active);

    // Loading hides the grid entirely
    let Some(results) = view.results else {
        let loading = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Loading...", Style::default().fg(accent()))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        f.render_widget(loading, area);
        return;
    };

    if results.is_empty() {
        let hint = if app.search.query().is_empty() {
            "Search for something, or pick a filter"
        } else {
            "No images found"
        };
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(hint, Style::default().fg(text_dim()))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        f.render_widget(empty, area);
        return;
    }

    // Responsive: hide the author column on narrow terminals
    let show_author = area.width > 90;

    let header_style = Style::default().fg(accent());
    let header = if show_author {
        Row::new(vec![
            Span::styled("#", header_style),
            Span::styled("Description", header_style),
            Span::styled("Author", header_style),
            Span::styled("Thumbnail", header_style),
        ])
    } else {
        Row::new(vec![
            Span::styled("#", header_style),
            Span::styled("Description", header_style),
            Span::styled("Thumbnail", header_style),
        ])
    };

    let rows: Vec<Row> = results
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let row_style = if i == app.selected_result && is_active {
                Style::default().bg(bg_selected()).fg(text())
            } else {
                Style::default()
            };

            let number = Span::styled(format!("{:>2}", i + 1), Style::default().fg(text_dim()));
            let label = Span::styled(image.label(), Style::default().fg(text()));
            let url = Span::styled(image.thumbnail_url.as_str(), Style::default().fg(text_dim()));

            if show_author {
                let author = Span::styled(
                    image.author.as_deref().unwrap_or("-"),
                    Style::default().fg(text_dim()),
                );
                Row::new(vec![number, label, author, url]).style(row_style)
            } else {
                Row::new(vec![number, label, url]).style(row_style)
            }
        })
        .collect();

    let widths = if show_author {
        vec![
            Constraint::Length(3),
            Constraint::Percentage(45),
            Constraint::Percentage(18),
            Constraint::Percentage(37),
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ]
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(block);

    // Selection drives scrolling on long pages
    let mut state = TableState::default();
    state.select(Some(app.selected_result));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_pager(f: &mut Frame, view: &View<'_>, area: Rect) {
    if view.loading {
        return;
    }

    let mut spans = Vec::new();
    if view.show_previous {
        spans.push(Span::styled("◀ Previous", Style::default().fg(accent())));
        spans.push(Span::styled(" (p)   ", Style::default().fg(text_dim())));
    }
    if view.total_pages > 0 {
        spans.push(Span::styled(
            format!("Page {} of {}", view.page, view.total_pages),
            Style::default().fg(text()),
        ));
    }
    if view.show_next {
        spans.push(Span::styled("   (n) ", Style::default().fg(text_dim())));
        spans.push(Span::styled("Next ▶", Style::default().fg(accent())));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn draw_footer<C>(f: &mut Frame, app: &App<C>, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Search => vec![
            ("Enter", "Search"),
            ("Esc", "Clear"),
            ("Tab", "Filters"),
            ("PgUp/PgDn", "Page"),
            ("^C", "Quit"),
        ],
        Section::Filters => vec![
            ("←→", "Move"),
            ("Enter", "Apply"),
            ("1-7", "Quick pick"),
            ("Tab", "Results"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        Section::Results => vec![
            ("↑↓", "Nav"),
            ("o", "Open"),
            ("p/n", "Page"),
            ("Tab", "Search"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 3 } else if area.width < 80 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = Style::default().fg(accent()).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(accent());

    let help_text = vec![
        Line::from(Span::styled("═══ Sections ═══", heading)),
        Line::from(vec![
            Span::styled("  Tab       ", key),
            Span::raw("Cycle Search → Filters → Results"),
        ]),
        Line::from(""),
        Line::from(Span::styled("═══ Search ═══", heading)),
        Line::from(vec![Span::styled("  Enter     ", key), Span::raw("Search for the typed term")]),
        Line::from(vec![Span::styled("  Esc       ", key), Span::raw("Clear the search box")]),
        Line::from(""),
        Line::from(Span::styled("═══ Filters ═══", heading)),
        Line::from(vec![Span::styled("  ←/→       ", key), Span::raw("Move between presets")]),
        Line::from(vec![Span::styled("  Enter     ", key), Span::raw("Search for the preset")]),
        Line::from(vec![Span::styled("  1-7       ", key), Span::raw("Search for a preset directly")]),
        Line::from(""),
        Line::from(Span::styled("═══ Results ═══", heading)),
        Line::from(vec![Span::styled("  ↑/↓ j/k   ", key), Span::raw("Move the selection")]),
        Line::from(vec![Span::styled("  o/Enter   ", key), Span::raw("Open the image in your browser")]),
        Line::from(vec![Span::styled("  p / n     ", key), Span::raw("Page back / forward")]),
        Line::from(vec![Span::styled("  PgUp/PgDn ", key), Span::raw("Page back / forward (anywhere)")]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", key),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", key),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" imgscout Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
