use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use unicode_width::UnicodeWidthChar;
use crate::app::{App, InputMode};
use crate::tab::Tab;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, tab bar, body, footer
    let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_tabs(app, frame, tabs_area);

    match app.active_tab() {
        Tab::Ai => render_ai_tab(app, frame, body_area),
        tab => {
            app.list_area = None;
            render_placeholder(tab, frame, body_area);
        }
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let loading = if app.is_loading() {
        // Animated ellipsis: cycles through ".", "..", "..."
        format!(" syncing{}", ".".repeat((app.animation_frame as usize) + 1))
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" Prism: multi-angle study chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(loading, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tabs(app: &mut App, frame: &mut Frame, area: Rect) {
    let labels: Vec<(Tab, String)> = Tab::all()
        .into_iter()
        .map(|tab| (tab, format!(" {} {} ", tab.index() + 1, tab.display_name())))
        .collect();

    let mut constraints: Vec<Constraint> = labels
        .iter()
        .map(|(_, label)| Constraint::Length(label.chars().count() as u16))
        .collect();
    constraints.push(Constraint::Min(0));
    let cells = Layout::horizontal(constraints).split(area);

    // Store areas for mouse hit-testing
    app.tab_areas.clear();
    for ((tab, label), cell) in labels.into_iter().zip(cells.iter()) {
        let style = if tab == app.active_tab() {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        frame.render_widget(Paragraph::new(label).style(style), *cell);
        app.tab_areas.push((tab, *cell));
    }
}

fn render_ai_tab(app: &mut App, frame: &mut Frame, area: Rect) {
    // Message list on top, single-line input at the bottom
    let [list_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store list area for mouse hit-testing and its inner size for scrolling
    app.list_area = Some(list_area);
    app.list_height = list_area.height.saturating_sub(2);
    app.list_width = list_area.width.saturating_sub(2);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(format!(" {} ({}) ", Tab::Ai.display_name(), app.messages().len()));

    let list = if app.messages().is_empty() {
        Paragraph::new(Text::from(Span::styled(
            "No messages yet. Press i to write one.",
            Style::default().fg(Color::DarkGray),
        )))
        .wrap(Wrap { trim: false })
    } else {
        app.list_paragraph()
    };
    frame.render_widget(list.block(list_block).scroll((app.list_scroll, 0)), list_area);

    // Scrollbar tracks wrapped rows, not messages
    let line_count = app.total_list_lines();
    if line_count > app.list_height {
        let mut scrollbar_state =
            ScrollbarState::new(line_count as usize).position(app.list_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            list_area,
            &mut scrollbar_state,
        );
    }

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Message the AI ");

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_window(app.input(), app.input_cursor, inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    // Show cursor when editing
    if editing {
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

/// Horizontally scrolled slice of `input` that fits in `width` cells with
/// the cursor (a char index) on screen, plus the cursor's cell offset in it
fn input_window(input: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }

    let widths: Vec<usize> = input.chars().map(|c| c.width().unwrap_or(0)).collect();
    let cursor = cursor.min(widths.len());

    // Drop characters from the left until the cursor cell fits
    let mut start = 0;
    let mut before: usize = widths[..cursor].iter().sum();
    while before >= width && start < cursor {
        before -= widths[start];
        start += 1;
    }

    let mut used = 0;
    let visible = input
        .chars()
        .zip(&widths)
        .skip(start)
        .take_while(|(_, w)| {
            used += **w;
            used <= width
        })
        .map(|(c, _)| c)
        .collect();

    (visible, before as u16)
}

fn render_placeholder(tab: Tab, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", tab.display_name()));

    let body = Paragraph::new(tab.placeholder().unwrap_or_default())
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(body, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.active_tab(), app.input_mode) {
        (_, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (Tab::Ai, InputMode::Normal) => vec![
            Span::styled(" i ", key_style),
            Span::styled(" write ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" r ", key_style),
            Span::styled(" refresh ", label_style),
            Span::styled(" 1-3 ", key_style),
            Span::styled(" tab ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (_, InputMode::Normal) => vec![
            Span::styled(" 1-3 ", key_style),
            Span::styled(" tab ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
