pub mod tabs;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;

pub const ACCENT: Color = Color::Rgb(255, 220, 80);
pub const INFO: Color = Color::Rgb(80, 200, 255);
pub const MUTED: Color = Color::Rgb(120, 120, 140);
pub const TEXT: Color = Color::Rgb(220, 220, 235);
pub const GOOD: Color = Color::Rgb(80, 220, 80);
pub const BAD: Color = Color::Rgb(220, 80, 80);
pub const PANEL_BG: Color = Color::Rgb(15, 15, 25);

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Route bar
            Constraint::Min(0),    // Content
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);
    app.current_screen().render(frame, chunks[1]);

    // Alerts render on top of everything
    if let Some(message) = &app.services.alert {
        render_alert(frame, frame.area(), message);
    }
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(2));
    let h = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

/// Rounded card with a bold title, returning the inner area.
pub fn card(frame: &mut Frame, area: Rect, title: &str, border: Color) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(title)
        .title_style(Style::default().fg(border).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Key hint line such as `Enter start  Esc quit`.
pub fn hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (key, action) in pairs {
        spans.push(Span::styled(*key, Style::default().fg(INFO).add_modifier(Modifier::BOLD)));
        spans.push(Span::styled(format!(" {}  ", action), Style::default().fg(MUTED)));
    }
    Line::from(spans)
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let overlay_area = centered(area, 48, 7);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(ACCENT))
        .title(" Notice ")
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(PANEL_BG));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(TEXT).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("press any key", Style::default().fg(MUTED))),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(PANEL_BG));
    frame.render_widget(p, inner);
}
