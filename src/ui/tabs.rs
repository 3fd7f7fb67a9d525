use ratatui::prelude::*;
use ratatui::widgets::*;

use super::{ACCENT, MUTED};
use crate::app::App;
use crate::route::Route;

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Route::all()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let style = if i == app.route.index() {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            Line::from(Span::styled(*t, style))
        })
        .collect();

    let player = match app.services.session.current() {
        Some(identity) => format!(" 🧭 {} ", identity.user_name),
        None => " not signed in ".to_string(),
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
                .border_type(BorderType::Rounded)
                .title(" 🌍 Travel Quiz ")
                .title_style(
                    Style::default()
                        .fg(Color::Rgb(200, 120, 255))
                        .add_modifier(Modifier::BOLD),
                )
                .title_top(Line::from(player).right_aligned()),
        )
        .select(app.route.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));

    frame.render_widget(tabs, area);
}
