use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
    Frame,
};

use crate::service::Route;
use crate::tui::theme;

/// Church name and date on top, numbered section tabs below.
pub fn render(frame: &mut Frame, area: Rect, church: &str, today: NaiveDate, route: &Route) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let title = Line::from(vec![
        Span::styled("  ✝  ", theme::gold()),
        Span::styled(church.to_string(), theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(today.format("%A, %b %d, %Y").to_string(), theme::dim()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(route.path(), theme::dim()),
    ]);
    frame.render_widget(Paragraph::new(title), rows[0]);

    let titles: Vec<Line> = Route::tabs()
        .iter()
        .enumerate()
        .map(|(key, (_, label))| {
            Line::from(vec![
                Span::styled(format!("{} ", key), theme::dim()),
                Span::raw(*label),
            ])
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(route.tab())
        .style(theme::dim())
        .highlight_style(theme::gold().add_modifier(Modifier::BOLD))
        .divider(Span::styled("│", theme::dim()));
    frame.render_widget(tabs, rows[1]);
}
