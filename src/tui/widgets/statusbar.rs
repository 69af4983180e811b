use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::service::Notice;
use crate::tui::theme;

/// Key hints on the left, the latest notice on the right.
pub fn render(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], latest: Option<&Notice>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mut spans = vec![Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!("[{}]", key), theme::gold()));
        spans.push(Span::styled(format!(" {}  ", label), theme::dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), columns[0]);

    if let Some(notice) = latest {
        let toast = Paragraph::new(Line::from(Span::styled(
            format!("{} ", notice.message),
            theme::notice(notice.kind),
        )))
        .alignment(Alignment::Right);
        frame.render_widget(toast, columns[1]);
    }
}
