use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::tui::pane::centered;
use crate::tui::theme;

/// Which record a quick-add popup creates or edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Member,
    Donation,
    Budget,
    Prayer,
    Event { group: i64, edit: Option<i64> },
    Role { department: i64 },
    Newsletter,
}

impl FormKind {
    fn title(&self) -> &'static str {
        match self {
            FormKind::Member => "Add Member",
            FormKind::Donation => "Record Donation",
            FormKind::Budget => "Add Budget",
            FormKind::Prayer => "Submit Prayer Request",
            FormKind::Event { edit: None, .. } => "Add Event",
            FormKind::Event { edit: Some(_), .. } => "Edit Event",
            FormKind::Role { .. } => "Add Role",
            FormKind::Newsletter => "Draft Newsletter",
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        match self {
            FormKind::Member => &["Name", "Email", "Phone", "Department", "Status"],
            FormKind::Donation => &["Donor", "Amount", "Type", "Category", "Method", "Note"],
            FormKind::Budget => &["Name", "Department", "Period", "Amount"],
            FormKind::Prayer => &["Title", "Description", "Requester", "Priority"],
            FormKind::Event { .. } => &["Title", "Date", "Location"],
            FormKind::Role { .. } => &["Title", "Level", "Description", "Responsibilities"],
            FormKind::Newsletter => &["Title", "Body"],
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            FormKind::Member => "status: active, inactive or visitor",
            FormKind::Donation => "type: tithe, offering…  method: cash, card…",
            FormKind::Budget => "period: monthly, quarterly or annual",
            FormKind::Prayer => "priority: low, normal, high or urgent",
            FormKind::Event { .. } => "date as YYYY-MM-DD",
            FormKind::Role { .. } => "level: head, leader, member…  split duties with \\n",
            FormKind::Newsletter => "saved as a draft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Editing,
    Cancel,
    Submit,
}

/// Labelled text fields edited one at a time.
#[derive(Debug, Clone)]
pub struct FormPopup {
    pub kind: FormKind,
    values: Vec<String>,
    cursor: usize,
    pub error: Option<String>,
}

impl FormPopup {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            values: vec![String::new(); kind.labels().len()],
            cursor: 0,
            error: None,
        }
    }

    /// Pre-fills fields in label order.
    pub fn with_values(mut self, values: &[&str]) -> Self {
        for (slot, value) in self.values.iter_mut().zip(values) {
            *slot = value.to_string();
        }
        self
    }

    pub fn value(&self, label: &str) -> &str {
        self.kind
            .labels()
            .iter()
            .position(|l| *l == label)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        let last = self.values.len().saturating_sub(1);
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter if self.cursor == last => return FormAction::Submit,
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => {
                self.cursor = (self.cursor + 1).min(last);
            }
            KeyCode::BackTab | KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Backspace => {
                if let Some(value) = self.values.get_mut(self.cursor) {
                    value.pop();
                }
                self.error = None;
            }
            KeyCode::Char(c) => {
                if let Some(value) = self.values.get_mut(self.cursor) {
                    value.push(c);
                }
                self.error = None;
            }
            _ => {}
        }
        FormAction::Editing
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let labels = self.kind.labels();
        let height = (labels.len() as u16 * 2 + 7).min(area.height);
        let mut popup = centered(area, 60, 100);
        popup.y = area.y + area.height.saturating_sub(height) / 2;
        popup.height = height;
        frame.render_widget(Clear, popup);

        let mut lines = vec![Line::from("")];
        for (i, (label, value)) in labels.iter().zip(&self.values).enumerate() {
            let active = i == self.cursor;
            let label_style = if active { theme::gold() } else { theme::dim() };
            let mut spans = vec![
                Span::styled(format!("  {:<12}", label), label_style),
                Span::styled(value.clone(), theme::bold()),
            ];
            if active {
                spans.push(Span::styled("█", theme::amber()));
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }
        match &self.error {
            Some(err) => lines.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red()))),
            None => lines.push(Line::from(Span::styled(
                format!("  {}", self.kind.hint()),
                theme::dim(),
            ))),
        }
        lines.push(Line::from(Span::styled(
            "  [Tab/↑↓] field  ·  [Enter] next / save  ·  [Esc] cancel",
            theme::dim(),
        )));

        let border = if self.error.is_some() {
            theme::red()
        } else {
            theme::amber()
        };
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.kind.title()),
                theme::gold().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border)
            .style(theme::surface());
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

const HELP: &[(&str, &str)] = &[
    ("0-9", "Switch section"),
    ("↑ ↓", "Move"),
    ("/", "Search"),
    ("f", "Cycle status filter"),
    ("o", "Cycle sort"),
    ("Space", "Toggle selection"),
    ("a", "Select all visible"),
    ("n", "Advance status"),
    ("x", "Remove selected"),
    ("+", "Add record"),
    ("Enter", "Details"),
    ("m / r", "Department members / roles"),
    ("v / e", "Group events / edit event"),
    ("c", "Live check-in feed"),
    ("R", "Finance report"),
    ("t", "Teachers"),
    ("g", "Reload section"),
    ("?", "Toggle help"),
    ("Esc", "Back / quit"),
];

pub fn help(frame: &mut Frame, area: Rect) {
    let height = (HELP.len() as u16 + 4).min(area.height);
    let mut popup = centered(area, 50, 100);
    popup.y = area.y + area.height.saturating_sub(height) / 2;
    popup.height = height;
    frame.render_widget(Clear, popup);

    let mut lines = vec![Line::from("")];
    lines.extend(HELP.iter().map(|(key, label)| {
        Line::from(vec![
            Span::styled(format!("  [{:<6}] ", key), theme::gold()),
            Span::styled(*label, theme::dim()),
        ])
    }));

    let block = Block::default()
        .title(Span::styled(" Keybindings ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_fills_the_active_field() {
        let mut form = FormPopup::new(FormKind::Budget);
        for c in "Retreat".chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
        form.handle_key(key(KeyCode::Tab));
        form.handle_key(key(KeyCode::Char('Y')));
        form.handle_key(key(KeyCode::Backspace));
        assert_eq!(form.value("Name"), "Retreat");
        assert_eq!(form.value("Department"), "");
        assert_eq!(form.value("Missing"), "");
    }

    #[test]
    fn enter_on_last_field_submits() {
        let mut form = FormPopup::new(FormKind::Event { group: 1, edit: None })
            .with_values(&["Picnic", "2026-06-01"]);
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Editing);
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Editing);
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Submit);
        assert_eq!(form.value("Date"), "2026-06-01");
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Cancel);
    }
}
