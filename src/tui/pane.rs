//! A board rendered as a table, plus the keyboard operations every section shares.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::board::{Board, Filterable, Record, Sort, Sortable};
use crate::tui::theme;

/// What rows need to format themselves.
pub struct Ctx<'a> {
    pub symbol: &'a str,
    pub today: NaiveDate,
}

/// A record that knows how to lay itself out as a table row.
pub trait Tabular: Record + Filterable + Sortable + Clone {
    /// Header and width; a width of 0 takes the remaining space.
    fn columns() -> &'static [(&'static str, u16)];

    fn cells(&self, ctx: &Ctx) -> Vec<Cell<'static>>;

    /// Facet values `f` steps through, with their labels.
    fn facet_cycle() -> Vec<(Self::Facet, &'static str)> {
        Vec::new()
    }

    fn detail(&self, ctx: &Ctx) -> Vec<Line<'static>>;
}

/// Board operations the key handler needs without knowing the record type.
pub trait Pane {
    fn search_term(&self) -> &str;
    fn set_search(&mut self, term: String);
    /// Moves to the next facet value and returns its label.
    fn cycle_facet(&mut self) -> Option<&'static str>;
    fn cycle_sort(&mut self) -> String;
    fn move_focus(&mut self, delta: isize);
    fn toggle_focused(&mut self);
    fn toggle_all(&mut self);
    fn toggle_detail(&mut self);
    fn detail_open(&self) -> bool;
    fn render(&self, frame: &mut Frame, area: Rect, title: &str, ctx: &Ctx);
    fn render_detail(&self, frame: &mut Frame, area: Rect, ctx: &Ctx);
}

impl<T: Tabular> Pane for Board<T> {
    fn search_term(&self) -> &str {
        self.filter.search_term()
    }

    fn set_search(&mut self, term: String) {
        self.filter.set_search(term);
        self.clamp_focus();
    }

    fn cycle_facet(&mut self) -> Option<&'static str> {
        let cycle = T::facet_cycle();
        let (first, _) = cycle.first()?.clone();
        let current = self
            .filter
            .selected_like(&first)
            .and_then(|sel| cycle.iter().position(|(f, _)| f == sel));
        let next = match current {
            None => Some(0),
            Some(i) if i + 1 < cycle.len() => Some(i + 1),
            Some(_) => None,
        };
        let label = match next {
            Some(i) => {
                self.filter.set(cycle[i].0.clone());
                cycle[i].1
            }
            None => {
                self.filter.clear_kind(&first);
                "all"
            }
        };
        self.clamp_focus();
        Some(label)
    }

    fn cycle_sort(&mut self) -> String {
        self.sort = Sort::cycle::<T>(self.sort);
        match &self.sort {
            Some(sort) => format!("Sorted by {}", sort.describe::<T>()),
            None => "Load order".to_string(),
        }
    }

    fn move_focus(&mut self, delta: isize) {
        Board::move_focus(self, delta);
    }

    fn toggle_focused(&mut self) {
        Board::toggle_focused(self);
    }

    fn toggle_all(&mut self) {
        self.toggle_all_visible();
    }

    fn toggle_detail(&mut self) {
        self.detail_open = !self.detail_open && self.focused().is_some();
    }

    fn detail_open(&self) -> bool {
        self.detail_open
    }

    fn render(&self, frame: &mut Frame, area: Rect, title: &str, ctx: &Ctx) {
        let visible = self.visible();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border(true))
            .style(theme::base())
            .title(Span::styled(
                format!(" {} ", title),
                theme::gold().add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(Span::styled(
                format!(" {} ", criteria(self, visible.len())),
                theme::dim(),
            )));

        if visible.is_empty() {
            let message = if self.loading {
                "Loading…"
            } else if self.filter.is_empty() {
                "Nothing here yet"
            } else {
                "No records match the current filter"
            };
            let para = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(format!("  {}", message), theme::dim())),
            ])
            .block(block);
            frame.render_widget(para, area);
            return;
        }

        let mut widths = vec![Constraint::Length(2)];
        widths.extend(T::columns().iter().map(|(_, w)| match w {
            0 => Constraint::Fill(1),
            w => Constraint::Length(*w),
        }));

        let header = Row::new(
            std::iter::once("")
                .chain(T::columns().iter().map(|(h, _)| *h))
                .map(|h| Cell::from(Span::styled(h, theme::dim()))),
        );

        let rows: Vec<Row> = visible
            .iter()
            .map(|record| {
                let mark = if self.selection.contains(record.id()) {
                    "●"
                } else {
                    " "
                };
                let mut cells = vec![Cell::from(Span::styled(mark, theme::gold()))];
                cells.extend(record.cells(ctx));
                Row::new(cells)
            })
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::highlight());
        let mut state = TableState::default().with_selected(Some(self.focus));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, ctx: &Ctx) {
        let Some(record) = self.focused() else {
            return;
        };
        let popup = centered(area, 70, 70);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface())
            .title(Span::styled(
                format!(" {} #{} ", capitalize(T::ENTITY), record.id()),
                theme::gold().add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(Span::styled(" [Enter/Esc] close ", theme::dim())));
        let para = Paragraph::new(record.detail(ctx))
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(para, popup);
    }
}

/// Search, facet, sort and selection in one line for the table footer.
fn criteria<T: Tabular>(board: &Board<T>, shown: usize) -> String {
    let mut parts = vec![format!("{}/{}", shown, board.items().len())];
    if !board.filter.search_term().trim().is_empty() {
        parts.push(format!("search \"{}\"", board.filter.search_term()));
    }
    for (facet, label) in T::facet_cycle() {
        if board.filter.selected().contains(&facet) {
            parts.push(label.to_string());
        }
    }
    if let Some(sort) = &board.sort {
        parts.push(sort.describe::<T>());
    }
    if !board.selection.is_empty() {
        parts.push(format!("{} selected", board.selection.len()));
    }
    parts.join("  ·  ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A rect `pct_x` by `pct_y` percent of `area`, centered in it.
pub fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let width = area.width * pct_x / 100;
    let height = area.height * pct_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// A `label  value` line for detail overlays.
pub fn field(label: &'static str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<14}", label), theme::dim()),
        Span::styled(value.into(), theme::bold()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::MemberFacet;
    use crate::models::{Member, MemberStatus};
    use crate::service::{Envelope, Toasts};

    fn member(id: i64, name: &str, status: MemberStatus) -> Member {
        Member {
            id,
            name: name.into(),
            email: format!("{}@example.org", name.to_lowercase()),
            phone: None,
            department: None,
            status,
            joined_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn facet_cycle_walks_values_then_clears() {
        let mut board: Board<Member> = Board::new();
        board.load(
            Envelope::ok(vec![
                member(1, "Ada", MemberStatus::Active),
                member(2, "Ben", MemberStatus::Visitor),
            ]),
            &mut Toasts::default(),
        );

        assert_eq!(Pane::cycle_facet(&mut board), Some("Active"));
        assert_eq!(board.visible_ids(), vec![1]);
        assert_eq!(Pane::cycle_facet(&mut board), Some("Inactive"));
        assert!(board.visible().is_empty());
        assert_eq!(Pane::cycle_facet(&mut board), Some("Visitor"));
        assert_eq!(board.visible_ids(), vec![2]);
        assert_eq!(Pane::cycle_facet(&mut board), Some("all"));
        assert!(board
            .filter
            .selected_like(&MemberFacet::Status(MemberStatus::Active))
            .is_none());
    }

    #[test]
    fn criteria_reports_search_and_selection() {
        let mut board: Board<Member> = Board::new();
        board.load(
            Envelope::ok(vec![member(1, "Ada", MemberStatus::Active)]),
            &mut Toasts::default(),
        );
        board.set_search("ad".into());
        board.toggle_all_visible();
        assert_eq!(criteria(&board, 1), "1/1  ·  search \"ad\"  ·  1 selected");
    }

    #[test]
    fn centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered(area, 50, 50);
        assert_eq!(popup, Rect::new(25, 10, 50, 20));
    }
}
