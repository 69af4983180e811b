use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::fixtures;
use crate::db::repository::meta::{MetaRepo, SETUP_DONE};
use crate::models::ServiceType;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;

// ─── Wizard steps ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Welcome,
    ChurchName,
    Currency,
    DefaultService,
    SeedDemo,
    Confirm,
}

impl Step {
    const TOTAL: usize = 5;

    fn number(self) -> usize {
        match self {
            Step::Welcome => 0,
            Step::ChurchName => 1,
            Step::Currency => 2,
            Step::DefaultService => 3,
            Step::SeedDemo => 4,
            Step::Confirm => 5,
        }
    }

    fn next(self) -> Step {
        match self {
            Step::Welcome => Step::ChurchName,
            Step::ChurchName => Step::Currency,
            Step::Currency => Step::DefaultService,
            Step::DefaultService => Step::SeedDemo,
            Step::SeedDemo | Step::Confirm => Step::Confirm,
        }
    }

    fn previous(self) -> Option<Step> {
        match self {
            Step::Welcome => None,
            Step::ChurchName => Some(Step::Welcome),
            Step::Currency => Some(Step::ChurchName),
            Step::DefaultService => Some(Step::Currency),
            Step::SeedDemo => Some(Step::DefaultService),
            Step::Confirm => Some(Step::SeedDemo),
        }
    }
}

// ─── Wizard state ─────────────────────────────────────────────────────────────

struct SetupWizard {
    step: Step,
    input: String,
    error: Option<String>,
    list_state: ListState,

    church_name: String,
    currency_symbol: String,
    service_idx: usize,
    seed_demo: bool,

    should_quit: bool,
    confirmed: bool,
}

impl SetupWizard {
    fn new(existing: &AppConfig, already_seeded: bool) -> Self {
        let service_idx = ServiceType::ALL
            .iter()
            .position(|s| *s == existing.church.default_service)
            .unwrap_or(0);
        let mut list_state = ListState::default();
        list_state.select(Some(service_idx));

        Self {
            step: Step::Welcome,
            input: String::new(),
            error: None,
            list_state,
            church_name: existing.church.name.clone(),
            currency_symbol: existing.church.currency_symbol.clone(),
            service_idx,
            seed_demo: !already_seeded,
            should_quit: false,
            confirmed: false,
        }
    }

    fn enter(&mut self, step: Step) {
        self.error = None;
        self.step = step;
        self.input = match step {
            Step::ChurchName => self.church_name.clone(),
            Step::Currency => self.currency_symbol.clone(),
            _ => String::new(),
        };
    }

    fn advance(&mut self) {
        if self.step == Step::Confirm {
            self.confirmed = true;
        } else {
            self.enter(self.step.next());
        }
    }

    fn go_back(&mut self) {
        match self.step.previous() {
            Some(step) => self.enter(step),
            None => self.should_quit = true,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.step {
            Step::Welcome => match key.code {
                KeyCode::Esc => self.should_quit = true,
                _ => self.advance(),
            },

            Step::ChurchName => self.handle_text_input(key, |s| {
                if s.is_empty() {
                    Err("Please enter your church's name".to_string())
                } else {
                    Ok(())
                }
            }),

            Step::Currency => self.handle_text_input(key, |s| {
                if s.is_empty() {
                    Err("Enter a symbol such as $, € or KSh".to_string())
                } else if s.chars().count() > 4 {
                    Err("Keep the symbol to four characters or fewer".to_string())
                } else {
                    Ok(())
                }
            }),

            Step::DefaultService => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.service_idx = self.service_idx.saturating_sub(1);
                    self.list_state.select(Some(self.service_idx));
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.service_idx + 1 < ServiceType::ALL.len() {
                        self.service_idx += 1;
                        self.list_state.select(Some(self.service_idx));
                    }
                }
                KeyCode::Enter => self.advance(),
                KeyCode::Esc => self.go_back(),
                _ => {}
            },

            Step::SeedDemo => match key.code {
                KeyCode::Left | KeyCode::Char('1') | KeyCode::Char('h') => self.seed_demo = true,
                KeyCode::Right | KeyCode::Char('2') | KeyCode::Char('l') => {
                    self.seed_demo = false
                }
                KeyCode::Enter => self.advance(),
                KeyCode::Esc => self.go_back(),
                _ => {}
            },

            Step::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => self.confirmed = true,
                KeyCode::Esc | KeyCode::Char('n') => self.go_back(),
                _ => {}
            },
        }
    }

    fn handle_text_input<F>(&mut self, key: KeyEvent, validate: F)
    where
        F: Fn(&str) -> std::result::Result<(), String>,
    {
        match key.code {
            KeyCode::Esc => self.go_back(),
            KeyCode::Enter => {
                let val = self.input.trim().to_string();
                match validate(&val) {
                    Ok(()) => {
                        match self.step {
                            Step::ChurchName => self.church_name = val,
                            Step::Currency => self.currency_symbol = val,
                            _ => {}
                        }
                        self.advance();
                    }
                    Err(e) => self.error = Some(e),
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                self.error = None;
            }
            _ => {}
        }
    }

    fn service(&self) -> ServiceType {
        ServiceType::ALL[self.service_idx.min(ServiceType::ALL.len() - 1)]
    }

    fn build_config(&self, existing: &AppConfig) -> AppConfig {
        let mut config = existing.clone();
        config.church.name = self.church_name.clone();
        config.church.currency_symbol = self.currency_symbol.clone();
        config.church.default_service = self.service();
        config
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn draw(frame: &mut Frame, wizard: &mut SetupWizard) {
    let area = frame.area();
    frame.render_widget(Block::default().style(theme::base()), area);

    let vchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(24), Constraint::Min(0)])
        .split(area);
    let hchunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(64), Constraint::Min(0)])
        .split(vchunks[1]);

    let box_area = hchunks[1];
    frame.render_widget(Clear, box_area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface())
        .title(Span::styled(
            "  ✝  flock  ·  Setup  ",
            theme::gold().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    frame.render_widget(outer, box_area);

    let inner = Rect {
        x: box_area.x + 2,
        y: box_area.y + 1,
        width: box_area.width.saturating_sub(4),
        height: box_area.height.saturating_sub(2),
    };

    match wizard.step {
        Step::Welcome => draw_welcome(frame, inner),
        Step::ChurchName | Step::Currency => draw_text_step(frame, inner, wizard),
        Step::DefaultService => draw_service_list(frame, inner, wizard),
        Step::SeedDemo => draw_choice(
            frame,
            inner,
            "Demo Congregation",
            "Load sample members, giving and budgets to explore with?",
            &["Yes, load demo data", "No, start empty"],
            if wizard.seed_demo { 0 } else { 1 },
        ),
        Step::Confirm => draw_confirm(frame, inner, wizard),
    }

    draw_progress(frame, inner, wizard.step.number(), Step::TOTAL);
}

fn content_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 2,
        width: area.width,
        height: area.height.saturating_sub(2),
    }
}

fn draw_progress(frame: &mut Frame, area: Rect, current: usize, total: usize) {
    let mut spans = vec![Span::styled("  ", theme::dim())];
    for i in 1..=total {
        let (dot, style) = match i.cmp(&current) {
            std::cmp::Ordering::Less => ("● ", theme::green()),
            std::cmp::Ordering::Equal => ("◉ ", theme::gold()),
            std::cmp::Ordering::Greater => ("○ ", theme::dim()),
        };
        spans.push(Span::styled(dot, style));
    }
    let row = Rect { height: 1, ..area };
    frame.render_widget(Paragraph::new(Line::from(spans)), row);
}

fn bullet(text: &str) -> Line<'_> {
    Line::from(vec![
        Span::styled("  ●  ", theme::gold()),
        Span::styled(text, theme::dim()),
    ])
}

fn draw_welcome(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("Welcome to flock", theme::bold())),
        Line::from(""),
        Line::from(Span::styled(
            "Members, giving and ministries from one terminal.",
            theme::dim(),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled("This wizard will set:", theme::dim())),
        bullet("Your church's name for headers and reports"),
        bullet("The currency symbol used for giving and budgets"),
        bullet("The service new check-ins default to"),
        bullet("Optional demo data to explore with"),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press  Enter  to begin  ·  Esc  to cancel",
            theme::dim(),
        )),
    ];
    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_text_step(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let (title, subtitle, hint) = match wizard.step {
        Step::ChurchName => (
            "Church Name",
            "Shown in the dashboard header and exports",
            "e.g.  Grace Community Church",
        ),
        _ => (
            "Currency Symbol",
            "Prefixed to every amount",
            "e.g.  $   €   £   KSh",
        ),
    };

    let cursor = if wizard.input.chars().count() < 40 { "█" } else { "" };
    let input_width = area.width.saturating_sub(8) as usize;
    let padded = format!(
        "{:<width$}",
        format!("  {}{}  ", wizard.input, cursor),
        width = input_width
    );
    let input_style = if wizard.error.is_some() {
        theme::red()
    } else {
        theme::amber()
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(title, theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(padded, input_style.add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    match &wizard.error {
        Some(err) => lines.push(Line::from(Span::styled(format!("  ✗  {}", err), theme::red()))),
        None => lines.push(Line::from(Span::styled(hint, theme::dim()))),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_service_list(frame: &mut Frame, area: Rect, wizard: &mut SetupWizard) {
    let header = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Default Service",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Used for check-ins that don't name a service",
            theme::dim(),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(
        header,
        Rect {
            y: area.y + 2,
            height: 4,
            ..area
        },
    );

    let items: Vec<ListItem> = ServiceType::ALL
        .iter()
        .enumerate()
        .map(|(i, service)| {
            let line = if i == wizard.service_idx {
                Line::from(vec![
                    Span::styled("  ◉  ", theme::gold()),
                    Span::styled(service.label(), theme::gold().add_modifier(Modifier::BOLD)),
                ])
            } else {
                Line::from(vec![
                    Span::styled("  ○  ", theme::dim()),
                    Span::styled(service.label(), theme::dim()),
                ])
            };
            ListItem::new(line)
        })
        .collect();

    let list_area = Rect {
        x: area.x + 2,
        y: area.y + 8,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(11),
    };
    let list = List::new(items).style(theme::surface());
    frame.render_stateful_widget(list, list_area, &mut wizard.list_state);

    let footer = Paragraph::new(Line::from(Span::styled(
        "↑↓  navigate   ·   Enter  select   ·   Esc  back",
        theme::dim(),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(
        footer,
        Rect {
            y: area.y + area.height.saturating_sub(2),
            height: 1,
            ..area
        },
    );
}

fn draw_choice(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    subtitle: &str,
    options: &[&str],
    selected: usize,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, theme::gold().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim())),
        Line::from(""),
        Line::from(""),
    ];
    for (i, opt) in options.iter().enumerate() {
        let (dot, style) = if i == selected {
            ("  ◉  ", theme::gold().add_modifier(Modifier::BOLD))
        } else {
            ("  ○  ", theme::dim())
        };
        lines.push(Line::from(vec![
            Span::styled(dot, style),
            Span::styled(*opt, style),
        ]));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "←→  or  1 2  choose   ·   Enter  confirm   ·   Esc  back",
        theme::dim(),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

fn draw_confirm(frame: &mut Frame, area: Rect, wizard: &SetupWizard) {
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", label), theme::dim()),
            Span::styled(value, theme::bold()),
        ])
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Confirm Settings",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Review your configuration:", theme::dim())),
        Line::from(""),
        row("Church", wizard.church_name.clone()),
        row("Currency", wizard.currency_symbol.clone()),
        row("Service", wizard.service().label().to_string()),
        row(
            "Demo data",
            if wizard.seed_demo { "load" } else { "skip" }.to_string(),
        ),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Enter  save   ·   Esc  go back",
            theme::dim(),
        )),
    ];
    let para = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(para, content_area(area));
}

// ─── Public entry point ──────────────────────────────────────────────────────

pub fn run_setup_tui(conn: &Connection, config: &mut AppConfig) -> Result<()> {
    let already_seeded = fixtures::is_seeded(conn)?;
    let mut wizard = SetupWizard::new(config, already_seeded);
    let mut terminal = ratatui::init();
    let events = EventHandler::new(100);

    let outcome: Result<bool> = loop {
        if let Err(err) = terminal.draw(|frame| draw(frame, &mut wizard)) {
            break Err(err.into());
        }
        match events.next() {
            Ok(Event::Key(key)) => {
                wizard.handle_key(key);
                if wizard.should_quit {
                    log::info!("setup cancelled");
                    break Ok(false);
                }
                if wizard.confirmed {
                    break Ok(true);
                }
            }
            Ok(Event::Resize | Event::Tick) => {}
            Err(err) => break Err(err.into()),
        }
    };
    ratatui::restore();

    if !outcome? {
        return Ok(());
    }

    *config = wizard.build_config(config);
    config.save()?;
    if wizard.seed_demo && !already_seeded {
        let today = Local::now().date_naive();
        let report = fixtures::seed(conn, today, &config.finance.receipt_prefix)?;
        log::info!("seeded {} demo members", report.members);
    }
    MetaRepo::set(conn, SETUP_DONE, "1")?;
    println!("  {} is ready. Run `flock` to open the dashboard.", config.church.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(wizard: &mut SetupWizard, code: KeyCode) {
        wizard.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(wizard: &mut SetupWizard, text: &str) {
        for c in text.chars() {
            press(wizard, KeyCode::Char(c));
        }
    }

    #[test]
    fn walks_through_every_step() {
        let mut wizard = SetupWizard::new(&AppConfig::default(), false);
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::ChurchName);
        assert_eq!(wizard.input, "Grace Community Church");

        wizard.input.clear();
        type_text(&mut wizard, "Hillside Chapel");
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::Currency);

        wizard.input.clear();
        type_text(&mut wizard, "€");
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::DefaultService);

        press(&mut wizard, KeyCode::Down);
        press(&mut wizard, KeyCode::Down);
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::SeedDemo);

        press(&mut wizard, KeyCode::Right);
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::Confirm);
        press(&mut wizard, KeyCode::Enter);
        assert!(wizard.confirmed);

        let config = wizard.build_config(&AppConfig::default());
        assert_eq!(config.church.name, "Hillside Chapel");
        assert_eq!(config.church.currency_symbol, "€");
        assert_eq!(config.church.default_service, ServiceType::Midweek);
        assert!(!wizard.seed_demo);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut wizard = SetupWizard::new(&AppConfig::default(), false);
        wizard.enter(Step::ChurchName);
        wizard.input = "   ".into();
        press(&mut wizard, KeyCode::Enter);
        assert_eq!(wizard.step, Step::ChurchName);
        assert!(wizard.error.is_some());

        press(&mut wizard, KeyCode::Char('G'));
        assert!(wizard.error.is_none());
    }

    #[test]
    fn escape_steps_back_then_quits() {
        let mut wizard = SetupWizard::new(&AppConfig::default(), true);
        assert!(!wizard.seed_demo);
        wizard.enter(Step::Currency);
        press(&mut wizard, KeyCode::Esc);
        assert_eq!(wizard.step, Step::ChurchName);
        press(&mut wizard, KeyCode::Esc);
        press(&mut wizard, KeyCode::Esc);
        assert!(wizard.should_quit);
    }
}
