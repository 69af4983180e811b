use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{
    AttendanceStatus, AttendanceSummary, DailyAttendance, DashboardSummary, FinanceReport,
    GivingSummary,
};
use crate::tui::theme;
use crate::utils::format::{format_money, format_percent, progress_bar, truncate};

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(format!(" {} ", title), theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface())
}

fn stat(label: &str, value: String, style: ratatui::style::Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<18}", label), theme::dim()),
        Span::styled(value, style.add_modifier(Modifier::BOLD)),
    ])
}

/// The home screen: headline counts on the left, the week's attendance on the right.
pub fn dashboard(
    frame: &mut Frame,
    area: Rect,
    summary: &DashboardSummary,
    daily: &[DailyAttendance],
    symbol: &str,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Length(6), Constraint::Min(0)])
        .split(columns[0]);

    let members = vec![
        Line::from(""),
        stat("Members", summary.members_total.to_string(), theme::bold()),
        stat("Active", summary.members_active.to_string(), theme::green()),
        stat("Visitors", summary.visitors.to_string(), theme::amber()),
    ];
    frame.render_widget(Paragraph::new(members).block(panel("Congregation")), left[0]);

    let budget_style = if summary.budgets_exceeded > 0 {
        theme::red()
    } else {
        theme::green()
    };
    let finance = vec![
        Line::from(""),
        stat(
            "Giving this month",
            format_money(symbol, summary.giving_this_month),
            theme::gold(),
        ),
        stat(
            "Budgets over",
            format!(
                "{}  ({} at warning)",
                summary.budgets_exceeded, summary.budgets_warning
            ),
            budget_style,
        ),
    ];
    frame.render_widget(Paragraph::new(finance).block(panel("Finance")), left[1]);

    let care = vec![
        Line::from(""),
        stat("Open prayer", summary.open_prayers.to_string(), theme::amber()),
        stat(
            "Newsletters queued",
            summary.newsletters_scheduled.to_string(),
            theme::bold(),
        ),
    ];
    frame.render_widget(Paragraph::new(care).block(panel("Care & Comms")), left[2]);

    let mut week = vec![
        Line::from(""),
        stat(
            "Check-ins, 7 days",
            summary.attendance_this_week.to_string(),
            theme::green(),
        ),
        Line::from(""),
    ];
    if daily.is_empty() {
        week.push(Line::from(Span::styled(
            "  No services recorded this week",
            theme::dim(),
        )));
    }
    for day in daily {
        let style = match day.completion_ratio() {
            r if r >= 0.8 => theme::green(),
            r if r >= 0.5 => theme::amber(),
            _ => theme::red(),
        };
        week.push(Line::from(vec![
            Span::styled(format!("  {}  ", day.date.format("%a %b %d")), theme::dim()),
            Span::styled(progress_bar(day.attended, day.total, 14), style),
            Span::styled(format!("  {}/{}", day.attended, day.total), theme::dim()),
        ]));
    }
    frame.render_widget(Paragraph::new(week).block(panel("Attendance")), columns[1]);
}

/// One-line totals over the giving rows currently shown.
pub fn giving_line(summary: &GivingSummary, symbol: &str) -> Line<'static> {
    let most_used = summary
        .most_used()
        .map(|c| c.label())
        .unwrap_or("—");
    Line::from(vec![
        Span::styled("  Total ", theme::dim()),
        Span::styled(format_money(symbol, summary.total), theme::gold()),
        Span::styled(format!("  ·  {} gifts", summary.count), theme::dim()),
        Span::styled("  ·  most used ", theme::dim()),
        Span::styled(most_used, theme::bold()),
        Span::styled("  ·  avg per category ", theme::dim()),
        Span::styled(
            format_money(symbol, summary.average_per_category()),
            theme::bold(),
        ),
    ])
}

/// One-line status counts over the check-ins currently shown.
pub fn attendance_line(summary: &AttendanceSummary) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("  {} records  ·  ", summary.total),
        theme::dim(),
    )];
    for status in AttendanceStatus::ALL {
        spans.push(Span::styled(
            format!("{} {}  ", status.label(), summary.count(*status)),
            if status.attended() {
                theme::green()
            } else {
                theme::dim()
            },
        ));
    }
    spans.push(Span::styled("·  rate ", theme::dim()));
    spans.push(Span::styled(
        format_percent(summary.rate() as f64),
        theme::gold(),
    ));
    Line::from(spans)
}

/// Income against expenses for the report period.
pub fn report(frame: &mut Frame, area: Rect, report: &FinanceReport, symbol: &str) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let row = |label: String, amount: f64, style| {
        Line::from(vec![
            Span::styled(format!("  {:<20}", truncate(&label, 20)), theme::dim()),
            Span::styled(format!("{:>14}", format_money(symbol, amount)), style),
        ])
    };

    let mut income = vec![Line::from("")];
    income.extend(
        report
            .income_by_category
            .iter()
            .map(|(category, total)| row(category.label().to_string(), *total, theme::bold())),
    );
    income.push(Line::from(""));
    income.push(row("Total".into(), report.income, theme::green()));
    let title = format!("Income  {} → {}", report.from, report.to);
    frame.render_widget(Paragraph::new(income).block(panel(&title)), columns[0]);

    let mut expenses = vec![Line::from("")];
    expenses.extend(
        report
            .expenses_by_budget
            .iter()
            .map(|(budget, total)| row(budget.clone(), *total, theme::bold())),
    );
    expenses.push(Line::from(""));
    expenses.push(row("Total".into(), report.expenses, theme::amber()));
    let net = report.net();
    expenses.push(row(
        "Net".into(),
        net,
        if net < 0.0 { theme::red() } else { theme::green() },
    ));
    frame.render_widget(Paragraph::new(expenses).block(panel("Expenses")), columns[1]);
}
