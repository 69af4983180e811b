use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::Cell,
};

use crate::models::attendance::AttendanceFacet;
use crate::models::department::{DepartmentMemberFacet, RoleFacet};
use crate::models::finance::{BudgetFacet, DonationFacet};
use crate::models::group::GroupFacet;
use crate::models::member::MemberFacet;
use crate::models::newsletter::NewsletterFacet;
use crate::models::prayer::PrayerFacet;
use crate::models::{
    AttendanceRecord, AttendanceStatus, Budget, BudgetStatus, Department, DepartmentMember,
    DepartmentRole, Donation, DonationStatus, Group, GroupCategory, GroupEvent, Member,
    MemberStatus, Newsletter, NewsletterStatus, PrayerRequest, PrayerStatus, SchoolClass, Teacher,
};
use crate::tui::pane::{field, Ctx, Tabular};
use crate::tui::theme;
use crate::utils::format::{format_money, format_percent, format_time, progress_bar};

fn text(value: impl Into<String>) -> Cell<'static> {
    Cell::from(value.into())
}

fn styled(value: impl Into<String>, style: Style) -> Cell<'static> {
    Cell::from(Span::styled(value.into(), style))
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "—".to_string())
}

impl Tabular for Member {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Name", 0), ("Email", 28), ("Department", 14), ("Status", 9), ("Joined", 11)]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        let status_style = match self.status {
            MemberStatus::Active => theme::green(),
            MemberStatus::Inactive => theme::dim(),
            MemberStatus::Visitor => theme::amber(),
        };
        vec![
            text(self.name.clone()),
            styled(self.email.clone(), theme::dim()),
            text(or_dash(&self.department)),
            styled(self.status.label(), status_style),
            styled(self.joined_on.to_string(), theme::dim()),
        ]
    }

    fn facet_cycle() -> Vec<(MemberFacet, &'static str)> {
        MemberStatus::ALL
            .iter()
            .map(|s| (MemberFacet::Status(*s), s.label()))
            .collect()
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Name", self.name.clone()),
            field("Email", self.email.clone()),
            field("Phone", or_dash(&self.phone)),
            field("Department", or_dash(&self.department)),
            field("Status", self.status.label()),
            field("Joined", self.joined_on.to_string()),
        ]
    }
}

impl Tabular for AttendanceRecord {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Member", 0), ("Service", 16), ("Date", 11), ("Status", 9), ("In", 6)]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        let status_style = match self.status {
            AttendanceStatus::Present => theme::green(),
            AttendanceStatus::Late | AttendanceStatus::Partial => theme::amber(),
            AttendanceStatus::Absent => theme::red(),
            AttendanceStatus::Excused => theme::dim(),
        };
        vec![
            text(self.member_name.clone()),
            text(self.service_type.label()),
            styled(self.service_date.to_string(), theme::dim()),
            styled(self.status.label(), status_style),
            styled(format_time(self.checked_in_at), theme::dim()),
        ]
    }

    fn facet_cycle() -> Vec<(AttendanceFacet, &'static str)> {
        AttendanceStatus::ALL
            .iter()
            .map(|s| (AttendanceFacet::Status(*s), s.label()))
            .collect()
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Member", self.member_name.clone()),
            field("Service", self.service_type.label()),
            field("Date", self.service_date.to_string()),
            field("Status", self.status.label()),
            field("Checked in", self.checked_in_at.format("%Y-%m-%d %H:%M").to_string()),
        ]
    }
}

impl Tabular for Donation {
    fn columns() -> &'static [(&'static str, u16)] {
        &[
            ("Donor", 0),
            ("Amount", 13),
            ("Category", 15),
            ("Method", 13),
            ("Status", 10),
            ("Date", 11),
            ("Receipt", 11),
        ]
    }

    fn cells(&self, ctx: &Ctx) -> Vec<Cell<'static>> {
        vec![
            text(self.donor_name.clone()),
            styled(format_money(ctx.symbol, self.amount), theme::bold()),
            text(self.category.label()),
            styled(self.method.label(), theme::dim()),
            styled(self.status.label(), theme::donation(self.status)),
            styled(self.given_on.to_string(), theme::dim()),
            styled(self.receipt_number.clone(), theme::dim()),
        ]
    }

    fn facet_cycle() -> Vec<(DonationFacet, &'static str)> {
        DonationStatus::ALL
            .iter()
            .map(|s| (DonationFacet::Status(*s), s.label()))
            .collect()
    }

    fn detail(&self, ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Donor", self.donor_name.clone()),
            field("Amount", format_money(ctx.symbol, self.amount)),
            field("Type", self.giving_type.label()),
            field("Category", self.category.label()),
            field("Method", self.method.label()),
            field("Status", self.status.label()),
            field("Given on", self.given_on.to_string()),
            field("Receipt", self.receipt_number.clone()),
            field("Note", or_dash(&self.note)),
        ]
    }
}

impl Tabular for Budget {
    fn columns() -> &'static [(&'static str, u16)] {
        &[
            ("Budget", 0),
            ("Department", 14),
            ("Spent", 13),
            ("Amount", 13),
            ("Used", 18),
            ("Status", 9),
        ]
    }

    fn cells(&self, ctx: &Ctx) -> Vec<Cell<'static>> {
        let status = self.status();
        let used = self.utilization();
        vec![
            text(self.name.clone()),
            styled(self.department.clone(), theme::dim()),
            text(format_money(ctx.symbol, self.spent)),
            styled(format_money(ctx.symbol, self.amount), theme::dim()),
            styled(
                format!("{} {:>4}", progress_bar(used, 100, 10), format_percent(used as f64)),
                theme::budget(status),
            ),
            styled(status.label(), theme::budget(status)),
        ]
    }

    fn facet_cycle() -> Vec<(BudgetFacet, &'static str)> {
        BudgetStatus::ALL
            .iter()
            .map(|s| (BudgetFacet::Status(*s), s.label()))
            .collect()
    }

    fn detail(&self, ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Budget", self.name.clone()),
            field("Department", self.department.clone()),
            field("Period", self.period.label()),
            field("Amount", format_money(ctx.symbol, self.amount)),
            field("Spent", format_money(ctx.symbol, self.spent)),
            field("Remaining", format_money(ctx.symbol, self.remaining())),
            field("Utilization", format_percent(self.utilization() as f64)),
            field("Status", self.status().label()),
        ]
    }
}

impl Tabular for Department {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Department", 22), ("Description", 0), ("Members", 8), ("Roles", 6)]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        vec![
            styled(self.name.clone(), theme::bold()),
            styled(self.description.clone(), theme::dim()),
            text(self.member_count.to_string()),
            text(self.role_count.to_string()),
        ]
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Department", self.name.clone()),
            field("Description", self.description.clone()),
            field("Members", self.member_count.to_string()),
            field("Roles", self.role_count.to_string()),
            Line::from(""),
            Line::from(Span::styled("  [m] members  ·  [r] roles", theme::dim())),
        ]
    }
}

impl Tabular for DepartmentRole {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Role", 22), ("Level", 12), ("Description", 0), ("Duties", 7)]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        vec![
            styled(self.title.clone(), theme::bold()),
            styled(self.level.label(), theme::gold()),
            styled(self.description.clone(), theme::dim()),
            text(self.responsibilities.len().to_string()),
        ]
    }

    fn facet_cycle() -> Vec<(RoleFacet, &'static str)> {
        crate::models::RoleLevel::ALL
            .iter()
            .map(|l| (RoleFacet::Level(*l), l.label()))
            .collect()
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(""),
            field("Role", self.title.clone()),
            field("Level", self.level.label()),
            field("Description", self.description.clone()),
            Line::from(""),
            Line::from(Span::styled("  Responsibilities", theme::gold())),
        ];
        lines.extend(self.responsibilities.iter().map(|r| {
            Line::from(vec![
                Span::styled("    ●  ", theme::gold()),
                Span::styled(r.clone(), theme::bold()),
            ])
        }));
        lines
    }
}

impl Tabular for DepartmentMember {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Member", 0), ("Role", 22), ("Level", 12)]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        vec![
            text(self.member_name.clone()),
            text(or_dash(&self.role_title)),
            styled(
                self.role_level.map(|l| l.label()).unwrap_or("—"),
                theme::gold(),
            ),
        ]
    }

    fn facet_cycle() -> Vec<(DepartmentMemberFacet, &'static str)> {
        crate::models::RoleLevel::ALL
            .iter()
            .map(|l| (DepartmentMemberFacet::Level(*l), l.label()))
            .collect()
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Member", self.member_name.clone()),
            field("Member id", self.member_id.to_string()),
            field("Role", or_dash(&self.role_title)),
            field(
                "Level",
                self.role_level.map(|l| l.label()).unwrap_or("—"),
            ),
        ]
    }
}

impl Tabular for Group {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Group", 0), ("Category", 13), ("Leader", 18), ("Members", 8), ("Meets", 22)]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        let capacity_style = if self.is_full() {
            theme::red()
        } else {
            theme::green()
        };
        vec![
            styled(self.name.clone(), theme::bold()),
            text(self.category.label()),
            text(self.leader.clone()),
            styled(self.capacity_label(), capacity_style),
            styled(self.schedule.clone(), theme::dim()),
        ]
    }

    fn facet_cycle() -> Vec<(GroupFacet, &'static str)> {
        GroupCategory::ALL
            .iter()
            .map(|c| (GroupFacet::Category(*c), c.label()))
            .collect()
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Group", self.name.clone()),
            field("Category", self.category.label()),
            field("Leader", self.leader.clone()),
            field("Members", self.capacity_label()),
            field("Meets", self.schedule.clone()),
            Line::from(""),
            Line::from(Span::styled("  [v] events", theme::dim())),
        ]
    }
}

impl Tabular for GroupEvent {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Event", 0), ("Date", 11), ("Location", 22)]
    }

    fn cells(&self, ctx: &Ctx) -> Vec<Cell<'static>> {
        let date_style = if self.event_date < ctx.today {
            theme::dim()
        } else {
            theme::amber()
        };
        vec![
            text(self.title.clone()),
            styled(self.event_date.to_string(), date_style),
            styled(or_dash(&self.location), theme::dim()),
        ]
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Event", self.title.clone()),
            field("Date", self.event_date.to_string()),
            field("Location", or_dash(&self.location)),
            Line::from(""),
            Line::from(Span::styled("  [e] edit", theme::dim())),
        ]
    }
}

impl Tabular for Newsletter {
    fn columns() -> &'static [(&'static str, u16)] {
        &[
            ("Title", 0),
            ("Status", 10),
            ("For", 11),
            ("Recipients", 10),
            ("Opened", 7),
            ("Clicked", 7),
        ]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        let when = match (self.sent_at, self.scheduled_for) {
            (Some(at), _) => at.date().to_string(),
            (None, Some(on)) => on.to_string(),
            (None, None) => "—".to_string(),
        };
        let sent = self.status == NewsletterStatus::Sent;
        let rate = |value: f64| {
            if sent {
                format_percent(value)
            } else {
                "—".to_string()
            }
        };
        vec![
            text(self.title.clone()),
            styled(self.status.label(), theme::newsletter(self.status)),
            styled(when, theme::dim()),
            text(self.recipients.to_string()),
            styled(rate(self.open_rate), theme::dim()),
            styled(rate(self.click_rate), theme::dim()),
        ]
    }

    fn facet_cycle() -> Vec<(NewsletterFacet, &'static str)> {
        NewsletterStatus::ALL
            .iter()
            .map(|s| (NewsletterFacet::Status(*s), s.label()))
            .collect()
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(""),
            field("Title", self.title.clone()),
            field("Status", self.status.label()),
            field(
                "Scheduled",
                self.scheduled_for.map(|d| d.to_string()).unwrap_or_else(|| "—".into()),
            ),
            field(
                "Sent",
                self.sent_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "—".into()),
            ),
            field("Recipients", self.recipients.to_string()),
            Line::from(""),
        ];
        lines.extend(
            self.body
                .lines()
                .map(|l| Line::from(Span::styled(format!("  {}", l), theme::bold()))),
        );
        lines
    }
}

impl Tabular for PrayerRequest {
    fn columns() -> &'static [(&'static str, u16)] {
        &[
            ("Request", 0),
            ("From", 18),
            ("Priority", 9),
            ("Status", 12),
            ("Comments", 9),
        ]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        let style = theme::prayer(self.status, self.priority);
        vec![
            styled(self.title.clone(), style),
            styled(self.display_requester().to_string(), theme::dim()),
            styled(self.priority.label(), style),
            text(self.status.label()),
            styled(self.comments.len().to_string(), theme::dim()),
        ]
    }

    fn facet_cycle() -> Vec<(PrayerFacet, &'static str)> {
        PrayerStatus::ALL
            .iter()
            .map(|s| (PrayerFacet::Status(*s), s.label()))
            .collect()
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(""),
            field("Request", self.title.clone()),
            field("From", self.display_requester().to_string()),
            field("Priority", self.priority.label()),
            field("Status", self.status.label()),
            field("Submitted", self.created_at.format("%Y-%m-%d").to_string()),
            Line::from(""),
            Line::from(Span::styled(format!("  {}", self.description), theme::bold())),
        ];
        if !self.updates.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("  Updates", theme::gold())));
            for update in &self.updates {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("    {}  ", update.created_at.format("%b %d")),
                        theme::dim(),
                    ),
                    Span::styled(update.body.clone(), theme::bold()),
                ]));
            }
        }
        if !self.comments.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("  Comments", theme::gold())));
            for comment in &self.comments {
                lines.push(Line::from(vec![
                    Span::styled(format!("    {}: ", comment.author), theme::amber()),
                    Span::styled(comment.body.clone(), theme::bold()),
                ]));
            }
        }
        lines
    }
}

impl Tabular for SchoolClass {
    fn columns() -> &'static [(&'static str, u16)] {
        &[
            ("Class", 0),
            ("Ages", 8),
            ("Teacher", 18),
            ("Room", 10),
            ("Students", 9),
            ("Attendance", 17),
        ]
    }

    fn cells(&self, _ctx: &Ctx) -> Vec<Cell<'static>> {
        let rate_style = match self.attendance_rate {
            80.. => theme::green(),
            50..=79 => theme::amber(),
            _ => theme::red(),
        };
        vec![
            styled(self.name.clone(), theme::bold()),
            text(self.age_group.clone()),
            text(or_dash(&self.teacher_name)),
            styled(self.room.clone(), theme::dim()),
            text(format!("{}/{}", self.student_count, self.capacity)),
            styled(
                format!(
                    "{} {:>4}",
                    progress_bar(self.attendance_rate, 100, 8),
                    format_percent(self.attendance_rate as f64)
                ),
                rate_style,
            ),
        ]
    }

    fn detail(&self, _ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Class", self.name.clone()),
            field("Age group", self.age_group.clone()),
            field("Teacher", or_dash(&self.teacher_name)),
            field("Room", self.room.clone()),
            field("Schedule", self.schedule.clone()),
            field("Students", format!("{} of {}", self.student_count, self.capacity)),
            field("Attendance", format_percent(self.attendance_rate as f64)),
        ]
    }
}

impl Tabular for Teacher {
    fn columns() -> &'static [(&'static str, u16)] {
        &[("Teacher", 20), ("Email", 26), ("Since", 11), ("Years", 6), ("Classes", 0)]
    }

    fn cells(&self, ctx: &Ctx) -> Vec<Cell<'static>> {
        vec![
            styled(self.name.clone(), theme::bold()),
            styled(self.email.clone(), theme::dim()),
            styled(self.started_on.to_string(), theme::dim()),
            text(self.years_of_service(ctx.today).to_string()),
            text(self.assigned_classes.join(", ")),
        ]
    }

    fn detail(&self, ctx: &Ctx) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            field("Teacher", self.name.clone()),
            field("Email", self.email.clone()),
            field("Started", self.started_on.to_string()),
            field("Years served", self.years_of_service(ctx.today).to_string()),
            field("Classes", self.assigned_classes.join(", ")),
        ]
    }
}
