use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate};
use rusqlite::Connection;

use crate::board::Filter;
use crate::cli::args::{
    AttendanceCommands, BudgetCommands, DepartmentCommands, GivingCommands, GroupCommands,
    MemberCommands, NewsletterCommands, PrayerCommands, SchoolCommands,
};
use crate::cli::output::{
    attempt, heading, print_json, println_colored, unwrap_envelope, ConsoleNotifier, AMBER, BOLD,
    DIM, GREEN, RED,
};
use crate::config::AppConfig;
use crate::db::fixtures;
use crate::db::repository::meta::SETUP_DONE;
use crate::db::repository::{
    AttendanceRepo, BudgetRepo, ClassRepo, DepartmentMemberRepo, DepartmentRepo, DonationRepo,
    EventRepo, GroupRepo, MemberRepo, MetaRepo, NewsletterRepo, PrayerRepo, RoleRepo, StatsRepo,
    StudentRepo, TeacherRepo,
};
use crate::db::{fetch, RecordStore};
use crate::forms::{
    BudgetForm, DonationForm, EventForm, ExpenseForm, MemberForm, NewsletterForm, PrayerForm,
    RoleForm,
};
use crate::models::attendance::AttendanceFacet;
use crate::models::finance::{BudgetFacet, DonationFacet};
use crate::models::member::MemberFacet;
use crate::models::newsletter::NewsletterFacet;
use crate::models::prayer::PrayerFacet;
use crate::models::{
    AttendanceStatus, AttendanceSummary, BudgetStatus, Donation, DonationStatus, EventEdit,
    FinanceReport, GivingSummary, Lifecycle, MemberStatus, NewAssignment, NewAttendance,
    NewDepartment, NewsletterStatus,
};
use crate::service::Notifier;
use crate::utils::format::{format_money, format_percent, format_time, progress_bar, truncate};

// ─── Setup & seed ────────────────────────────────────────────────────────────

pub fn handle_setup(conn: &Connection, config: &mut AppConfig, reset: bool) -> Result<()> {
    if !reset && MetaRepo::get(conn, SETUP_DONE)?.as_deref() == Some("1") {
        println!("flock is already configured. Use --reset to reconfigure.");
        return Ok(());
    }
    crate::cli::setup_tui::run_setup_tui(conn, config)
}

pub fn handle_seed(conn: &Connection, config: &AppConfig, force: bool) -> Result<()> {
    let has_members = MemberRepo::count(conn)? > 0;
    if (fixtures::is_seeded(conn)? || has_members) && !force {
        println_colored!(
            AMBER,
            "  Records already exist. Use --force to replace them with demo data."
        );
        return Ok(());
    }
    if force {
        fixtures::clear(conn)?;
    }
    let today = Local::now().date_naive();
    let report = fixtures::seed(conn, today, &config.finance.receipt_prefix)?;
    ConsoleNotifier.success(&format!(
        "Loaded {} members, {} check-ins, {} donations, {} budgets, {} prayer requests",
        report.members, report.check_ins, report.donations, report.budgets, report.prayers
    ));
    Ok(())
}

// ─── Members ─────────────────────────────────────────────────────────────────

pub fn handle_members(conn: &Connection, action: MemberCommands) -> Result<()> {
    let mut out = ConsoleNotifier;
    match action {
        MemberCommands::List {
            search,
            status,
            department,
            json,
        } => {
            let filter = Filter::new()
                .search(search.unwrap_or_default())
                .with_opt(status.map(MemberFacet::Status))
                .with_opt(department.map(MemberFacet::Department));
            let envelope = fetch::<MemberRepo>(conn, &filter);
            if json {
                return print_json(&envelope);
            }
            let members = unwrap_envelope(envelope)?;
            heading(&format!("Members ({})", members.len()));
            for m in &members {
                let color = match m.status {
                    MemberStatus::Active => BOLD,
                    MemberStatus::Visitor => AMBER,
                    MemberStatus::Inactive => DIM,
                };
                println_colored!(
                    color,
                    "  #{:<4} {:<22} {:<28} {:<12} {}",
                    m.id,
                    truncate(&m.name, 22),
                    truncate(&m.email, 28),
                    m.department.as_deref().unwrap_or("—"),
                    m.status
                );
            }
            println!();
        }
        MemberCommands::Add {
            name,
            email,
            phone,
            department,
            status,
        } => {
            let form = MemberForm {
                name,
                email,
                phone: phone.unwrap_or_default(),
                department: department.unwrap_or_default(),
                status: status.unwrap_or_default(),
            };
            let draft = attempt("add member", form.validate(today()).map_err(Into::into))?;
            let member = attempt("add member", MemberRepo::create(conn, &draft))?;
            out.success(&format!("Added {} (#{})", member.name, member.id));
        }
        MemberCommands::Status { id, status } => {
            let member = attempt("update member", MemberRepo::get(conn, id))?;
            let next = attempt(
                "update member",
                member.transitioned(status, now()).map_err(Into::into),
            )?;
            let saved = attempt("update member", MemberRepo::update(conn, &next))?;
            out.success(&format!("{} is now {}", saved.name, saved.status));
        }
        MemberCommands::Remove { id } => {
            attempt("remove member", MemberRepo::remove(conn, id))?;
            out.success(&format!("Removed member #{}", id));
        }
    }
    Ok(())
}

// ─── Attendance ──────────────────────────────────────────────────────────────

pub fn handle_attendance(
    conn: &Connection,
    config: &AppConfig,
    action: AttendanceCommands,
) -> Result<()> {
    match action {
        AttendanceCommands::CheckIn {
            member_id,
            service,
            status,
            date,
        } => {
            let draft = NewAttendance {
                member_id,
                service_type: service.unwrap_or(config.church.default_service),
                service_date: date.unwrap_or_else(today),
                status,
                checked_in_at: now(),
            };
            let record = attempt("check in", AttendanceRepo::create(conn, &draft))?;
            ConsoleNotifier.success(&format!(
                "{} checked in to {} ({})",
                record.member_name, record.service_type, record.status
            ));
        }
        AttendanceCommands::List {
            date,
            service,
            status,
        } => {
            let filter = Filter::new()
                .with_opt(date.map(AttendanceFacet::Date))
                .with_opt(service.map(AttendanceFacet::Service))
                .with_opt(status.map(AttendanceFacet::Status));
            let records = unwrap_envelope(fetch::<AttendanceRepo>(conn, &filter))?;
            heading(&format!("Check-ins ({})", records.len()));
            for r in &records {
                let color = if r.status.attended() { GREEN } else { DIM };
                println_colored!(
                    color,
                    "  {}  {}  {:<16} {:<22} {}",
                    r.service_date,
                    format_time(r.checked_in_at),
                    r.service_type,
                    truncate(&r.member_name, 22),
                    r.status
                );
            }
            println!();
        }
        AttendanceCommands::Summary { date } => {
            let date = date.unwrap_or_else(today);
            let records = attempt("load attendance", AttendanceRepo::on_date(conn, date))?;
            let shown: Vec<_> = records.iter().collect();
            let summary = AttendanceSummary::from_records(&shown);
            heading(&format!("Attendance — {}", date));
            for status in AttendanceStatus::ALL {
                println!("  {:<10} {}", status.label(), summary.count(*status));
            }
            println!();
            println_colored!(
                BOLD,
                "  Rate: {}  ({} of {})",
                format_percent(summary.rate() as f64),
                summary.attended(),
                summary.total
            );
            println!();
        }
    }
    Ok(())
}

// ─── Giving ──────────────────────────────────────────────────────────────────

pub fn handle_giving(conn: &Connection, config: &AppConfig, action: GivingCommands) -> Result<()> {
    let symbol = config.church.currency_symbol.as_str();
    match action {
        GivingCommands::Add {
            donor,
            amount,
            giving_type,
            category,
            method,
            member,
            note,
        } => {
            let form = DonationForm {
                donor,
                amount,
                giving_type: giving_type.unwrap_or_default(),
                category: category.unwrap_or_default(),
                method: method.unwrap_or_default(),
                member_id: member,
                note: note.unwrap_or_default(),
            };
            let draft = attempt(
                "record donation",
                form.validate(today(), &config.finance.receipt_prefix)
                    .map_err(Into::into),
            )?;
            let gift = attempt("record donation", DonationRepo::create(conn, &draft))?;
            ConsoleNotifier.success(&format!(
                "Recorded {} from {} — receipt {}",
                format_money(symbol, gift.amount),
                gift.donor_name,
                gift.receipt_number
            ));
        }
        GivingCommands::List {
            search,
            category,
            method,
            status,
            json,
        } => {
            let filter = Filter::new()
                .search(search.unwrap_or_default())
                .with_opt(category.map(DonationFacet::Category))
                .with_opt(method.map(DonationFacet::Method))
                .with_opt(status.map(DonationFacet::Status));
            let envelope = fetch::<DonationRepo>(conn, &filter);
            if json {
                return print_json(&envelope);
            }
            let gifts = unwrap_envelope(envelope)?;
            heading(&format!("Donations ({})", gifts.len()));
            for g in &gifts {
                print_donation(symbol, g);
            }
            println!();
        }
        GivingCommands::Status { id, status } => {
            let gift = attempt("update donation", DonationRepo::get(conn, id))?;
            let next = attempt(
                "update donation",
                gift.transitioned(status, now()).map_err(Into::into),
            )?;
            let saved = attempt("update donation", DonationRepo::update(conn, &next))?;
            ConsoleNotifier.success(&format!("{} is now {}", saved.receipt_number, saved.status));
        }
        GivingCommands::Summary { giving_type } => {
            let filter = Filter::new().with_opt(giving_type.map(DonationFacet::Type));
            let gifts = unwrap_envelope(fetch::<DonationRepo>(conn, &filter))?;
            let shown: Vec<&Donation> = gifts.iter().collect();
            let summary = GivingSummary::from_donations(&shown);

            heading("Giving summary");
            for c in &summary.by_category {
                println!(
                    "  {:<18} {:>14}  ({} gifts)",
                    c.category.label(),
                    format_money(symbol, c.total),
                    c.count
                );
            }
            println!();
            println_colored!(
                BOLD,
                "  Total:            {} from {} gifts",
                format_money(symbol, summary.total),
                summary.count
            );
            println!(
                "  Most used:        {}",
                summary.most_used().map(|c| c.label()).unwrap_or("—")
            );
            println!(
                "  Avg per category: {}",
                format_money(symbol, summary.average_per_category())
            );
            println!();
        }
    }
    Ok(())
}

fn print_donation(symbol: &str, g: &Donation) {
    let color = match g.status {
        DonationStatus::Completed => GREEN,
        DonationStatus::Pending => AMBER,
        DonationStatus::Failed => RED,
        DonationStatus::Refunded => DIM,
    };
    println_colored!(
        color,
        "  #{:<4} {}  {}  {:<20} {:>12}  {:<14} {:<13} {}",
        g.id,
        g.receipt_number,
        g.given_on,
        truncate(&g.donor_name, 20),
        format_money(symbol, g.amount),
        g.category.label(),
        g.method.label(),
        g.status
    );
}

// ─── Budgets ─────────────────────────────────────────────────────────────────

pub fn handle_budgets(conn: &Connection, config: &AppConfig, action: BudgetCommands) -> Result<()> {
    let symbol = config.church.currency_symbol.as_str();
    match action {
        BudgetCommands::List {
            search,
            status,
            json,
        } => {
            let filter = Filter::new()
                .search(search.unwrap_or_default())
                .with_opt(status.map(BudgetFacet::Status));
            let envelope = fetch::<BudgetRepo>(conn, &filter);
            if json {
                return print_json(&envelope);
            }
            let budgets = unwrap_envelope(envelope)?;
            heading(&format!("Budgets ({})", budgets.len()));
            for b in &budgets {
                let pct = b.utilization();
                let color = match b.status() {
                    BudgetStatus::OnTrack => GREEN,
                    BudgetStatus::Warning => AMBER,
                    BudgetStatus::Exceeded => RED,
                };
                print!("  #{:<4} {:<22} {:<12} ", b.id, truncate(&b.name, 22), b.period);
                println_colored!(
                    color,
                    "{} {:>3}%  {} / {}  {}",
                    progress_bar(pct.min(100), 100, 20),
                    pct,
                    format_money(symbol, b.spent),
                    format_money(symbol, b.amount),
                    b.status()
                );
            }
            println!();
        }
        BudgetCommands::Add {
            name,
            amount,
            department,
            period,
        } => {
            let form = BudgetForm {
                name,
                department: department.unwrap_or_default(),
                period: period.unwrap_or_default(),
                amount,
            };
            let draft = attempt("add budget", form.validate().map_err(Into::into))?;
            let budget = attempt("add budget", BudgetRepo::create(conn, &draft))?;
            ConsoleNotifier.success(&format!(
                "Created {} with {} ({})",
                budget.name,
                format_money(symbol, budget.amount),
                budget.period
            ));
        }
        BudgetCommands::Spend {
            budget_id,
            amount,
            description,
            date,
        } => {
            let form = ExpenseForm {
                budget_id,
                amount,
                description,
                date: date.map(|d| d.to_string()).unwrap_or_default(),
            };
            let draft = attempt("record expense", form.validate(today()).map_err(Into::into))?;
            let (expense, budget) =
                attempt("record expense", BudgetRepo::record_expense(conn, &draft))?;
            ConsoleNotifier.success(&format!(
                "Spent {} from {} — {}% used",
                format_money(symbol, expense.amount),
                budget.name,
                budget.utilization()
            ));
            match budget.status() {
                BudgetStatus::Exceeded => {
                    ConsoleNotifier.notify(
                        crate::service::NoticeKind::Warning,
                        &format!("{} is over budget", budget.name),
                    );
                }
                BudgetStatus::Warning => {
                    ConsoleNotifier.info(&format!(
                        "{} has {} left",
                        budget.name,
                        format_money(symbol, budget.remaining())
                    ));
                }
                BudgetStatus::OnTrack => {}
            }
        }
    }
    Ok(())
}

// ─── Finance report ──────────────────────────────────────────────────────────

pub fn handle_report(
    conn: &Connection,
    config: &AppConfig,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let symbol = config.church.currency_symbol.as_str();
    let to = to.unwrap_or_else(today);
    let from = from.unwrap_or_else(|| to.with_day(1).unwrap_or(to));
    let donations = attempt("build report", DonationRepo::all(conn))?;
    let expenses = attempt("build report", BudgetRepo::expenses_with_budget(conn))?;
    let report = FinanceReport::build(from, to, &donations, &expenses);

    heading(&format!("Income vs expense — {} to {}", report.from, report.to));
    println_colored!(BOLD, "  Income");
    for (category, total) in &report.income_by_category {
        println!("    {:<18} {:>14}", category.label(), format_money(symbol, *total));
    }
    println!("    {:<18} {:>14}", "Total", format_money(symbol, report.income));
    println!();
    println_colored!(BOLD, "  Expenses");
    for (budget, total) in &report.expenses_by_budget {
        println!("    {:<18} {:>14}", truncate(budget, 18), format_money(symbol, *total));
    }
    println!("    {:<18} {:>14}", "Total", format_money(symbol, report.expenses));
    println!();
    let net = report.net();
    let color = if net < 0.0 { RED } else { GREEN };
    println_colored!(color, "  Net: {}", format_money(symbol, net));
    println!();
    Ok(())
}

// ─── Departments ─────────────────────────────────────────────────────────────

pub fn handle_departments(conn: &Connection, action: DepartmentCommands) -> Result<()> {
    match action {
        DepartmentCommands::List => {
            let departments = attempt("load departments", DepartmentRepo::all(conn))?;
            heading(&format!("Departments ({})", departments.len()));
            for d in &departments {
                println!(
                    "  #{:<4} {:<20} {:>3} members  {:>2} roles  {}",
                    d.id,
                    truncate(&d.name, 20),
                    d.member_count,
                    d.role_count,
                    d.description
                );
            }
            println!();
        }
        DepartmentCommands::Add { name, description } => {
            let department = attempt(
                "add department",
                DepartmentRepo::create(
                    conn,
                    &NewDepartment {
                        name: name.trim().to_string(),
                        description: description.trim().to_string(),
                    },
                ),
            )?;
            ConsoleNotifier.success(&format!("Added {} (#{})", department.name, department.id));
        }
        DepartmentCommands::Roles { department_id } => {
            let department = attempt("load roles", DepartmentRepo::get(conn, department_id))?;
            let roles = attempt("load roles", RoleRepo::for_department(conn, department_id))?;
            heading(&format!("{} roles", department.name));
            for r in &roles {
                println_colored!(BOLD, "  #{:<4} {} ({})", r.id, r.title, r.level);
                if !r.description.is_empty() {
                    println_colored!(DIM, "        {}", r.description);
                }
                for item in &r.responsibilities {
                    println!("        • {}", item);
                }
            }
            println!();
        }
        DepartmentCommands::AddRole {
            department_id,
            title,
            level,
            description,
            responsibilities,
        } => {
            let form = RoleForm {
                department_id,
                title,
                level,
                description,
                responsibilities,
            };
            let draft = attempt("add role", form.validate().map_err(Into::into))?;
            let role = attempt("add role", RoleRepo::create(conn, &draft))?;
            ConsoleNotifier.success(&format!(
                "Added role {} with {} responsibilities",
                role.title,
                role.responsibilities.len()
            ));
        }
        DepartmentCommands::Assign {
            department_id,
            member_id,
            role,
        } => {
            let assignment = attempt(
                "assign member",
                DepartmentMemberRepo::create(
                    conn,
                    &NewAssignment {
                        department_id,
                        member_id,
                        role_id: role,
                    },
                ),
            )?;
            ConsoleNotifier.success(&format!(
                "{} assigned{}",
                assignment.member_name,
                assignment
                    .role_title
                    .as_deref()
                    .map(|t| format!(" as {}", t))
                    .unwrap_or_default()
            ));
        }
        DepartmentCommands::Members { department_id } => {
            let department = attempt("load members", DepartmentRepo::get(conn, department_id))?;
            let people = attempt(
                "load members",
                DepartmentMemberRepo::for_department(conn, department_id),
            )?;
            heading(&format!("{} members ({})", department.name, people.len()));
            for p in &people {
                println!(
                    "  #{:<4} {:<22} {}",
                    p.member_id,
                    truncate(&p.member_name, 22),
                    p.role_title.as_deref().unwrap_or("—")
                );
            }
            println!();
        }
    }
    Ok(())
}

// ─── Groups ──────────────────────────────────────────────────────────────────

pub fn handle_groups(conn: &Connection, action: GroupCommands) -> Result<()> {
    match action {
        GroupCommands::List => {
            let groups = attempt("load groups", GroupRepo::all(conn))?;
            heading(&format!("Groups ({})", groups.len()));
            for g in &groups {
                let color = if g.is_full() { AMBER } else { BOLD };
                println_colored!(
                    color,
                    "  #{:<4} {:<22} {:<12} {:<18} {:>7}  {}",
                    g.id,
                    truncate(&g.name, 22),
                    g.category.label(),
                    truncate(&g.leader, 18),
                    g.capacity_label(),
                    g.schedule
                );
            }
            println!();
        }
        GroupCommands::Join {
            group_id,
            member_id,
        } => {
            let group = attempt("join group", GroupRepo::join(conn, group_id, member_id))?;
            ConsoleNotifier.success(&format!(
                "Joined {} ({})",
                group.name,
                group.capacity_label()
            ));
        }
        GroupCommands::Leave {
            group_id,
            member_id,
        } => {
            let group = attempt("leave group", GroupRepo::leave(conn, group_id, member_id))?;
            ConsoleNotifier.success(&format!("Left {}", group.name));
        }
        GroupCommands::Events { group_id } => {
            let group = attempt("load events", GroupRepo::get(conn, group_id))?;
            let events = attempt("load events", EventRepo::for_group(conn, group_id))?;
            heading(&format!("{} events", group.name));
            let today = today();
            for e in &events {
                let color = if e.event_date < today { DIM } else { BOLD };
                println_colored!(
                    color,
                    "  #{:<4} {}  {:<28} {}",
                    e.id,
                    e.event_date,
                    truncate(&e.title, 28),
                    e.location.as_deref().unwrap_or("")
                );
            }
            println!();
        }
        GroupCommands::AddEvent {
            group_id,
            title,
            date,
            location,
        } => {
            let form = EventForm {
                group_id,
                title,
                date,
                location: location.unwrap_or_default(),
            };
            let draft = attempt("add event", form.validate().map_err(Into::into))?;
            let event = attempt("add event", EventRepo::create(conn, &draft))?;
            ConsoleNotifier.success(&format!("Added {} on {}", event.title, event.event_date));
        }
        GroupCommands::EditEvent {
            event_id,
            title,
            date,
            location,
        } => {
            let edit = EventEdit {
                title,
                event_date: date,
                location,
            };
            let event = attempt("edit event", EventRepo::edit(conn, event_id, &edit))?;
            ConsoleNotifier.success(&format!("Updated {} ({})", event.title, event.event_date));
        }
    }
    Ok(())
}

// ─── Newsletters ─────────────────────────────────────────────────────────────

pub fn handle_newsletters(conn: &Connection, action: NewsletterCommands) -> Result<()> {
    match action {
        NewsletterCommands::List { status } => {
            let filter = Filter::new().with_opt(status.map(NewsletterFacet::Status));
            let letters = unwrap_envelope(fetch::<NewsletterRepo>(conn, &filter))?;
            heading(&format!("Newsletters ({})", letters.len()));
            for n in &letters {
                let (color, when) = match n.status {
                    NewsletterStatus::Draft => (DIM, String::new()),
                    NewsletterStatus::Scheduled => (
                        AMBER,
                        n.scheduled_for.map(|d| d.to_string()).unwrap_or_default(),
                    ),
                    NewsletterStatus::Sent => (
                        GREEN,
                        format!(
                            "{} recipients, {} opened",
                            n.recipients,
                            format_percent(n.open_rate)
                        ),
                    ),
                };
                println_colored!(
                    color,
                    "  #{:<4} {:<30} {:<10} {}",
                    n.id,
                    truncate(&n.title, 30),
                    n.status,
                    when
                );
            }
            println!();
        }
        NewsletterCommands::Draft { title, body } => {
            let form = NewsletterForm { title, body };
            let draft = attempt("draft newsletter", form.validate().map_err(Into::into))?;
            let letter = attempt("draft newsletter", NewsletterRepo::create(conn, &draft))?;
            ConsoleNotifier.success(&format!("Drafted {} (#{})", letter.title, letter.id));
        }
        NewsletterCommands::Schedule { id, date } => {
            let letter = attempt("schedule newsletter", NewsletterRepo::get(conn, id))?;
            let next = attempt(
                "schedule newsletter",
                letter.scheduled(date, now()).map_err(Into::into),
            )?;
            let saved = attempt("schedule newsletter", NewsletterRepo::update(conn, &next))?;
            ConsoleNotifier.success(&format!(
                "{} scheduled for {}",
                saved.title,
                saved.scheduled_for.map(|d| d.to_string()).unwrap_or_default()
            ));
        }
        NewsletterCommands::Unschedule { id } => {
            let letter = attempt("unschedule newsletter", NewsletterRepo::get(conn, id))?;
            let next = attempt(
                "unschedule newsletter",
                letter
                    .transitioned(NewsletterStatus::Draft, now())
                    .map_err(Into::into),
            )?;
            let saved = attempt("unschedule newsletter", NewsletterRepo::update(conn, &next))?;
            ConsoleNotifier.success(&format!("{} is a draft again", saved.title));
        }
        NewsletterCommands::Send { id } => {
            let letter = attempt("send newsletter", NewsletterRepo::get(conn, id))?;
            let next = attempt("send newsletter", letter.sent(0, now()).map_err(Into::into))?;
            let saved = attempt("send newsletter", NewsletterRepo::update(conn, &next))?;
            ConsoleNotifier.success(&format!(
                "{} marked sent to {} members",
                saved.title, saved.recipients
            ));
        }
    }
    Ok(())
}

// ─── Prayer ──────────────────────────────────────────────────────────────────

pub fn handle_prayer(conn: &Connection, action: PrayerCommands) -> Result<()> {
    match action {
        PrayerCommands::List { status, priority } => {
            let filter = Filter::new()
                .with_opt(status.map(PrayerFacet::Status))
                .with_opt(priority.map(PrayerFacet::Priority));
            let requests = unwrap_envelope(fetch::<PrayerRepo>(conn, &filter))?;
            heading(&format!("Prayer requests ({})", requests.len()));
            for r in &requests {
                let color = if r.is_open() { BOLD } else { DIM };
                println_colored!(
                    color,
                    "  #{:<4} {:<28} {:<18} {:<8} {:<12} {} comments",
                    r.id,
                    truncate(&r.title, 28),
                    truncate(r.display_requester(), 18),
                    r.priority,
                    r.status,
                    r.comments.len()
                );
                if let Some(update) = r.updates.last() {
                    println_colored!(DIM, "        latest: {}", update.body);
                }
            }
            println!();
        }
        PrayerCommands::Add {
            title,
            description,
            requester,
            priority,
            private,
        } => {
            let form = PrayerForm {
                title,
                description,
                requester: requester.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
                is_private: private,
            };
            let draft = attempt("add prayer request", form.validate().map_err(Into::into))?;
            let request = attempt("add prayer request", PrayerRepo::create(conn, &draft))?;
            ConsoleNotifier.success(&format!("Added {} (#{})", request.title, request.id));
        }
        PrayerCommands::Status { id, status } => {
            let request = attempt("update prayer request", PrayerRepo::get(conn, id))?;
            let next = attempt(
                "update prayer request",
                request.transitioned(status, now()).map_err(Into::into),
            )?;
            let saved = attempt("update prayer request", PrayerRepo::update(conn, &next))?;
            ConsoleNotifier.success(&format!("{} is now {}", saved.title, saved.status));
        }
        PrayerCommands::Comment { id, author, body } => {
            attempt(
                "add comment",
                PrayerRepo::add_comment(conn, id, &author, &body, now()),
            )?;
            ConsoleNotifier.success("Comment added");
        }
        PrayerCommands::Update { id, body } => {
            attempt("post update", PrayerRepo::add_update(conn, id, &body, now()))?;
            ConsoleNotifier.success("Update posted");
        }
    }
    Ok(())
}

// ─── Sunday School ───────────────────────────────────────────────────────────

pub fn handle_sunday_school(conn: &Connection, action: SchoolCommands) -> Result<()> {
    match action {
        SchoolCommands::Classes => {
            let classes = attempt("load classes", ClassRepo::all(conn))?;
            heading(&format!("Classes ({})", classes.len()));
            for c in &classes {
                println!(
                    "  #{:<4} {:<18} {:<6} {:<8} {:>2}/{:<3} {:<16} {}",
                    c.id,
                    truncate(&c.name, 18),
                    c.age_group,
                    c.room,
                    c.student_count,
                    c.capacity,
                    c.teacher_name.as_deref().unwrap_or("unassigned"),
                    format_percent(c.attendance_rate as f64)
                );
                for s in attempt("load students", StudentRepo::in_class(conn, c.id))? {
                    println_colored!(DIM, "        #{:<4} {}", s.id, s.name);
                }
            }
            println!();
        }
        SchoolCommands::Teachers => {
            let teachers = attempt("load teachers", TeacherRepo::all(conn))?;
            let today = today();
            heading(&format!("Teachers ({})", teachers.len()));
            for t in &teachers {
                println!(
                    "  #{:<4} {:<20} {:>2} yrs  {}",
                    t.id,
                    truncate(&t.name, 20),
                    t.years_of_service(today),
                    t.assigned_classes.join(", ")
                );
            }
            println!();
        }
        SchoolCommands::Mark {
            class_id,
            student_id,
            absent,
            date,
        } => {
            let date = date.unwrap_or_else(today);
            attempt(
                "mark attendance",
                ClassRepo::mark(conn, class_id, student_id, date, !absent),
            )?;
            let class = attempt("mark attendance", ClassRepo::get(conn, class_id))?;
            ConsoleNotifier.success(&format!(
                "Marked {} on {} — {} now at {}",
                if absent { "absent" } else { "present" },
                date,
                class.name,
                format_percent(class.attendance_rate as f64)
            ));
        }
    }
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, config: &AppConfig) -> Result<()> {
    let symbol = config.church.currency_symbol.as_str();
    let s = StatsRepo::dashboard(conn, today())?;

    heading(&format!("{} — at a glance", config.church.name));
    println_colored!(
        BOLD,
        "  Members:      {} total  |  {} active  |  {} visitors",
        s.members_total,
        s.members_active,
        s.visitors
    );
    println!("  Attendance:   {} check-ins in the last 7 days", s.attendance_this_week);
    println!("  Giving (MTD): {}", format_money(symbol, s.giving_this_month));
    if s.budgets_exceeded > 0 {
        println_colored!(RED, "  Budgets:      {} over budget", s.budgets_exceeded);
    }
    if s.budgets_warning > 0 {
        println_colored!(AMBER, "  Budgets:      {} near their limit", s.budgets_warning);
    }
    if s.budgets_exceeded == 0 && s.budgets_warning == 0 {
        println_colored!(GREEN, "  Budgets:      all on track ✓");
    }
    println!("  Prayer:       {} open requests", s.open_prayers);
    println!("  Newsletters:  {} scheduled", s.newsletters_scheduled);
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection, config: &AppConfig) -> Result<()> {
    let symbol = config.church.currency_symbol.as_str();
    let today = today();
    let week_start = today - Duration::days(6);
    let summary = StatsRepo::dashboard(conn, today)?;
    let daily = StatsRepo::daily_attendance(conn, week_start, today)?;
    let donations = DonationRepo::all(conn)?;
    let expenses = BudgetRepo::expenses_with_budget(conn)?;
    let report = FinanceReport::build(week_start, today, &donations, &expenses);

    println!("# {} — Weekly Summary", config.church.name);
    println!("# {} to {}", week_start, today);
    println!();
    println!("## Attendance");
    if daily.is_empty() {
        println!("  No services recorded");
    }
    for day in &daily {
        let bar = progress_bar(day.attended, day.total, 10);
        println!("  {}  {:>3}/{:<3}  {}", day.date, day.attended, day.total, bar);
    }
    println!();
    println!("## Finance");
    println!("  Income:   {}", format_money(symbol, report.income));
    println!("  Expenses: {}", format_money(symbol, report.expenses));
    println!("  Net:      {}", format_money(symbol, report.net()));
    println!();
    println!("## Congregation");
    println!(
        "  Members:  {} ({} active, {} visitors)",
        summary.members_total, summary.members_active, summary.visitors
    );
    println!("  Prayer:   {} open requests", summary.open_prayers);
    println!(
        "  Budgets:  {} over, {} near limit",
        summary.budgets_exceeded, summary.budgets_warning
    );
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn now() -> chrono::NaiveDateTime {
    Local::now().naive_local()
}
