use std::collections::HashSet;
use std::time::Instant;

use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::board::{Board, Filter, Mutation, Record};
use crate::config::AppConfig;
use crate::db::repository::{
    AttendanceRepo, BudgetRepo, ClassRepo, DepartmentMemberRepo, DepartmentRepo, DonationRepo,
    EventRepo, GroupRepo, MemberRepo, NewsletterRepo, PrayerRepo, RoleRepo, StatsRepo,
    TeacherRepo,
};
use crate::db::{fetch, RecordStore};
use crate::error::FlockError;
use crate::forms::{
    parse_date, BudgetForm, DonationForm, EventForm, MemberForm, NewsletterForm, PrayerForm,
    RoleForm,
};
use crate::models::attendance::AttendanceFacet;
use crate::models::department::{DepartmentMemberFacet, RoleFacet};
use crate::models::group::EventFacet;
use crate::models::{
    AttendanceRecord, AttendanceSummary, Budget, DailyAttendance, DashboardSummary, Department,
    DepartmentMember, DepartmentRole, Donation, EventEdit, FinanceReport, GivingSummary, Group,
    GroupEvent, Lifecycle, Member, Newsletter, PrayerRequest, SchoolClass, Teacher,
};
use crate::service::{Navigator, Notifier, Route, Toasts};
use crate::tui::events::{Event, EventHandler, Poller};
use crate::tui::pane::{Ctx, Pane, Tabular};
use crate::tui::theme;
use crate::tui::widgets::popup::{self, FormAction, FormKind, FormPopup};
use crate::tui::widgets::{header, panels, statusbar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App {
    conn: Connection,
    pub config: AppConfig,
    pub route: Route,
    pub toasts: Toasts,
    pub input_mode: InputMode,
    pub form: Option<FormPopup>,
    pub show_help: bool,
    pub should_quit: bool,
    today: NaiveDate,
    poller: Poller,
    seen_check_ins: HashSet<i64>,

    summary: DashboardSummary,
    week: Vec<DailyAttendance>,
    report: Option<FinanceReport>,

    members: Board<Member>,
    attendance: Board<AttendanceRecord>,
    donations: Board<Donation>,
    budgets: Board<Budget>,
    departments: Board<Department>,
    department_members: Board<DepartmentMember>,
    roles: Board<DepartmentRole>,
    groups: Board<Group>,
    events: Board<GroupEvent>,
    newsletters: Board<Newsletter>,
    prayers: Board<PrayerRequest>,
    classes: Board<SchoolClass>,
    teachers: Board<Teacher>,
}

impl App {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        let poller = Poller::new(config.dashboard.checkin_poll_secs);
        Self {
            conn,
            config,
            route: Route::Dashboard,
            toasts: Toasts::default(),
            input_mode: InputMode::Normal,
            form: None,
            show_help: false,
            should_quit: false,
            today: Local::now().date_naive(),
            poller,
            seen_check_ins: HashSet::new(),
            summary: DashboardSummary::default(),
            week: Vec::new(),
            report: None,
            members: Board::new(),
            attendance: Board::new(),
            donations: Board::new(),
            budgets: Board::new(),
            departments: Board::new(),
            department_members: Board::new(),
            roles: Board::new(),
            groups: Board::new(),
            events: Board::new(),
            newsletters: Board::new(),
            prayers: Board::new(),
            classes: Board::new(),
            teachers: Board::new(),
        }
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Switches screens and reloads what the new screen shows.
    pub fn go(&mut self, route: Route) {
        log::debug!("route {}", route.path());
        self.route = route;
        self.form = None;
        self.input_mode = InputMode::Normal;
        self.load_route();
    }

    fn load_route(&mut self) {
        match self.route {
            Route::Dashboard => self.load_dashboard(),
            Route::Members => {
                self.members
                    .load(fetch::<MemberRepo>(&self.conn, &Filter::new()), &mut self.toasts);
            }
            Route::MemberDetail(id) => {
                self.members
                    .load(fetch::<MemberRepo>(&self.conn, &Filter::new()), &mut self.toasts);
                open_detail(&mut self.members, id, &mut self.toasts);
            }
            Route::Attendance => {
                self.attendance.filter.clear_kind(&AttendanceFacet::Date(self.today));
                self.attendance.load(
                    fetch::<AttendanceRepo>(&self.conn, &Filter::new()),
                    &mut self.toasts,
                );
            }
            Route::CheckIn => {
                self.load_check_ins(false);
                self.poller.reset(Instant::now());
            }
            Route::Giving => {
                self.donations
                    .load(fetch::<DonationRepo>(&self.conn, &Filter::new()), &mut self.toasts);
            }
            Route::DonationAdd => {
                self.donations
                    .load(fetch::<DonationRepo>(&self.conn, &Filter::new()), &mut self.toasts);
                self.form = Some(FormPopup::new(FormKind::Donation));
            }
            Route::Reports => self.load_report(),
            Route::Budgets => {
                self.budgets
                    .load(fetch::<BudgetRepo>(&self.conn, &Filter::new()), &mut self.toasts);
            }
            Route::BudgetAdd => {
                self.budgets
                    .load(fetch::<BudgetRepo>(&self.conn, &Filter::new()), &mut self.toasts);
                self.form = Some(FormPopup::new(FormKind::Budget));
            }
            Route::Departments => {
                self.departments.load(
                    fetch::<DepartmentRepo>(&self.conn, &Filter::new()),
                    &mut self.toasts,
                );
            }
            Route::DepartmentMembers(id) => {
                self.departments.load(
                    fetch::<DepartmentRepo>(&self.conn, &Filter::new()),
                    &mut self.toasts,
                );
                let filter = Filter::new().with(DepartmentMemberFacet::Department(id));
                self.department_members.load(
                    fetch::<DepartmentMemberRepo>(&self.conn, &filter),
                    &mut self.toasts,
                );
            }
            Route::DepartmentRoles(id) => {
                self.departments.load(
                    fetch::<DepartmentRepo>(&self.conn, &Filter::new()),
                    &mut self.toasts,
                );
                let filter = Filter::new().with(RoleFacet::Department(id));
                self.roles
                    .load(fetch::<RoleRepo>(&self.conn, &filter), &mut self.toasts);
            }
            Route::Groups => {
                self.groups
                    .load(fetch::<GroupRepo>(&self.conn, &Filter::new()), &mut self.toasts);
            }
            Route::GroupEvents { group, edit } => {
                self.groups
                    .load(fetch::<GroupRepo>(&self.conn, &Filter::new()), &mut self.toasts);
                let filter = Filter::new().with(EventFacet::Group(group));
                self.events
                    .load(fetch::<EventRepo>(&self.conn, &filter), &mut self.toasts);
                if let Some(id) = edit {
                    self.open_event_edit(group, id);
                }
            }
            Route::Newsletters => {
                self.newsletters.load(
                    fetch::<NewsletterRepo>(&self.conn, &Filter::new()),
                    &mut self.toasts,
                );
            }
            Route::PrayerRequests => {
                self.prayers
                    .load(fetch::<PrayerRepo>(&self.conn, &Filter::new()), &mut self.toasts);
            }
            Route::PrayerDetail(id) => {
                self.prayers
                    .load(fetch::<PrayerRepo>(&self.conn, &Filter::new()), &mut self.toasts);
                open_detail(&mut self.prayers, id, &mut self.toasts);
            }
            Route::SundaySchool => {
                self.classes
                    .load(fetch::<ClassRepo>(&self.conn, &Filter::new()), &mut self.toasts);
            }
            Route::Teachers => {
                self.teachers
                    .load(fetch::<TeacherRepo>(&self.conn, &Filter::new()), &mut self.toasts);
            }
        }
    }

    fn load_dashboard(&mut self) {
        match StatsRepo::dashboard(&self.conn, self.today) {
            Ok(summary) => self.summary = summary,
            Err(err) => self.toasts.failure("load dashboard", &err),
        }
        match StatsRepo::daily_attendance(&self.conn, self.today - Duration::days(6), self.today) {
            Ok(week) => self.week = week,
            Err(err) => self.toasts.failure("load attendance trend", &err),
        }
    }

    /// Month to date.
    fn load_report(&mut self) {
        let from = self.today.with_day(1).unwrap_or(self.today);
        let built = DonationRepo::all(&self.conn).and_then(|donations| {
            let expenses = BudgetRepo::expenses_with_budget(&self.conn)?;
            Ok(FinanceReport::build(from, self.today, &donations, &expenses))
        });
        match built {
            Ok(report) => self.report = Some(report),
            Err(err) => {
                self.report = None;
                self.toasts.failure("build finance report", &err);
            }
        }
    }

    /// Pulls today's check-ins again. With `announce`, check-ins not seen on
    /// the previous load are counted in a toast.
    fn load_check_ins(&mut self, announce: bool) {
        self.attendance.filter.set(AttendanceFacet::Date(self.today));
        let filter = Filter::new().with(AttendanceFacet::Date(self.today));
        if !self.attendance.load(
            fetch::<AttendanceRepo>(&self.conn, &filter),
            &mut self.toasts,
        ) {
            return;
        }
        let ids: HashSet<i64> = self.attendance.items().iter().map(|r| r.id).collect();
        let arrived = ids.difference(&self.seen_check_ins).count();
        self.seen_check_ins = ids;
        if announce && arrived > 0 {
            let plural = if arrived == 1 { "" } else { "s" };
            self.toasts.info(&format!("{} new check-in{}", arrived, plural));
        }
    }

    fn open_event_edit(&mut self, group: i64, id: i64) {
        let Some(event) = self.events.items().iter().find(|e| e.id == id) else {
            self.toasts
                .failure("edit event", &FlockError::not_found("event", id).into());
            self.route = Route::GroupEvents { group, edit: None };
            return;
        };
        let date = event.event_date.to_string();
        let location = event.location.clone().unwrap_or_default();
        let form = FormPopup::new(FormKind::Event {
            group,
            edit: Some(id),
        })
        .with_values(&[&event.title, &date, &location]);
        self.events.focus_id(id);
        self.form = Some(form);
    }

    pub fn tick(&mut self) {
        let today = Local::now().date_naive();
        if today != self.today {
            log::info!("date rolled over to {}", today);
            self.today = today;
            match self.route {
                Route::Dashboard => self.load_dashboard(),
                Route::CheckIn => {
                    self.load_check_ins(false);
                    self.poller.reset(Instant::now());
                }
                _ => {}
            }
        }
        if self.route == Route::CheckIn && self.poller.due(Instant::now()) {
            self.load_check_ins(true);
        }
    }

    fn pane(&self) -> Option<&dyn Pane> {
        let pane: &dyn Pane = match self.route {
            Route::Dashboard | Route::Reports => return None,
            Route::Members | Route::MemberDetail(_) => &self.members,
            Route::Attendance | Route::CheckIn => &self.attendance,
            Route::Giving | Route::DonationAdd => &self.donations,
            Route::Budgets | Route::BudgetAdd => &self.budgets,
            Route::Departments => &self.departments,
            Route::DepartmentMembers(_) => &self.department_members,
            Route::DepartmentRoles(_) => &self.roles,
            Route::Groups => &self.groups,
            Route::GroupEvents { .. } => &self.events,
            Route::Newsletters => &self.newsletters,
            Route::PrayerRequests | Route::PrayerDetail(_) => &self.prayers,
            Route::SundaySchool => &self.classes,
            Route::Teachers => &self.teachers,
        };
        Some(pane)
    }

    fn pane_mut(&mut self) -> Option<&mut dyn Pane> {
        let pane: &mut dyn Pane = match self.route {
            Route::Dashboard | Route::Reports => return None,
            Route::Members | Route::MemberDetail(_) => &mut self.members,
            Route::Attendance | Route::CheckIn => &mut self.attendance,
            Route::Giving | Route::DonationAdd => &mut self.donations,
            Route::Budgets | Route::BudgetAdd => &mut self.budgets,
            Route::Departments => &mut self.departments,
            Route::DepartmentMembers(_) => &mut self.department_members,
            Route::DepartmentRoles(_) => &mut self.roles,
            Route::Groups => &mut self.groups,
            Route::GroupEvents { .. } => &mut self.events,
            Route::Newsletters => &mut self.newsletters,
            Route::PrayerRequests | Route::PrayerDetail(_) => &mut self.prayers,
            Route::SundaySchool => &mut self.classes,
            Route::Teachers => &mut self.teachers,
        };
        Some(pane)
    }

    // ── Keys ──

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormAction::Editing => {}
                FormAction::Cancel => self.close_form(),
                FormAction::Submit => self.submit_form(),
            }
            return;
        }
        if self.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }
        if self.pane().is_some_and(|p| p.detail_open()) {
            self.handle_detail_key(key);
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.back(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char(c @ '0'..='9') => {
                let index = c as usize - '0' as usize;
                let (route, _) = Route::tabs()[index];
                self.go(route);
            }
            KeyCode::Char('g') => self.load_route(),
            KeyCode::Char('+') => self.open_add(),
            KeyCode::Char('n') => self.advance_selected(),
            KeyCode::Char('x') => self.remove_selected(),
            KeyCode::Char('R') if self.route == Route::Giving => self.go(Route::Reports),
            KeyCode::Char('c') if self.route == Route::Attendance => self.go(Route::CheckIn),
            KeyCode::Char('t') if self.route == Route::SundaySchool => self.go(Route::Teachers),
            KeyCode::Char('m') if self.route == Route::Departments => {
                if let Some(id) = self.departments.focused().map(|d| d.id) {
                    self.go(Route::DepartmentMembers(id));
                }
            }
            KeyCode::Char('r') if self.route == Route::Departments => {
                if let Some(id) = self.departments.focused().map(|d| d.id) {
                    self.go(Route::DepartmentRoles(id));
                }
            }
            KeyCode::Char('v') if self.route == Route::Groups => {
                if let Some(group) = self.groups.focused().map(|g| g.id) {
                    self.go(Route::GroupEvents { group, edit: None });
                }
            }
            KeyCode::Char('e') => {
                if let Route::GroupEvents { group, .. } = self.route {
                    if let Some(id) = self.events.focused().map(|e| e.id) {
                        self.route = Route::GroupEvents {
                            group,
                            edit: Some(id),
                        };
                        self.open_event_edit(group, id);
                    }
                }
            }
            _ => self.handle_pane_key(key),
        }
    }

    fn handle_pane_key(&mut self, key: KeyEvent) {
        let Some(pane) = self.pane_mut() else {
            return;
        };
        let message = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                pane.move_focus(-1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                pane.move_focus(1);
                None
            }
            KeyCode::PageUp => {
                pane.move_focus(-10);
                None
            }
            KeyCode::PageDown => {
                pane.move_focus(10);
                None
            }
            KeyCode::Char(' ') => {
                pane.toggle_focused();
                None
            }
            KeyCode::Char('a') => {
                pane.toggle_all();
                None
            }
            KeyCode::Char('f') => pane.cycle_facet().map(|label| format!("Showing {}", label)),
            KeyCode::Char('o') => Some(pane.cycle_sort()),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                None
            }
            KeyCode::Enter => {
                pane.toggle_detail();
                self.sync_detail_route();
                None
            }
            _ => None,
        };
        if let Some(message) = message {
            self.toasts.info(&message);
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Some(pane) = self.pane_mut() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let mut term = pane.search_term().to_string();
        let done = match key.code {
            KeyCode::Esc => {
                term.clear();
                true
            }
            KeyCode::Enter => true,
            KeyCode::Backspace => {
                term.pop();
                false
            }
            KeyCode::Char(c) => {
                term.push(c);
                false
            }
            _ => false,
        };
        pane.set_search(term);
        if done {
            self.input_mode = InputMode::Normal;
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(pane) = self.pane_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => {
                pane.toggle_detail();
                self.sync_detail_route();
            }
            KeyCode::Up | KeyCode::Char('k') => pane.move_focus(-1),
            KeyCode::Down | KeyCode::Char('j') => pane.move_focus(1),
            _ => {}
        }
    }

    /// Keeps member and prayer routes in step with the detail overlay.
    fn sync_detail_route(&mut self) {
        self.route = match self.route {
            Route::Members | Route::MemberDetail(_) => match self.members.focused() {
                Some(m) if self.members.detail_open => Route::MemberDetail(m.id),
                _ => Route::Members,
            },
            Route::PrayerRequests | Route::PrayerDetail(_) => match self.prayers.focused() {
                Some(p) if self.prayers.detail_open => Route::PrayerDetail(p.id),
                _ => Route::PrayerRequests,
            },
            other => other,
        };
    }

    fn back(&mut self) {
        match parent(self.route) {
            Some(route) => self.go(route),
            None => self.should_quit = true,
        }
    }

    // ── Actions ──

    fn open_add(&mut self) {
        match self.route {
            Route::Members | Route::MemberDetail(_) => {
                self.form = Some(FormPopup::new(FormKind::Member));
            }
            Route::Giving => self.go(Route::DonationAdd),
            Route::Budgets => self.go(Route::BudgetAdd),
            Route::PrayerRequests | Route::PrayerDetail(_) => {
                self.form = Some(FormPopup::new(FormKind::Prayer));
            }
            Route::GroupEvents { group, .. } => {
                self.form = Some(FormPopup::new(FormKind::Event { group, edit: None }));
            }
            Route::DepartmentRoles(department) => {
                self.form = Some(FormPopup::new(FormKind::Role { department }));
            }
            Route::Newsletters => self.form = Some(FormPopup::new(FormKind::Newsletter)),
            _ => self.toasts.info("Nothing to add here"),
        }
    }

    fn close_form(&mut self) {
        self.form = None;
        self.route = match self.route {
            Route::BudgetAdd => Route::Budgets,
            Route::DonationAdd => Route::Giving,
            Route::GroupEvents { group, .. } => Route::GroupEvents { group, edit: None },
            other => other,
        };
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };
        let today = self.today;
        let now = self.now();
        let conn = &self.conn;
        let toasts = &mut self.toasts;

        let outcome: Result<bool, FlockError> = match form.kind {
            FormKind::Member => MemberForm {
                name: form.value("Name").into(),
                email: form.value("Email").into(),
                phone: form.value("Phone").into(),
                department: form.value("Department").into(),
                status: form.value("Status").into(),
            }
            .validate(today)
            .map(|draft| {
                let done = format!("Added {}", draft.name);
                insert::<MemberRepo>(conn, &mut self.members, toasts, Member::provisional(&draft), &draft, &done)
            }),
            FormKind::Donation => DonationForm {
                donor: form.value("Donor").into(),
                amount: form.value("Amount").into(),
                giving_type: form.value("Type").into(),
                category: form.value("Category").into(),
                method: form.value("Method").into(),
                member_id: None,
                note: form.value("Note").into(),
            }
            .validate(today, &self.config.finance.receipt_prefix)
            .map(|draft| {
                let done = format!("Recorded gift from {}", draft.donor_name);
                insert::<DonationRepo>(conn, &mut self.donations, toasts, Donation::provisional(&draft), &draft, &done)
            }),
            FormKind::Budget => BudgetForm {
                name: form.value("Name").into(),
                department: form.value("Department").into(),
                period: form.value("Period").into(),
                amount: form.value("Amount").into(),
            }
            .validate()
            .map(|draft| {
                let done = format!("Added budget {}", draft.name);
                insert::<BudgetRepo>(conn, &mut self.budgets, toasts, Budget::provisional(&draft), &draft, &done)
            }),
            FormKind::Prayer => PrayerForm {
                title: form.value("Title").into(),
                description: form.value("Description").into(),
                requester: form.value("Requester").into(),
                priority: form.value("Priority").into(),
                is_private: false,
            }
            .validate()
            .map(|draft| {
                let done = format!("Prayer request \"{}\" submitted", draft.title);
                insert::<PrayerRepo>(conn, &mut self.prayers, toasts, PrayerRequest::provisional(&draft, now), &draft, &done)
            }),
            FormKind::Event { group, edit: None } => EventForm {
                group_id: group,
                title: form.value("Title").into(),
                date: form.value("Date").into(),
                location: form.value("Location").into(),
            }
            .validate()
            .map(|draft| {
                let done = format!("Scheduled {}", draft.title);
                insert::<EventRepo>(conn, &mut self.events, toasts, GroupEvent::provisional(&draft), &draft, &done)
            }),
            FormKind::Role { department } => RoleForm {
                department_id: department,
                title: form.value("Title").into(),
                level: form.value("Level").into(),
                description: form.value("Description").into(),
                responsibilities: form.value("Responsibilities").into(),
            }
            .validate()
            .map(|draft| {
                let done = format!("Added role {}", draft.title);
                insert::<RoleRepo>(conn, &mut self.roles, toasts, DepartmentRole::provisional(&draft), &draft, &done)
            }),
            FormKind::Newsletter => NewsletterForm {
                title: form.value("Title").into(),
                body: form.value("Body").into(),
            }
            .validate()
            .map(|draft| {
                let done = format!("Drafted {}", draft.title);
                insert::<NewsletterRepo>(conn, &mut self.newsletters, toasts, Newsletter::provisional(&draft), &draft, &done)
            }),
            FormKind::Event { edit: Some(id), .. } => {
                event_edit(&form).and_then(|edit| {
                    let current = self
                        .events
                        .items()
                        .iter()
                        .find(|e| e.id == id)
                        .cloned()
                        .ok_or(FlockError::not_found("event", id))?;
                    Ok(self.events.commit(
                        Mutation::Replace(current.edited(&edit)),
                        || EventRepo::edit(conn, id, &edit).map(Some),
                        toasts,
                        "edit event",
                        "Event updated",
                    ))
                })
            }
        };

        match outcome {
            Ok(true) => self.close_form(),
            Ok(false) => {
                if let Some(open) = self.form.as_mut() {
                    open.error = self.toasts.latest().map(|n| n.message.clone());
                }
            }
            Err(err) => {
                let message = err.to_string();
                self.toasts.failure("save", &err.into());
                if let Some(open) = self.form.as_mut() {
                    open.error = Some(message);
                }
            }
        }
    }

    fn advance_selected(&mut self) {
        let now = self.now();
        let conn = &self.conn;
        let toasts = &mut self.toasts;
        match self.route {
            Route::Members | Route::MemberDetail(_) => {
                advance::<MemberRepo>(conn, &mut self.members, toasts, now)
            }
            Route::Attendance | Route::CheckIn => {
                advance::<AttendanceRepo>(conn, &mut self.attendance, toasts, now)
            }
            Route::Giving => advance::<DonationRepo>(conn, &mut self.donations, toasts, now),
            Route::Newsletters => {
                advance::<NewsletterRepo>(conn, &mut self.newsletters, toasts, now)
            }
            Route::PrayerRequests | Route::PrayerDetail(_) => {
                advance::<PrayerRepo>(conn, &mut self.prayers, toasts, now)
            }
            _ => toasts.info("Nothing here has a status to advance"),
        }
    }

    fn remove_selected(&mut self) {
        let conn = &self.conn;
        let toasts = &mut self.toasts;
        match self.route {
            Route::Dashboard | Route::Reports => toasts.info("Nothing to remove here"),
            Route::Members | Route::MemberDetail(_) => {
                remove::<MemberRepo>(conn, &mut self.members, toasts)
            }
            Route::Attendance | Route::CheckIn => {
                remove::<AttendanceRepo>(conn, &mut self.attendance, toasts)
            }
            Route::Giving | Route::DonationAdd => {
                remove::<DonationRepo>(conn, &mut self.donations, toasts)
            }
            Route::Budgets | Route::BudgetAdd => {
                remove::<BudgetRepo>(conn, &mut self.budgets, toasts)
            }
            Route::Departments => remove::<DepartmentRepo>(conn, &mut self.departments, toasts),
            Route::DepartmentMembers(_) => {
                remove::<DepartmentMemberRepo>(conn, &mut self.department_members, toasts)
            }
            Route::DepartmentRoles(_) => remove::<RoleRepo>(conn, &mut self.roles, toasts),
            Route::Groups => remove::<GroupRepo>(conn, &mut self.groups, toasts),
            Route::GroupEvents { .. } => remove::<EventRepo>(conn, &mut self.events, toasts),
            Route::Newsletters => {
                remove::<NewsletterRepo>(conn, &mut self.newsletters, toasts)
            }
            Route::PrayerRequests | Route::PrayerDetail(_) => {
                remove::<PrayerRepo>(conn, &mut self.prayers, toasts)
            }
            Route::SundaySchool => remove::<ClassRepo>(conn, &mut self.classes, toasts),
            Route::Teachers => remove::<TeacherRepo>(conn, &mut self.teachers, toasts),
        }
    }

    // ── Drawing ──

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        header::render(frame, chunks[0], &self.config.church.name, self.today, &self.route);

        let ctx = Ctx {
            symbol: &self.config.church.currency_symbol,
            today: self.today,
        };
        match self.route {
            Route::Dashboard => {
                panels::dashboard(frame, chunks[1], &self.summary, &self.week, ctx.symbol)
            }
            Route::Reports => {
                if let Some(report) = &self.report {
                    panels::report(frame, chunks[1], report, ctx.symbol);
                }
            }
            _ => self.draw_pane(frame, chunks[1], &ctx),
        }

        statusbar::render(frame, chunks[2], &self.hints(), self.toasts.latest());

        if let Some(pane) = self.pane() {
            if pane.detail_open() {
                pane.render_detail(frame, chunks[1], &ctx);
            }
        }
        if let Some(form) = &self.form {
            form.render(frame, area);
        }
        if self.show_help {
            popup::help(frame, area);
        }
    }

    fn draw_pane(&self, frame: &mut Frame, area: Rect, ctx: &Ctx) {
        let Some(pane) = self.pane() else {
            return;
        };
        let summary = match self.route {
            Route::Giving | Route::DonationAdd => {
                let summary = GivingSummary::from_donations(&self.donations.visible());
                Some(panels::giving_line(&summary, ctx.symbol))
            }
            Route::Attendance | Route::CheckIn => {
                let summary = AttendanceSummary::from_records(&self.attendance.visible());
                Some(panels::attendance_line(&summary))
            }
            _ => None,
        };
        let area = match summary {
            Some(line) => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Min(0)])
                    .split(area);
                frame.render_widget(Paragraph::new(line).style(theme::base()), rows[0]);
                rows[1]
            }
            None => area,
        };

        let mut title = self.title();
        if self.input_mode == InputMode::Search {
            title = format!("{}  / {}█", title, pane.search_term());
        }
        pane.render(frame, area, &title, ctx);
    }

    fn title(&self) -> String {
        match self.route {
            Route::Dashboard | Route::Reports => String::new(),
            Route::Members | Route::MemberDetail(_) => "Members".into(),
            Route::Attendance => "Attendance".into(),
            Route::CheckIn => format!(
                "Check-ins {}  ·  refreshing every {}s",
                self.today.format("%a %b %d"),
                self.config.dashboard.checkin_poll_secs
            ),
            Route::Giving | Route::DonationAdd => "Giving".into(),
            Route::Budgets | Route::BudgetAdd => "Budgets".into(),
            Route::Departments => "Departments".into(),
            Route::DepartmentMembers(id) => format!("{}  ·  members", self.department_name(id)),
            Route::DepartmentRoles(id) => format!("{}  ·  roles", self.department_name(id)),
            Route::Groups => "Groups".into(),
            Route::GroupEvents { group, .. } => format!("{}  ·  events", self.group_name(group)),
            Route::Newsletters => "Newsletters".into(),
            Route::PrayerRequests | Route::PrayerDetail(_) => "Prayer Requests".into(),
            Route::SundaySchool => "Sunday School Classes".into(),
            Route::Teachers => "Teachers".into(),
        }
    }

    fn department_name(&self, id: i64) -> String {
        self.departments
            .items()
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("Department #{}", id))
    }

    fn group_name(&self, id: i64) -> String {
        self.groups
            .items()
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| format!("Group #{}", id))
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.form.is_some() {
            return vec![("Tab", "next field"), ("Enter", "save"), ("Esc", "cancel")];
        }
        if self.input_mode == InputMode::Search {
            return vec![("Enter", "keep"), ("Esc", "clear")];
        }
        let mut hints = match self.route {
            Route::Dashboard => vec![("1-9", "sections")],
            Route::Reports => vec![("g", "refresh")],
            _ => vec![("/", "search"), ("f", "filter"), ("o", "sort"), ("Enter", "details")],
        };
        match self.route {
            Route::Members | Route::PrayerRequests | Route::GroupEvents { .. } => {
                hints.push(("+", "add"));
                hints.push(("n", "status"));
            }
            Route::Giving => {
                hints.push(("+", "record"));
                hints.push(("R", "report"));
            }
            Route::Budgets | Route::DepartmentRoles(_) => hints.push(("+", "add")),
            Route::Attendance => hints.push(("c", "live feed")),
            Route::Departments => {
                hints.push(("m", "members"));
                hints.push(("r", "roles"));
            }
            Route::Groups => hints.push(("v", "events")),
            Route::SundaySchool => hints.push(("t", "teachers")),
            Route::Newsletters => {
                hints.push(("+", "draft"));
                hints.push(("n", "advance"));
            }
            _ => {}
        }
        hints.push(("?", "help"));
        hints.push(("Esc", if self.route == Route::Dashboard { "quit" } else { "back" }));
        hints
    }
}

impl Navigator for App {
    fn navigate(&mut self, path: &str) -> Result<()> {
        let route = Route::parse(path)?;
        self.go(route);
        Ok(())
    }
}

/// Where Esc leads from each screen; `None` quits.
fn parent(route: Route) -> Option<Route> {
    match route {
        Route::Dashboard => None,
        Route::MemberDetail(_) => Some(Route::Members),
        Route::CheckIn => Some(Route::Attendance),
        Route::DepartmentMembers(_) | Route::DepartmentRoles(_) => Some(Route::Departments),
        Route::GroupEvents { .. } => Some(Route::Groups),
        Route::BudgetAdd => Some(Route::Budgets),
        Route::DonationAdd | Route::Reports => Some(Route::Giving),
        Route::PrayerDetail(_) => Some(Route::PrayerRequests),
        Route::Teachers => Some(Route::SundaySchool),
        _ => Some(Route::Dashboard),
    }
}

fn open_detail<T: Tabular>(board: &mut Board<T>, id: i64, toasts: &mut Toasts) {
    board.filter = Filter::default();
    if board.focus_id(id) {
        board.detail_open = true;
    } else {
        toasts.failure("open record", &FlockError::not_found(T::ENTITY, id).into());
    }
}

/// The selection, or the focused row when nothing is selected.
fn targets<T: Tabular>(board: &Board<T>) -> Vec<i64> {
    if board.selection.is_empty() {
        board.focused().map(|r| vec![r.id()]).unwrap_or_default()
    } else {
        board.selection.ids()
    }
}

fn insert<S>(
    conn: &Connection,
    board: &mut Board<S::Record>,
    toasts: &mut Toasts,
    optimistic: S::Record,
    draft: &S::Draft,
    done: &str,
) -> bool
where
    S: RecordStore,
    S::Record: Tabular,
{
    let action = format!("add {}", S::Record::ENTITY);
    let ok = board.commit(
        Mutation::Insert(optimistic),
        || S::create(conn, draft).map(Some),
        toasts,
        &action,
        done,
    );
    if ok {
        if let Some(id) = board.items().last().map(|r| r.id()) {
            board.focus_id(id);
        }
    }
    ok
}

fn advance<S>(conn: &Connection, board: &mut Board<S::Record>, toasts: &mut Toasts, now: NaiveDateTime)
where
    S: RecordStore,
    S::Record: Tabular + Lifecycle,
{
    let ids = targets(board);
    if ids.is_empty() {
        toasts.info("Nothing selected");
        return;
    }
    for id in ids {
        let Some(current) = board.items().iter().find(|r| r.id() == id).cloned() else {
            continue;
        };
        let next = match current.advanced(now) {
            Ok(next) => next,
            Err(err) => {
                toasts.failure("change status", &err.into());
                continue;
            }
        };
        let done = format!("{} #{} is now {}", S::Record::ENTITY, id, next.status());
        let stored = next.clone();
        board.commit(
            Mutation::Replace(next),
            || S::update(conn, &stored).map(Some),
            toasts,
            "change status",
            &done,
        );
    }
    board.selection.clear();
}

fn remove<S>(conn: &Connection, board: &mut Board<S::Record>, toasts: &mut Toasts)
where
    S: RecordStore,
    S::Record: Tabular,
{
    let ids = targets(board);
    if ids.is_empty() {
        toasts.info("Nothing selected");
        return;
    }
    let action = format!("remove {}", S::Record::ENTITY);
    for id in ids {
        let done = format!("Removed {} #{}", S::Record::ENTITY, id);
        board.commit(
            Mutation::Remove(id),
            || S::remove(conn, id).map(|_| None),
            toasts,
            &action,
            &done,
        );
    }
}

/// Blank fields leave the stored value alone.
fn event_edit(form: &FormPopup) -> Result<EventEdit, FlockError> {
    let text = |label: &str| {
        let value = form.value(label).trim();
        (!value.is_empty()).then(|| value.to_string())
    };
    let event_date = match text("Date") {
        Some(date) => Some(parse_date("date", &date)?),
        None => None,
    };
    Ok(EventEdit {
        title: text("Title"),
        event_date,
        location: text("Location"),
    })
}

pub fn run(conn: Connection, config: AppConfig, start: Option<&str>) -> Result<()> {
    let tick_rate = config.dashboard.tick_rate_ms;
    let mut app = App::new(conn, config);
    match start {
        Some(path) => app.navigate(path)?,
        None => app.go(Route::Dashboard),
    }

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    let outcome = loop {
        if let Err(err) = terminal.draw(|frame| app.draw(frame)) {
            break Err(err.into());
        }
        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key);
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Tick) => app.tick(),
            Ok(Event::Resize) => {}
            Err(err) => break Err(err.into()),
        }
    };

    ratatui::restore();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fixtures, open_in_memory};
    use crate::models::{
        AttendanceStatus, BudgetStatus, MemberStatus, NewAttendance, NewMember, NewsletterStatus,
        PrayerStatus, RoleLevel, ServiceType,
    };
    use crate::service::NoticeKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn check_in_newcomer(app: &App, name: &str) -> AttendanceRecord {
        let member = MemberRepo::create(
            &app.conn,
            &NewMember {
                name: name.into(),
                email: format!("{}@example.org", name.to_lowercase()),
                phone: None,
                department: None,
                status: MemberStatus::Visitor,
                joined_on: app.today,
            },
        )
        .unwrap();
        AttendanceRepo::create(
            &app.conn,
            &NewAttendance {
                member_id: member.id,
                service_type: ServiceType::Special,
                service_date: app.today,
                status: AttendanceStatus::Present,
                checked_in_at: app.today.and_hms_opt(9, 30, 0).unwrap(),
            },
        )
        .unwrap()
    }

    fn seeded() -> App {
        let conn = open_in_memory();
        let mut config = AppConfig::default();
        config.finance.receipt_prefix = "DON".into();
        let today = Local::now().date_naive();
        fixtures::seed(&conn, today, "DON").unwrap();
        App::new(conn, config)
    }

    #[test]
    fn navigate_loads_the_section() {
        let mut app = seeded();
        app.navigate("/dashboard/finance/budgets").unwrap();
        assert_eq!(app.route, Route::Budgets);
        assert_eq!(app.budgets.items().len(), 4);

        // on track, then warning
        app.handle_key(key(KeyCode::Char('f')));
        app.handle_key(key(KeyCode::Char('f')));
        let visible = app.budgets.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].status(), BudgetStatus::Warning);
    }

    #[test]
    fn unknown_path_is_rejected() {
        let mut app = seeded();
        assert!(app.navigate("/dashboard/nowhere").is_err());
        assert_eq!(app.route, Route::Dashboard);
    }

    #[test]
    fn invalid_donation_leaves_giving_unchanged() {
        let mut app = seeded();
        app.navigate("/dashboard/finance/giving/add").unwrap();
        let before = app.donations.items().len();
        assert!(app.form.is_some());

        type_text(&mut app, "Ruth");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "0");
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Enter));
        }

        assert_eq!(app.donations.items().len(), before);
        let notice = app.toasts.latest().unwrap();
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert!(notice.message.contains("amount"));
        assert!(app.form.as_ref().unwrap().error.is_some());
    }

    #[test]
    fn valid_donation_is_stored_with_receipt() {
        let mut app = seeded();
        app.navigate("/dashboard/finance/giving/add").unwrap();
        let before = app.donations.items().len();

        type_text(&mut app, "Ruth");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "25");
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Enter));
        }

        assert!(app.form.is_none());
        assert_eq!(app.route, Route::Giving);
        assert_eq!(app.donations.items().len(), before + 1);
        let gift = app.donations.focused().unwrap();
        assert!(gift.id > 0);
        assert!(gift.receipt_number.starts_with("DON-"));
        assert_eq!(DonationRepo::all(&app.conn).unwrap().len(), before + 1);
    }

    #[test]
    fn advancing_a_prayer_persists_the_status() {
        let mut app = seeded();
        app.navigate("/dashboard/prayer-requests").unwrap();
        let id = app
            .prayers
            .items()
            .iter()
            .find(|p| p.status == PrayerStatus::New)
            .map(|p| p.id)
            .unwrap();
        assert!(app.prayers.focus_id(id));

        app.handle_key(key(KeyCode::Char('n')));

        assert_eq!(PrayerRepo::get(&app.conn, id).unwrap().status, PrayerStatus::InProgress);
        assert_eq!(app.toasts.latest().unwrap().kind, NoticeKind::Success);
    }

    #[test]
    fn removing_selected_members() {
        let mut app = seeded();
        app.go(Route::Members);
        let before = app.members.items().len();
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.members.items().len(), before - 1);
        assert_eq!(MemberRepo::all(&app.conn).unwrap().len(), before - 1);
    }

    #[test]
    fn detail_route_opens_the_overlay() {
        let mut app = seeded();
        app.go(Route::Members);
        let id = app.members.items()[1].id;
        app.navigate(&Route::MemberDetail(id).path()).unwrap();
        assert!(app.members.detail_open);
        assert_eq!(app.members.focused().map(|m| m.id), Some(id));

        app.handle_key(key(KeyCode::Esc));
        assert!(!app.members.detail_open);
        assert_eq!(app.route, Route::Members);
    }

    #[test]
    fn escape_walks_back_then_quits() {
        let mut app = seeded();
        app.navigate("/dashboard/sunday-school/teachers").unwrap();
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.route, Route::SundaySchool);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.route, Route::Dashboard);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn search_narrows_and_escape_clears() {
        let mut app = seeded();
        app.go(Route::Members);
        let total = app.members.visible().len();
        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "zzzz-nobody");
        assert!(app.members.visible().is_empty());
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.members.visible().len(), total);
    }

    #[test]
    fn editing_an_event_keeps_blank_fields() {
        let mut app = seeded();
        let event = EventRepo::all(&app.conn).unwrap()[0].clone();
        let group = event.group_id;
        app.go(Route::GroupEvents { group, edit: None });
        assert!(app.events.items().iter().any(|e| e.id == event.id));
        app.navigate(&Route::GroupEvents { group, edit: Some(event.id) }.path())
            .unwrap();
        assert!(app.form.is_some());

        // title only; date and location keep their values
        for _ in 0..event.title.chars().count() {
            app.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut app, "Renamed");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));

        let stored = EventRepo::get(&app.conn, event.id).unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.event_date, event.event_date);
        assert_eq!(app.route, Route::GroupEvents { group, edit: None });
    }

    #[test]
    fn live_feed_announces_only_new_check_ins() {
        let mut app = seeded();
        app.go(Route::CheckIn);
        let opened_with = app.attendance.items().len();
        assert!(app
            .toasts
            .iter()
            .all(|n| !n.message.contains("new check-in")));

        let record = check_in_newcomer(&app, "Lydia");
        app.load_check_ins(true);

        assert_eq!(app.attendance.items().len(), opened_with + 1);
        assert!(app.attendance.visible().iter().any(|r| r.id == record.id));
        let announced: Vec<_> = app
            .toasts
            .iter()
            .filter(|n| n.message.contains("new check-in"))
            .collect();
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0].message, "1 new check-in");

        // nothing new on the next poll
        app.load_check_ins(true);
        assert_eq!(
            app.toasts
                .iter()
                .filter(|n| n.message.contains("new check-in"))
                .count(),
            1
        );
    }

    #[test]
    fn live_feed_follows_the_date_rollover() {
        let mut app = seeded();
        let today = app.today;
        app.today = today - Duration::days(1);
        app.go(Route::CheckIn);
        app.today = today;
        let record = check_in_newcomer(&app, "Priscilla");

        app.today = today - Duration::days(1);
        app.tick();

        assert_eq!(app.today, Local::now().date_naive());
        let visible = app.attendance.visible();
        assert!(visible.iter().any(|r| r.id == record.id));
        assert!(visible.iter().all(|r| r.service_date == app.today));
        assert_eq!(
            visible.len(),
            AttendanceRepo::on_date(&app.conn, app.today).unwrap().len()
        );
    }

    #[test]
    fn role_is_added_from_the_roles_screen() {
        let mut app = seeded();
        let department = DepartmentRepo::all(&app.conn).unwrap()[0].id;
        app.go(Route::DepartmentRoles(department));
        let before = app.roles.items().len();

        app.handle_key(key(KeyCode::Char('+')));
        assert!(app.form.is_some());
        type_text(&mut app, "Worship Leader");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "leader");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "Leads worship");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "Plan setlist\\nRehearse band");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.form.is_none());
        assert_eq!(app.roles.items().len(), before + 1);
        let stored: Vec<_> = RoleRepo::all(&app.conn)
            .unwrap()
            .into_iter()
            .filter(|r| r.department_id == department && r.title == "Worship Leader")
            .collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].level, RoleLevel::Leader);
        assert_eq!(stored[0].responsibilities, vec!["Plan setlist", "Rehearse band"]);
        assert_eq!(app.roles.focused().map(|r| r.id), Some(stored[0].id));
    }

    #[test]
    fn newsletter_is_drafted_from_the_list() {
        let mut app = seeded();
        app.go(Route::Newsletters);
        let before = app.newsletters.items().len();

        app.handle_key(key(KeyCode::Char('+')));
        type_text(&mut app, "Harvest Supper");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "Bring a dish to share.");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.form.is_none());
        assert_eq!(app.newsletters.items().len(), before + 1);
        let drafted = app.newsletters.focused().unwrap();
        assert_eq!(drafted.title, "Harvest Supper");
        assert_eq!(drafted.status, NewsletterStatus::Draft);
        assert_eq!(NewsletterRepo::all(&app.conn).unwrap().len(), before + 1);
    }
}
