//! Demo data for a fresh install, written through the record stores so every
//! seeded row passes the same checks as one entered by hand.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use crate::db::repository::meta::SEEDED_ON;
use crate::db::repository::{
    AttendanceRepo, BudgetRepo, ClassRepo, DepartmentMemberRepo, DepartmentRepo, DonationRepo,
    EventRepo, GroupRepo, MemberRepo, MetaRepo, NewsletterRepo, PrayerRepo, RoleRepo, StudentRepo,
    TeacherRepo,
};
use crate::db::store::RecordStore;
use crate::models::{
    AttendanceStatus, BudgetPeriod, DonationStatus, GivingCategory, GivingType, GroupCategory,
    Lifecycle, MemberStatus, NewAssignment, NewAttendance, NewBudget, NewClass, NewDepartment,
    NewDonation, NewExpense, NewGroup, NewGroupEvent, NewMember, NewNewsletter, NewPrayerRequest,
    NewRole, NewStudent, NewTeacher, PaymentMethod, PrayerStatus, Priority, RoleLevel,
    ServiceType,
};

/// Tables in delete order, children first.
const TABLES: &[&str] = &[
    "class_attendance",
    "school_students",
    "school_classes",
    "school_teachers",
    "prayer_updates",
    "prayer_comments",
    "prayer_requests",
    "newsletters",
    "donations",
    "expenses",
    "budgets",
    "group_events",
    "group_members",
    "church_groups",
    "department_members",
    "department_roles",
    "departments",
    "attendance",
    "members",
];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeedReport {
    pub members: usize,
    pub check_ins: usize,
    pub donations: usize,
    pub budgets: usize,
    pub prayers: usize,
}

pub fn is_seeded(conn: &Connection) -> Result<bool> {
    MetaRepo::is_set(conn, SEEDED_ON)
}

/// Removes every church record. Settings and setup state are kept.
pub fn clear(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for table in TABLES {
        tx.execute(&format!("DELETE FROM {}", table), [])
            .with_context(|| format!("Clearing {}", table))?;
    }
    tx.execute("DELETE FROM app_meta WHERE key = ?1", [SEEDED_ON])?;
    tx.commit()?;
    Ok(())
}

/// Loads the demo congregation, with dates laid out around `today`.
pub fn seed(conn: &Connection, today: NaiveDate, receipt_prefix: &str) -> Result<SeedReport> {
    let tx = conn.unchecked_transaction()?;
    let mut report = SeedReport::default();
    let at = |date: NaiveDate, h: u32, m: u32| -> NaiveDateTime {
        date.and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN))
    };

    // ── Members ──
    let people = [
        ("John Smith", "john.smith@example.org", Some("555-0101"), Some("Worship"), MemberStatus::Active, 1400),
        ("Sarah Johnson", "sarah.j@example.org", Some("555-0102"), Some("Children"), MemberStatus::Active, 1100),
        ("Michael Brown", "m.brown@example.org", None, Some("Outreach"), MemberStatus::Active, 900),
        ("Emily Davis", "emily.davis@example.org", Some("555-0104"), Some("Worship"), MemberStatus::Active, 600),
        ("David Wilson", "d.wilson@example.org", Some("555-0105"), None, MemberStatus::Inactive, 2000),
        ("Grace Lee", "grace.lee@example.org", None, Some("Children"), MemberStatus::Active, 300),
        ("Daniel Martinez", "daniel.m@example.org", Some("555-0107"), Some("Outreach"), MemberStatus::Active, 250),
        ("Hannah Clark", "hannah.c@example.org", None, None, MemberStatus::Visitor, 14),
        ("Samuel Lewis", "sam.lewis@example.org", Some("555-0109"), None, MemberStatus::Visitor, 7),
    ];
    let mut members = Vec::new();
    for (name, email, phone, department, status, days_ago) in people {
        let member = MemberRepo::create(
            &tx,
            &NewMember {
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.map(str::to_string),
                department: department.map(str::to_string),
                status,
                joined_on: today - Duration::days(days_ago),
            },
        )?;
        members.push(member);
    }
    report.members = members.len();

    // ── Attendance: the last three Sundays ──
    let statuses = [
        AttendanceStatus::Present,
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Present,
        AttendanceStatus::Excused,
        AttendanceStatus::Partial,
        AttendanceStatus::Present,
    ];
    for week in 0..3i64 {
        let sunday = today - Duration::days(7 * week + today_offset_to_sunday(today));
        for (i, member) in members.iter().enumerate() {
            let status = statuses[(i + week as usize) % statuses.len()];
            AttendanceRepo::create(
                &tx,
                &NewAttendance {
                    member_id: member.id,
                    service_type: ServiceType::SundayMorning,
                    service_date: sunday,
                    status,
                    checked_in_at: at(sunday, 9, 40 + (i as u32 % 15)),
                },
            )?;
            report.check_ins += 1;
        }
    }

    // ── Departments and roles ──
    let departments = [
        ("Worship", "Music and the Sunday service"),
        ("Children", "Nursery through grade five"),
        ("Outreach", "Community meals and visits"),
    ];
    for (name, description) in departments {
        let department = DepartmentRepo::create(
            &tx,
            &NewDepartment {
                name: name.to_string(),
                description: description.to_string(),
            },
        )?;
        let head = RoleRepo::create(
            &tx,
            &NewRole {
                department_id: department.id,
                title: format!("{} Director", name),
                level: RoleLevel::Head,
                description: format!("Oversees the {} department", name.to_lowercase()),
                responsibilities: vec!["Plan the quarter".into(), "Support volunteers".into()],
            },
        )?;
        RoleRepo::create(
            &tx,
            &NewRole {
                department_id: department.id,
                title: format!("{} Volunteer", name),
                level: RoleLevel::Member,
                description: String::new(),
                responsibilities: vec!["Serve on rota".into()],
            },
        )?;
        let mut in_department = members
            .iter()
            .filter(|m| m.department.as_deref() == Some(name));
        if let Some(first) = in_department.next() {
            DepartmentMemberRepo::create(
                &tx,
                &NewAssignment {
                    department_id: department.id,
                    member_id: first.id,
                    role_id: Some(head.id),
                },
            )?;
        }
        for member in in_department {
            DepartmentMemberRepo::create(
                &tx,
                &NewAssignment {
                    department_id: department.id,
                    member_id: member.id,
                    role_id: None,
                },
            )?;
        }
    }

    // ── Groups and events ──
    let groups = [
        ("Tuesday Fellowship", GroupCategory::SmallGroup, "Emily Davis", Some(12), "Tuesdays 7pm"),
        ("Youth Night", GroupCategory::Youth, "Daniel Martinez", Some(30), "Fridays 6pm"),
        ("Romans Study", GroupCategory::Study, "John Smith", Some(4), "Wednesdays 7pm"),
        ("Food Pantry Team", GroupCategory::Outreach, "Michael Brown", None, "Saturdays 9am"),
    ];
    for (i, (name, category, leader, max_members, schedule)) in groups.into_iter().enumerate() {
        let group = GroupRepo::create(
            &tx,
            &NewGroup {
                name: name.to_string(),
                category,
                leader: leader.to_string(),
                max_members,
                schedule: schedule.to_string(),
            },
        )?;
        for member in members.iter().skip(i).step_by(2).take(4) {
            GroupRepo::join(&tx, group.id, member.id)?;
        }
        EventRepo::create(
            &tx,
            &NewGroupEvent {
                group_id: group.id,
                title: format!("{} gathering", name),
                event_date: today + Duration::days(3 + i as i64 * 4),
                location: Some("Fellowship Hall".to_string()),
            },
        )?;
    }

    // ── Budgets and expenses ──
    let budgets = [
        ("Worship Ministry", "Worship", BudgetPeriod::Annual, 15000.0, 12500.0),
        ("Children's Ministry", "Children", BudgetPeriod::Annual, 8000.0, 3200.0),
        ("Facilities", "General", BudgetPeriod::Quarterly, 5000.0, 5400.0),
        ("Outreach Meals", "Outreach", BudgetPeriod::Monthly, 1200.0, 450.0),
    ];
    for (name, department, period, amount, spent) in budgets {
        let budget = BudgetRepo::create(
            &tx,
            &NewBudget {
                name: name.to_string(),
                department: department.to_string(),
                period,
                amount,
            },
        )?;
        BudgetRepo::record_expense(
            &tx,
            &NewExpense {
                budget_id: budget.id,
                amount: spent,
                description: format!("{} spending to date", name),
                spent_on: today - Duration::days(10),
            },
        )?;
        report.budgets += 1;
    }

    // ── Giving ──
    let gifts = [
        ("John Smith", Some(0usize), 250.0, GivingType::Tithe, GivingCategory::General, PaymentMethod::BankTransfer, DonationStatus::Completed, 2),
        ("Sarah Johnson", Some(1), 100.0, GivingType::Offering, GivingCategory::General, PaymentMethod::Card, DonationStatus::Completed, 2),
        ("Anonymous", None, 40.0, GivingType::Offering, GivingCategory::General, PaymentMethod::Cash, DonationStatus::Completed, 9),
        ("Michael Brown", Some(2), 500.0, GivingType::Pledge, GivingCategory::Building, PaymentMethod::Check, DonationStatus::Pending, 5),
        ("Emily Davis", Some(3), 75.0, GivingType::Offering, GivingCategory::Missions, PaymentMethod::Mobile, DonationStatus::Completed, 16),
        ("Grace Lee", Some(5), 60.0, GivingType::Special, GivingCategory::Youth, PaymentMethod::Card, DonationStatus::Failed, 1),
        ("David Wilson", Some(4), 1000.0, GivingType::Special, GivingCategory::Building, PaymentMethod::BankTransfer, DonationStatus::Completed, 30),
    ];
    let base = today.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    for (i, (donor, member, amount, giving_type, category, method, status, days_ago)) in
        gifts.into_iter().enumerate()
    {
        DonationRepo::create_at(
            &tx,
            &NewDonation {
                donor_name: donor.to_string(),
                member_id: member.and_then(|idx| members.get(idx)).map(|m| m.id),
                amount,
                giving_type,
                category,
                method,
                status,
                given_on: today - Duration::days(days_ago),
                note: None,
                receipt_prefix: receipt_prefix.to_string(),
            },
            base + i as i64 * 1_001,
        )?;
        report.donations += 1;
    }

    // ── Newsletters ──
    let now = at(today, 8, 0);
    let sent = NewsletterRepo::create(
        &tx,
        &NewNewsletter {
            title: "Welcome Back Sunday".into(),
            body: "Join us for a picnic after the morning service.".into(),
        },
    )?;
    NewsletterRepo::update(&tx, &sent.sent(0, now)?)?;
    let upcoming = NewsletterRepo::create(
        &tx,
        &NewNewsletter {
            title: "Harvest Festival".into(),
            body: "Bring canned goods for the food pantry.".into(),
        },
    )?;
    NewsletterRepo::update(&tx, &upcoming.advanced(now)?)?;
    NewsletterRepo::create(
        &tx,
        &NewNewsletter {
            title: "Advent Schedule".into(),
            body: "Services, rehearsals and the children's pageant.".into(),
        },
    )?;

    // ── Prayer requests ──
    let requests = [
        ("Healing for my mother", "Recovering from surgery", "Sarah Johnson", Priority::High, false, PrayerStatus::InProgress),
        ("Job search", "Interviews this month", "Daniel Martinez", Priority::Normal, true, PrayerStatus::New),
        ("Safe travels", "Mission team to Guatemala", "Outreach", Priority::Normal, false, PrayerStatus::Answered),
        ("Family reconciliation", "", "Anonymous", Priority::Urgent, true, PrayerStatus::New),
    ];
    for (i, (title, description, requester, priority, is_private, status)) in
        requests.into_iter().enumerate()
    {
        let created = at(today - Duration::days(12 - i as i64 * 3), 10, 0);
        let request = PrayerRepo::create_at(
            &tx,
            &NewPrayerRequest {
                title: title.to_string(),
                description: description.to_string(),
                requester: requester.to_string(),
                priority,
                is_private,
            },
            created,
        )?;
        if status != PrayerStatus::New {
            PrayerRepo::update(&tx, &request.transitioned(status, created)?)?;
        }
        if i == 0 {
            PrayerRepo::add_comment(&tx, request.id, "Grace Lee", "Praying for a quick recovery", created + Duration::hours(2))?;
            PrayerRepo::add_update(&tx, request.id, "Home from hospital", created + Duration::days(3))?;
        }
        report.prayers += 1;
    }

    // ── Sunday School ──
    let teachers = [
        ("Martha Lee", "martha.lee@example.org", 2900),
        ("Peter Evans", "peter.evans@example.org", 800),
    ];
    let classes = [
        ("Little Lambs", "3-5", "Room A1", 10, &["Ava", "Leo", "Mila"][..]),
        ("Explorers", "6-9", "Room B2", 15, &["Noah", "Zoe", "Eli", "Ruth"][..]),
    ];
    for ((name, email, days), (class, ages, room, capacity, kids)) in teachers.into_iter().zip(classes) {
        let teacher = TeacherRepo::create(
            &tx,
            &NewTeacher {
                name: name.to_string(),
                email: email.to_string(),
                started_on: today - Duration::days(days),
            },
        )?;
        let class = ClassRepo::create(
            &tx,
            &NewClass {
                name: class.to_string(),
                age_group: ages.to_string(),
                room: room.to_string(),
                schedule: "Sundays 9:30".to_string(),
                capacity,
                teacher_id: Some(teacher.id),
            },
        )?;
        let sunday = today - Duration::days(today_offset_to_sunday(today));
        for (i, kid) in kids.iter().enumerate() {
            let student = StudentRepo::enrol(
                &tx,
                &NewStudent {
                    name: kid.to_string(),
                    class_id: class.id,
                    guardian: None,
                },
            )?;
            ClassRepo::mark(&tx, class.id, student.id, sunday, i % 3 != 2)?;
        }
    }

    MetaRepo::set(&tx, SEEDED_ON, &today.to_string())?;
    tx.commit()?;
    log::info!(
        "seeded {} members, {} check-ins, {} donations",
        report.members,
        report.check_ins,
        report.donations
    );
    Ok(report)
}

/// Days back from `today` to the most recent Sunday (0 on a Sunday).
fn today_offset_to_sunday(today: NaiveDate) -> i64 {
    use chrono::Datelike;
    today.weekday().num_days_from_sunday() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::db::repository::StatsRepo;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    #[test]
    fn seed_then_clear() {
        let conn = open_in_memory();
        assert!(!is_seeded(&conn).unwrap());

        let report = seed(&conn, today(), "DON").unwrap();
        assert!(is_seeded(&conn).unwrap());
        assert_eq!(report.members, MemberRepo::all(&conn).unwrap().len());
        assert_eq!(report.check_ins, report.members * 3);

        let summary = StatsRepo::dashboard(&conn, today()).unwrap();
        assert_eq!(summary.budgets_exceeded, 1);
        assert_eq!(summary.budgets_warning, 1);
        assert_eq!(summary.newsletters_scheduled, 1);
        assert_eq!(summary.open_prayers, 3);

        let receipts: Vec<String> = DonationRepo::all(&conn)
            .unwrap()
            .into_iter()
            .map(|d| d.receipt_number)
            .collect();
        assert!(receipts.iter().all(|r| r.starts_with("DON-") && r.len() == 10));

        clear(&conn).unwrap();
        assert!(!is_seeded(&conn).unwrap());
        assert!(MemberRepo::all(&conn).unwrap().is_empty());
    }
}
