use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::models::{
    AttendanceStatus, BudgetStatus, DonationStatus, GivingCategory, GivingType, MemberStatus,
    NewsletterStatus, PaymentMethod, PrayerStatus, Priority, ServiceType,
};

#[derive(Parser, Debug)]
#[command(name = "flock", version, author, about = "A terminal dashboard for church administration")]
pub struct Cli {
    /// Open the dashboard at this path, e.g. /dashboard/finance/giving
    #[arg(long)]
    pub route: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// First-run setup wizard (church name, currency, default service)
    Setup {
        /// Reset existing configuration
        #[arg(long)]
        reset: bool,
    },
    /// Load the demo congregation
    Seed {
        /// Wipe existing records first
        #[arg(long)]
        force: bool,
    },
    /// Member directory
    Members {
        #[command(subcommand)]
        action: MemberCommands,
    },
    /// Service check-ins
    Attendance {
        #[command(subcommand)]
        action: AttendanceCommands,
    },
    /// Donations and receipts
    Giving {
        #[command(subcommand)]
        action: GivingCommands,
    },
    /// Budgets and spending
    Budgets {
        #[command(subcommand)]
        action: BudgetCommands,
    },
    /// Income vs expense for a date range
    Report {
        /// First day, defaults to the start of this month
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day, defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Departments, roles and assignments
    Departments {
        #[command(subcommand)]
        action: DepartmentCommands,
    },
    /// Small groups and their events
    Groups {
        #[command(subcommand)]
        action: GroupCommands,
    },
    /// Newsletter drafts and sends
    Newsletters {
        #[command(subcommand)]
        action: NewsletterCommands,
    },
    /// Prayer requests
    Prayer {
        #[command(subcommand)]
        action: PrayerCommands,
    },
    /// Sunday School classes and teachers
    #[command(name = "sunday-school")]
    SundaySchool {
        #[command(subcommand)]
        action: SchoolCommands,
    },
    /// Print the dashboard summary
    Stats,
    /// Export a weekly text summary to stdout
    Export,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// List members
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<MemberStatus>,
        #[arg(long)]
        department: Option<String>,
        /// Print the service envelope as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a member
    Add {
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
        /// active, inactive or visitor
        #[arg(long)]
        status: Option<String>,
    },
    /// Change a member's status
    Status { id: i64, status: MemberStatus },
    /// Remove a member
    Remove { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum AttendanceCommands {
    /// Record a member's check-in
    #[command(name = "check-in")]
    CheckIn {
        member_id: i64,
        #[arg(long)]
        service: Option<ServiceType>,
        #[arg(long, default_value = "present")]
        status: AttendanceStatus,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List check-ins
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        service: Option<ServiceType>,
        #[arg(long)]
        status: Option<AttendanceStatus>,
    },
    /// Counts per status for one day
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GivingCommands {
    /// Record a donation
    Add {
        donor: String,
        amount: String,
        #[arg(long = "type")]
        giving_type: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        method: Option<String>,
        /// Link the gift to a member
        #[arg(long)]
        member: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// List donations
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<GivingCategory>,
        #[arg(long)]
        method: Option<PaymentMethod>,
        #[arg(long)]
        status: Option<DonationStatus>,
        #[arg(long)]
        json: bool,
    },
    /// Move a donation along its status table
    Status { id: i64, status: DonationStatus },
    /// Totals per category
    Summary {
        #[arg(long = "type")]
        giving_type: Option<GivingType>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommands {
    /// List budgets with utilization
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<BudgetStatus>,
        #[arg(long)]
        json: bool,
    },
    /// Create a budget
    Add {
        name: String,
        amount: String,
        #[arg(long)]
        department: Option<String>,
        /// monthly, quarterly or annual
        #[arg(long)]
        period: Option<String>,
    },
    /// Record spending against a budget
    Spend {
        budget_id: i64,
        amount: String,
        description: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DepartmentCommands {
    /// List departments
    List,
    /// Add a department
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Roles of a department
    Roles { department_id: i64 },
    /// Add a role to a department
    #[command(name = "add-role")]
    AddRole {
        department_id: i64,
        title: String,
        /// head, leader, coordinator or member
        #[arg(long)]
        level: String,
        #[arg(long, default_value = "")]
        description: String,
        /// One per line, or separated by a literal \n
        #[arg(long, default_value = "")]
        responsibilities: String,
    },
    /// Place a member in a department
    Assign {
        department_id: i64,
        member_id: i64,
        #[arg(long)]
        role: Option<i64>,
    },
    /// Members of a department
    Members { department_id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// List groups
    List,
    /// Add a member to a group
    Join { group_id: i64, member_id: i64 },
    /// Remove a member from a group
    Leave { group_id: i64, member_id: i64 },
    /// Events of a group
    Events { group_id: i64 },
    /// Add an event to a group
    #[command(name = "add-event")]
    AddEvent {
        group_id: i64,
        title: String,
        date: String,
        #[arg(long)]
        location: Option<String>,
    },
    /// Change some fields of an event
    #[command(name = "edit-event")]
    EditEvent {
        event_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        location: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NewsletterCommands {
    /// List newsletters
    List {
        #[arg(long)]
        status: Option<NewsletterStatus>,
    },
    /// Start a draft
    Draft {
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Schedule a draft for a date
    Schedule { id: i64, date: NaiveDate },
    /// Return a scheduled newsletter to draft
    Unschedule { id: i64 },
    /// Mark as sent to every active member
    Send { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum PrayerCommands {
    /// List prayer requests
    List {
        #[arg(long)]
        status: Option<PrayerStatus>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Submit a request
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        requester: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Hide the requester's name
        #[arg(long)]
        private: bool,
    },
    /// Move a request along its status table
    Status { id: i64, status: PrayerStatus },
    /// Comment on a request
    Comment { id: i64, author: String, body: String },
    /// Post an update on a request
    Update { id: i64, body: String },
}

#[derive(Subcommand, Debug)]
pub enum SchoolCommands {
    /// Classes with attendance rates
    Classes,
    /// Teachers with years of service
    Teachers,
    /// Record a student's attendance
    Mark {
        class_id: i64,
        student_id: i64,
        #[arg(long)]
        absent: bool,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}
