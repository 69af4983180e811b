mod board;
mod cli;
mod config;
mod db;
mod error;
mod forms;
mod models;
mod service;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use cli::output::Reported;
use config::AppConfig;
use db::repository::meta::SETUP_DONE;
use db::repository::MetaRepo;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        // already printed by the handler that failed
        if err.downcast_ref::<Reported>().is_none() {
            eprintln!("Error: {:#}", err);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let conn = db::open(&AppConfig::db_path()?)?;

    match cli.command {
        Some(Commands::Setup { reset }) => {
            handlers::handle_setup(&conn, &mut config, reset)?;
        }

        Some(cmd) => {
            ensure_setup(&conn, &mut config)?;
            match cmd {
                Commands::Seed { force } => handlers::handle_seed(&conn, &config, force)?,
                Commands::Members { action } => handlers::handle_members(&conn, action)?,
                Commands::Attendance { action } => {
                    handlers::handle_attendance(&conn, &config, action)?
                }
                Commands::Giving { action } => handlers::handle_giving(&conn, &config, action)?,
                Commands::Budgets { action } => handlers::handle_budgets(&conn, &config, action)?,
                Commands::Report { from, to } => handlers::handle_report(&conn, &config, from, to)?,
                Commands::Departments { action } => handlers::handle_departments(&conn, action)?,
                Commands::Groups { action } => handlers::handle_groups(&conn, action)?,
                Commands::Newsletters { action } => handlers::handle_newsletters(&conn, action)?,
                Commands::Prayer { action } => handlers::handle_prayer(&conn, action)?,
                Commands::SundaySchool { action } => {
                    handlers::handle_sunday_school(&conn, action)?
                }
                Commands::Stats => handlers::handle_stats(&conn, &config)?,
                Commands::Export => handlers::handle_export(&conn, &config)?,
                Commands::Setup { .. } => unreachable!(),
            }
        }

        // No subcommand → launch TUI
        None => {
            ensure_setup(&conn, &mut config)?;
            log::info!("opening dashboard for {}", config.church.name);
            tui::app::run(conn, config, cli.route.as_deref())?;
        }
    }

    Ok(())
}

/// Runs the wizard first when setup has never completed.
fn ensure_setup(conn: &Connection, config: &mut AppConfig) -> Result<()> {
    if !MetaRepo::is_set(conn, SETUP_DONE)? {
        eprintln!("No configuration found. Running setup...");
        eprintln!();
        handlers::handle_setup(conn, config, false)?;
    }
    Ok(())
}
