use anyhow::Result;
use serde::Serialize;
use thiserror::Error;

use crate::service::{Envelope, NoticeKind, Notifier};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

pub(crate) use println_colored;

pub const GREEN: &str = "\x1b[32m";
pub const AMBER: &str = "\x1b[33m";
pub const RED: &str = "\x1b[31m";
pub const DIM: &str = "\x1b[2m";
pub const BOLD: &str = "\x1b[1m";
pub const GOLD: &str = "\x1b[38;2;196;160;68m";

/// Notices as colored lines; failures go to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => println_colored!(GREEN, "  ✓ {}", message),
            NoticeKind::Info => println_colored!(DIM, "  {}", message),
            NoticeKind::Warning => eprintln!("{}  ! {}\x1b[0m", AMBER, message),
            NoticeKind::Error => eprintln!("{}  ✗ {}\x1b[0m", RED, message),
        }
    }
}

/// A failure that has already been shown to the user.
#[derive(Debug, Error)]
#[error("command failed")]
pub struct Reported;

/// Shows a failed store call once and marks it as reported.
pub fn attempt<T>(action: &str, result: Result<T>) -> Result<T> {
    result.map_err(|err| {
        ConsoleNotifier.failure(action, &err);
        Reported.into()
    })
}

pub fn print_json<T: Serialize>(envelope: &Envelope<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

/// Prints the envelope's failure message and marks it reported.
pub fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T> {
    if !envelope.success {
        let message = envelope
            .message
            .clone()
            .unwrap_or_else(|| "Request failed".to_string());
        ConsoleNotifier.notify(NoticeKind::Error, &message);
        return Err(Reported.into());
    }
    envelope.into_result()
}

pub fn heading(title: &str) {
    println!();
    println_colored!(GOLD, "  {}", title);
    println!();
}
