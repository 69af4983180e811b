use ratatui::style::{Color, Modifier, Style};

use crate::models::{BudgetStatus, DonationStatus, NewsletterStatus, PrayerStatus, Priority};
use crate::service::NoticeKind;

pub const BG: Color = Color::Rgb(16, 19, 28);
pub const SURFACE: Color = Color::Rgb(24, 28, 40);
pub const BORDER: Color = Color::Rgb(52, 58, 78);
pub const BORDER_FOCUS: Color = Color::Rgb(201, 168, 92);
pub const TEXT: Color = Color::Rgb(226, 222, 210);
pub const TEXT_DIM: Color = Color::Rgb(122, 126, 142);
pub const GOLD: Color = Color::Rgb(201, 168, 92);
pub const GREEN: Color = Color::Rgb(98, 160, 110);
pub const AMBER: Color = Color::Rgb(214, 150, 70);
pub const RED: Color = Color::Rgb(190, 86, 78);
pub const HIGHLIGHT: Color = Color::Rgb(40, 46, 66);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    Style::default().fg(if focused { BORDER_FOCUS } else { BORDER })
}

/// Row under the cursor.
pub fn highlight() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn notice(kind: NoticeKind) -> Style {
    match kind {
        NoticeKind::Success => green(),
        NoticeKind::Info => dim(),
        NoticeKind::Warning => amber(),
        NoticeKind::Error => red(),
    }
}

pub fn budget(status: BudgetStatus) -> Style {
    match status {
        BudgetStatus::OnTrack => green(),
        BudgetStatus::Warning => amber(),
        BudgetStatus::Exceeded => red(),
    }
}

pub fn donation(status: DonationStatus) -> Style {
    match status {
        DonationStatus::Completed => green(),
        DonationStatus::Pending => amber(),
        DonationStatus::Failed => red(),
        DonationStatus::Refunded => dim(),
    }
}

pub fn newsletter(status: NewsletterStatus) -> Style {
    match status {
        NewsletterStatus::Draft => dim(),
        NewsletterStatus::Scheduled => amber(),
        NewsletterStatus::Sent => green(),
    }
}

pub fn prayer(status: PrayerStatus, priority: Priority) -> Style {
    match (status, priority) {
        (PrayerStatus::Answered, _) => green(),
        (PrayerStatus::Closed, _) => dim(),
        (_, Priority::Urgent) => red(),
        (_, Priority::High) => amber(),
        _ => Style::default().fg(TEXT),
    }
}
