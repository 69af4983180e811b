use chrono::NaiveDateTime;

/// Format an amount with the currency symbol and thousands separators,
/// e.g. "$12,500.00". Negative amounts get a leading minus.
pub fn format_money(symbol: &str, amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, symbol, grouped, cents % 100)
}

/// Format a timestamp to "HH:MM"
pub fn format_time(t: NaiveDateTime) -> String {
    t.format("%H:%M").to_string()
}

/// Format a percentage without decimals
pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", value)
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Cut `text` to `width` columns, ending with "…" when shortened.
pub fn truncate(text: &str, width: usize) -> String {
    use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money("$", 12500.0), "$12,500.00");
        assert_eq!(format_money("$", 999.5), "$999.50");
        assert_eq!(format_money("£", 1234567.891), "£1,234,567.89");
        assert_eq!(format_money("$", -40.0), "-$40.00");
        assert_eq!(format_money("$", 0.0), "$0.00");
    }

    #[test]
    fn progress_bar_fills_by_ratio() {
        assert_eq!(progress_bar(83, 100, 10), "████████░░");
        assert_eq!(progress_bar(150, 100, 4), "████");
        assert_eq!(progress_bar(0, 0, 3), "░░░");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Choir", 10), "Choir");
        assert_eq!(truncate("Christmas Pageant", 8), "Christm…");
    }
}
