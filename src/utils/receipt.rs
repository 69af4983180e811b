/// `<prefix>-NNNNNN` from the last six digits of an epoch-millis timestamp.
pub fn receipt_number(prefix: &str, millis: i64) -> String {
    format!("{}-{:06}", prefix, millis.rem_euclid(1_000_000))
}

/// First receipt number at or after `millis` for which `taken` is false.
/// Wraps within the six-digit space.
pub fn next_free_receipt<F>(prefix: &str, millis: i64, mut taken: F) -> anyhow::Result<String>
where
    F: FnMut(&str) -> anyhow::Result<bool>,
{
    let start = millis.rem_euclid(1_000_000);
    for bump in 0..1_000_000 {
        let candidate = receipt_number(prefix, start + bump);
        if !taken(&candidate)? {
            return Ok(candidate);
        }
    }
    anyhow::bail!("No free receipt numbers left for prefix {}", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_receipt(s: &str) -> bool {
        let Some(digits) = s.strip_prefix("DON-") else {
            return false;
        };
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn uses_last_six_digits_zero_padded() {
        assert_eq!(receipt_number("DON", 1_767_225_600_123), "DON-600123");
        assert_eq!(receipt_number("DON", 1_767_225_000_042), "DON-000042");
        assert!(is_receipt(&receipt_number("DON", chrono::Utc::now().timestamp_millis())));
    }

    #[test]
    fn collisions_bump_to_the_next_number() {
        let existing = ["DON-000042", "DON-000043"];
        let got = next_free_receipt("DON", 42, |c| Ok(existing.contains(&c))).unwrap();
        assert_eq!(got, "DON-000044");

        let wrapped = next_free_receipt("DON", 999_999, |c| Ok(c == "DON-999999")).unwrap();
        assert_eq!(wrapped, "DON-000000");
        assert!(is_receipt(&wrapped));
    }
}
