//! Reporting-period normalization.
//!
//! Providers label months in many ways (`2025-07`, `2025-7`, `2025/07`,
//! `202507`, `2025M07`, `07-2025`, `2025-07-01`). Internally every period is
//! the canonical `YYYY-MM` key so that ascending string order equals
//! chronological order; callers see the `MM-YYYY` display form.

use std::fmt::{Display, Formatter};

use time::Month;

/// Calendar month of a monthly statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u8,
}

impl Period {
    pub fn new(year: i32, month: u8) -> Option<Self> {
        if !(1000..=9999).contains(&year) {
            return None;
        }
        let month = Month::try_from(month).ok()?;
        Some(Self {
            year,
            month: u8::from(month),
        })
    }

    /// Parses any of the recognised period encodings.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if text.len() == 6 && is_digits(text) {
            return Self::from_parts(&text[..4], &text[4..]);
        }

        if let Some((year, month)) = text.split_once(['M', 'm']) {
            let year = year.strip_suffix('-').unwrap_or(year);
            if year.len() == 4 && (1..=2).contains(&month.len()) {
                return Self::from_parts(year, month);
            }
            return None;
        }

        let parts = text.split(['-', '/', '.']).collect::<Vec<_>>();
        match parts.as_slice() {
            [year, month] if year.len() == 4 && (1..=2).contains(&month.len()) => {
                Self::from_parts(year, month)
            }
            [month, year] if year.len() == 4 && (1..=2).contains(&month.len()) => {
                Self::from_parts(year, month)
            }
            [year, month, day] if year.len() == 4 && month.len() == 2 && day.len() == 2 => {
                if !is_digits(day) {
                    return None;
                }
                Self::from_parts(year, month)
            }
            _ => None,
        }
    }

    fn from_parts(year: &str, month: &str) -> Option<Self> {
        if !is_digits(year) || !is_digits(month) {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u8 {
        self.month
    }

    /// Sortable `YYYY-MM` key.
    pub fn canonical(self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// User-facing `MM-YYYY` label.
    pub fn display(self) -> String {
        format!("{:02}-{:04}", self.month, self.year)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Converts a raw period label into the canonical `YYYY-MM` key.
///
/// Unrecognised labels are passed through unchanged so extraction can go on
/// with a best-effort value.
pub fn normalize(raw: &str) -> String {
    match Period::parse(raw) {
        Some(period) => period.canonical(),
        None => raw.to_owned(),
    }
}

/// Reformats a canonical key as `MM-YYYY`; anything else is returned as is.
pub fn to_display(canonical: &str) -> String {
    if is_canonical(canonical) {
        format!("{}-{}", &canonical[5..7], &canonical[..4])
    } else {
        canonical.to_owned()
    }
}

/// True when `value` has the exact `YYYY-MM` shape.
pub fn is_canonical(value: &str) -> bool {
    value.len() == 7
        && value.as_bytes()[4] == b'-'
        && is_digits(&value[..4])
        && is_digits(&value[5..])
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_common_encodings() {
        for raw in [
            "2025-07", "2025-7", "2025/07", "202507", "2025M07", "2025-M07", "07-2025", "7/2025",
            "2025.07", "2025-07-01",
        ] {
            assert_eq!(normalize(raw), "2025-07", "input {raw}");
        }
    }

    #[test]
    fn display_round_trip() {
        assert_eq!(to_display(&normalize("2025-07")), "07-2025");
        assert_eq!(to_display(&normalize("202507")), "07-2025");
    }

    #[test]
    fn unknown_labels_pass_through() {
        assert_eq!(normalize("2025-Q3"), "2025-Q3");
        assert_eq!(normalize("July 2025"), "July 2025");
        assert_eq!(normalize("2025-13"), "2025-13");
        assert_eq!(to_display("2025-Q3"), "2025-Q3");
        assert_eq!(to_display(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["2025-07", "202507", "12-2024", "garbage", "2025M1", ""] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "input {raw}");
        }
    }

    #[test]
    fn periods_order_chronologically() {
        let earlier = Period::parse("2024-12").expect("valid period");
        let later = Period::parse("2025-01").expect("valid period");
        assert!(earlier < later);
        assert!(earlier.canonical() < later.canonical());
    }
}
