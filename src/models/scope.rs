//! Time scope and accounting mode
//!
//! A fetch is bounded by a scope (one month, or a whole year) and an
//! accounting mode that picks which transaction date the scope applies to.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transaction date a scope filters on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountingMode {
    /// Nominal transaction date ("competência")
    #[default]
    Accrual,
    /// Due/settlement date ("caixa")
    Cash,
}

impl AccountingMode {
    /// The transactions column the mode filters on
    pub fn date_column(&self) -> &'static str {
        match self {
            Self::Accrual => "date",
            Self::Cash => "due_date",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "accrual" | "competencia" | "competência" => Some(Self::Accrual),
            "cash" | "caixa" => Some(Self::Cash),
            _ => None,
        }
    }
}

impl fmt::Display for AccountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accrual => write!(f, "accrual"),
            Self::Cash => write!(f, "cash"),
        }
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A single month of a year, or the whole year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    year: i32,
    month: Option<u32>,
}

impl Scope {
    /// A single calendar month
    pub fn month(year: i32, month: u32) -> Result<Self, ScopeError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(ScopeError::InvalidMonth(month));
        }
        Ok(Self {
            year,
            month: Some(month),
        })
    }

    /// January 1 through December 31
    pub fn year(year: i32) -> Result<Self, ScopeError> {
        check_year(year)?;
        Ok(Self { year, month: None })
    }

    /// The month containing `today`
    pub fn containing(today: NaiveDate) -> Self {
        Self {
            year: today.year(),
            month: Some(today.month()),
        }
    }

    pub fn year_number(&self) -> i32 {
        self.year
    }

    /// The selected month, `None` for a full-year scope
    pub fn month_number(&self) -> Option<u32> {
        self.month
    }

    pub fn is_full_year(&self) -> bool {
        self.month.is_none()
    }

    /// First and last calendar day covered
    pub fn window(&self) -> DateWindow {
        match self.month {
            Some(month) => DateWindow {
                start: ymd(self.year, month, 1),
                end: last_day_of_month(self.year, month),
            },
            None => DateWindow {
                start: ymd(self.year, 1, 1),
                end: ymd(self.year, 12, 31),
            },
        }
    }

    /// First-of-month keys of every month the scope covers
    pub fn months(&self) -> Vec<NaiveDate> {
        match self.month {
            Some(month) => vec![ymd(self.year, month, 1)],
            None => (1..=12).map(|m| ymd(self.year, m, 1)).collect(),
        }
    }

    /// The month a budget limit written under this scope is keyed to
    pub fn budget_month(&self) -> Option<NaiveDate> {
        self.month.map(|m| ymd(self.year, m, 1))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    /// The previous month, or the previous year for a full-year scope
    pub fn prev(&self) -> Self {
        match self.month {
            Some(1) => Self {
                year: self.year - 1,
                month: Some(12),
            },
            Some(m) => Self {
                year: self.year,
                month: Some(m - 1),
            },
            None => Self {
                year: self.year - 1,
                month: None,
            },
        }
    }

    /// The next month, or the next year for a full-year scope
    pub fn next(&self) -> Self {
        match self.month {
            Some(12) => Self {
                year: self.year + 1,
                month: Some(1),
            },
            Some(m) => Self {
                year: self.year,
                month: Some(m + 1),
            },
            None => Self {
                year: self.year + 1,
                month: None,
            },
        }
    }

    /// Parse a scope string
    ///
    /// Formats:
    /// - Month: "2025-03"
    /// - Year: "2025" or "2025-all"
    pub fn parse(s: &str) -> Result<Self, ScopeError> {
        let s = s.trim();
        let invalid = || ScopeError::InvalidFormat(s.to_string());

        match s.split_once('-') {
            Some((year, "all")) => Self::year(year.parse().map_err(|_| invalid())?),
            Some((year, month)) => Self::month(
                year.parse().map_err(|_| invalid())?,
                month.parse().map_err(|_| invalid())?,
            ),
            None => Self::year(s.parse().map_err(|_| invalid())?),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(month) => write!(f, "{:04}-{:02}", self.year, month),
            None => write!(f, "{:04}", self.year),
        }
    }
}

fn check_year(year: i32) -> Result<(), ScopeError> {
    if (1..=9999).contains(&year) {
        Ok(())
    } else {
        Err(ScopeError::InvalidYear(year))
    }
}

// Year and month are range-checked by the constructors.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_first = if month == 12 {
        ymd(year + 1, 1, 1)
    } else {
        ymd(year, month + 1, 1)
    };
    next_first.pred_opt().unwrap_or(next_first)
}

/// Errors building or parsing a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    InvalidFormat(String),
    InvalidMonth(u32),
    InvalidYear(i32),
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => {
                write!(f, "Invalid period '{}' (expected YYYY-MM, YYYY or YYYY-all)", s)
            }
            Self::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
            Self::InvalidYear(y) => write!(f, "Invalid year: {}", y),
        }
    }
}

impl std::error::Error for ScopeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_window() {
        let scope = Scope::month(2024, 2).unwrap();
        let window = scope.window();
        assert_eq!(window.start, date(2024, 2, 1));
        assert_eq!(window.end, date(2024, 2, 29));

        let december = Scope::month(2025, 12).unwrap().window();
        assert_eq!(december.end, date(2025, 12, 31));
    }

    #[test]
    fn test_year_window_and_months() {
        let scope = Scope::year(2025).unwrap();
        assert_eq!(scope.window().start, date(2025, 1, 1));
        assert_eq!(scope.window().end, date(2025, 12, 31));
        assert_eq!(scope.months().len(), 12);
        assert_eq!(scope.months()[11], date(2025, 12, 1));
        assert!(scope.budget_month().is_none());
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(Scope::month(2025, 13), Err(ScopeError::InvalidMonth(13)));
        assert_eq!(Scope::month(2025, 0), Err(ScopeError::InvalidMonth(0)));
    }

    #[test]
    fn test_navigation() {
        let jan = Scope::month(2025, 1).unwrap();
        assert_eq!(jan.prev(), Scope::month(2024, 12).unwrap());
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(Scope::year(2025).unwrap().next(), Scope::year(2026).unwrap());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Scope::parse("2025-03").unwrap(), Scope::month(2025, 3).unwrap());
        assert_eq!(Scope::parse("2025").unwrap(), Scope::year(2025).unwrap());
        assert_eq!(Scope::parse("2025-all").unwrap(), Scope::year(2025).unwrap());
        assert!(Scope::parse("March").is_err());
        assert_eq!(Scope::month(2025, 3).unwrap().to_string(), "2025-03");
        assert_eq!(Scope::year(2025).unwrap().to_string(), "2025");
    }

    #[test]
    fn test_mode_columns() {
        assert_eq!(AccountingMode::Accrual.date_column(), "date");
        assert_eq!(AccountingMode::Cash.date_column(), "due_date");
        assert_eq!(AccountingMode::parse("caixa"), Some(AccountingMode::Cash));
    }
}
