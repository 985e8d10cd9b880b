use crate::ScrapeError;
use std::fmt;
use std::str::FromStr;

/// Time-range filter applied to a listing query
///
/// `Fresh` leaves the `year` parameter empty so the endpoint returns the most
/// recent listings. A period is either a single year (`2024`) or a decade
/// (`2010s`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeFilter {
    #[default]
    Fresh,
    Period(String),
}

impl TimeFilter {
    /// Value of the `year` query parameter, if any
    pub fn year_param(&self) -> Option<&str> {
        match self {
            Self::Fresh => None,
            Self::Period(period) => Some(period.as_str()),
        }
    }
}

impl FromStr for TimeFilter {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("fresh") || s.is_empty() {
            return Ok(Self::Fresh);
        }

        let (digits, decade) = match s.strip_suffix('s') {
            Some(d) => (d, true),
            None => (s, false),
        };

        let year: u32 = digits
            .parse()
            .map_err(|_| ScrapeError::InvalidTimeFilter(s.to_string()))?;

        let valid = digits.len() == 4 && (1950..=2099).contains(&year) && (!decade || year % 10 == 0);
        if !valid {
            return Err(ScrapeError::InvalidTimeFilter(s.to_string()));
        }

        Ok(Self::Period(s.to_string()))
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "Fresh"),
            Self::Period(period) => write!(f, "{}", period),
        }
    }
}
