//! Calendar arithmetic: financial years, spanning date ranges, missing days.
//!
//! The Australian financial year runs July 1 to June 30 and is labelled
//! `"2016-17"` style, after the calendar years it straddles.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{AusrainError, Result};
use crate::reading::RainDay;

/// How daily rows are grouped into years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearType {
    Calendar,
    Financial,
}

impl FromStr for YearType {
    type Err = AusrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "calendar" => Ok(YearType::Calendar),
            "financial" => Ok(YearType::Financial),
            other => Err(AusrainError::InvalidYearType(other.to_string())),
        }
    }
}

/// Returns the financial year label for a date, e.g. 2016-05-03 -> "2015-16".
pub fn financial_year(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= 7 {
        format!("{}-{:02}", year, (year + 1) % 100)
    } else {
        format!("{}-{:02}", year - 1, year % 100)
    }
}

/// Period label for a date under the given year type.
pub fn period_label(date: NaiveDate, year_type: YearType) -> String {
    match year_type {
        YearType::Calendar => date.year().to_string(),
        YearType::Financial => financial_year(date),
    }
}

/// Every date, one per day ascending, covering each whole year touched by
/// `dates`. Calendar years run Jan 1 to Dec 31, financial years Jul 1 to
/// Jun 30.
pub fn spanning_dates(dates: &[NaiveDate], year_type: YearType) -> Result<Vec<NaiveDate>> {
    let first = *dates.iter().min().ok_or(AusrainError::EmptyInput)?;
    let last = *dates.iter().max().ok_or(AusrainError::EmptyInput)?;

    let (start, end) = match year_type {
        YearType::Calendar => (
            ymd(first.year(), 1, 1)?,
            ymd(last.year(), 12, 31)?,
        ),
        YearType::Financial => {
            let start_year = if first.month() >= 7 {
                first.year()
            } else {
                first.year() - 1
            };
            let end_year = if last.month() >= 7 {
                last.year() + 1
            } else {
                last.year()
            };
            (ymd(start_year, 7, 1)?, ymd(end_year, 6, 30)?)
        }
    };

    let mut out = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut date = start;
    while date <= end {
        out.push(date);
        date = date.succ_opt().ok_or_else(|| {
            AusrainError::DateParse(format!("date out of range after {}", date))
        })?;
    }

    Ok(out)
}

/// Per-period count of expected days with no row in the daily table.
///
/// The expected calendar is the spanning range of the observed dates; a
/// period that maps to 0 is complete.
pub fn find_missing_days(
    days: &[RainDay],
    year_type: YearType,
) -> Result<BTreeMap<String, u32>> {
    let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
    let present: HashSet<NaiveDate> = dates.iter().copied().collect();

    let mut missing = BTreeMap::new();
    for date in spanning_dates(&dates, year_type)? {
        let count = missing.entry(period_label(date, year_type)).or_insert(0);
        if !present.contains(&date) {
            *count += 1;
        }
    }

    Ok(missing)
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AusrainError::DateParse(format!("{}-{:02}-{:02}", year, month, day)))
}

// -- Tests -------------------------------------------------------------------
