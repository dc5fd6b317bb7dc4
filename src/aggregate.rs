//! Grouping of canonical daily records into period totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{find_missing_days, YearType};
use crate::error::Result;
use crate::reading::RainDay;

/// Totals for one period (calendar year, financial year, or month).
///
/// `rainfall` sums the days that have rows; absent days contribute nothing.
/// `rainfall_count` never exceeds the days in the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub label: String,
    pub start_date: NaiveDate,
    pub rainfall: f64,
    pub rainfall_count: u32,
    pub interpolated_count: u32,
    pub quality_count: u32,
}

#[derive(Default)]
struct Accumulator {
    rainfall: f64,
    rainfall_count: u32,
    interpolated_count: u32,
    quality_count: u32,
}

impl Accumulator {
    fn push(&mut self, day: &RainDay) {
        self.rainfall += day.rainfall;
        self.rainfall_count += 1;
        if day.interp_code != 0 {
            self.interpolated_count += 1;
        }
        if day.quality.is_some() {
            self.quality_count += 1;
        }
    }

    fn into_total(self, label: String, start_date: NaiveDate) -> PeriodTotal {
        PeriodTotal {
            label,
            start_date,
            rainfall: self.rainfall,
            rainfall_count: self.rainfall_count,
            interpolated_count: self.interpolated_count,
            quality_count: self.quality_count,
        }
    }
}

/// Group by calendar year; start dates are Jan 1.
pub fn by_year(days: &[RainDay]) -> Vec<PeriodTotal> {
    let mut groups: BTreeMap<i32, Accumulator> = BTreeMap::new();
    for day in days {
        groups.entry(day.year).or_default().push(day);
    }

    groups
        .into_iter()
        .map(|(year, acc)| {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            acc.into_total(year.to_string(), start)
        })
        .collect()
}

/// Group by financial year label; start dates are Jul 1.
pub fn by_financial_year(days: &[RainDay]) -> Vec<PeriodTotal> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for day in days {
        groups.entry(day.finyear.clone()).or_default().push(day);
    }

    groups
        .into_iter()
        .map(|(label, acc)| {
            let start_year: i32 = label[..4].parse().unwrap_or(0);
            let start = NaiveDate::from_ymd_opt(start_year, 7, 1).unwrap();
            acc.into_total(label, start)
        })
        .collect()
}

/// Group by (year, month) with a `"YYYY-MM"` label; start dates are the
/// first of the month.
pub fn by_month(days: &[RainDay]) -> Vec<PeriodTotal> {
    let mut groups: BTreeMap<(i32, u32), Accumulator> = BTreeMap::new();
    for day in days {
        groups.entry((day.year, day.month)).or_default().push(day);
    }

    groups
        .into_iter()
        .map(|((year, month), acc)| {
            let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            acc.into_total(format!("{}-{:02}", year, month), start)
        })
        .collect()
}

/// Percent of a calendar year that was infilled rather than observed,
/// split the way the annual chart stacks it: spatially interpolated codes
/// (25, 35, 75) versus deaccumulated ones (15).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SrnYear {
    pub year: i32,
    pub interpolated_pct: f64,
    pub deaccumulated_pct: f64,
}

pub fn srn_breakdown(days: &[RainDay]) -> Vec<SrnYear> {
    let mut interpolated: BTreeMap<i32, u32> = BTreeMap::new();
    let mut deaccumulated: BTreeMap<i32, u32> = BTreeMap::new();

    for day in days {
        interpolated.entry(day.year).or_default();
        deaccumulated.entry(day.year).or_default();
        match day.interp_code {
            25 | 35 | 75 => *interpolated.get_mut(&day.year).unwrap() += 1,
            15 => *deaccumulated.get_mut(&day.year).unwrap() += 1,
            _ => {}
        }
    }

    interpolated
        .into_iter()
        .map(|(year, count)| SrnYear {
            year,
            interpolated_pct: count as f64 / 365.25 * 100.0,
            deaccumulated_pct: deaccumulated[&year] as f64 / 365.25 * 100.0,
        })
        .collect()
}

/// A station's canonical daily table plus display metadata.
///
/// The calendar and financial accessors drop periods with missing days when
/// `complete_years_only` is set; the monthly view is never filtered.
#[derive(Debug, Clone)]
pub struct StationData {
    pub station: String,
    pub name: String,
    pub title: String,
    pub days: Vec<RainDay>,
    pub complete_years_only: bool,
}

impl StationData {
    pub fn new(station: String, name: String, title: String, days: Vec<RainDay>) -> Self {
        StationData {
            station,
            name,
            title,
            days,
            complete_years_only: false,
        }
    }

    pub fn annual(&self) -> Result<Vec<PeriodTotal>> {
        self.filtered(by_year(&self.days), YearType::Calendar)
    }

    pub fn financial(&self) -> Result<Vec<PeriodTotal>> {
        self.filtered(by_financial_year(&self.days), YearType::Financial)
    }

    pub fn monthly(&self) -> Vec<PeriodTotal> {
        by_month(&self.days)
    }

    pub fn missing_days(&self, year_type: YearType) -> Result<BTreeMap<String, u32>> {
        find_missing_days(&self.days, year_type)
    }

    fn filtered(
        &self,
        mut totals: Vec<PeriodTotal>,
        year_type: YearType,
    ) -> Result<Vec<PeriodTotal>> {
        if !self.complete_years_only || self.days.is_empty() {
            return Ok(totals);
        }

        let missing = self.missing_days(year_type)?;
        totals.retain(|total| missing.get(&total.label).copied().unwrap_or(0) == 0);
        Ok(totals)
    }
}

// -- Tests -------------------------------------------------------------------
