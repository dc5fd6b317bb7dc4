//! Descriptive statistics over period totals, against a frozen baseline.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::aggregate::PeriodTotal;
use crate::error::{AusrainError, Result};

/// The sample a set of statistics was computed from, sorted and frozen at
/// construction. Later changes to the wider dataset cannot shift the ranks
/// it reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline(Vec<f64>);

impl Baseline {
    pub fn new(mut sample: Vec<f64>) -> Self {
        sample.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Baseline(sample)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Percentile rank of `value` against the sample. Ties receive the
    /// average of the ranks they straddle.
    pub fn percentile_of(&self, value: f64) -> f64 {
        if self.0.is_empty() {
            return f64::NAN;
        }
        let below = self.0.iter().filter(|v| **v < value).count();
        let at_or_below = self.0.iter().filter(|v| **v <= value).count();
        (below + at_or_below) as f64 / (2.0 * self.0.len() as f64) * 100.0
    }

    /// Quantile by linear interpolation on the sorted sample.
    fn quantile(&self, q: f64) -> f64 {
        match self.0.len() {
            0 => f64::NAN,
            1 => self.0[0],
            n => {
                let h = (n - 1) as f64 * q;
                let lo = h.floor() as usize;
                let frac = h - lo as f64;
                if lo + 1 == n {
                    self.0[lo]
                } else {
                    self.0[lo] + (self.0[lo + 1] - self.0[lo]) * frac
                }
            }
        }
    }
}

/// Descriptive statistics for one baseline sample.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub pct5: f64,
    pub pct25: f64,
    pub pct75: f64,
    pub pct95: f64,
    #[serde(skip)]
    baseline: Baseline,
}

impl SummaryStats {
    pub fn from_sample(sample: Vec<f64>) -> Self {
        let baseline = Baseline::new(sample);
        let n = baseline.len();
        let mean = if n == 0 {
            f64::NAN
        } else {
            baseline.0.iter().sum::<f64>() / n as f64
        };

        SummaryStats {
            mean,
            median: baseline.quantile(0.5),
            min: baseline.quantile(0.0),
            max: baseline.quantile(1.0),
            pct5: baseline.quantile(0.05),
            pct25: baseline.quantile(0.25),
            pct75: baseline.quantile(0.75),
            pct95: baseline.quantile(0.95),
            baseline,
        }
    }

    /// Percentile rank of `value` against the frozen baseline sample.
    pub fn percentile_of(&self, value: f64) -> f64 {
        self.baseline.percentile_of(value)
    }
}

/// Describe the rainfall series over a baseline sub-period bounded by period
/// labels; omitted bounds default to the full extent. A bound that matches
/// no row fails rather than silently shrinking the sample.
pub fn describe(
    totals: &[PeriodTotal],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<SummaryStats> {
    if totals.is_empty() {
        return Ok(SummaryStats::from_sample(Vec::new()));
    }

    let lo = match start {
        Some(label) => position(totals, label)?,
        None => 0,
    };
    let hi = match end {
        Some(label) => position(totals, label)?,
        None => totals.len() - 1,
    };

    let sample = if lo <= hi {
        totals[lo..=hi].iter().map(|t| t.rainfall).collect()
    } else {
        Vec::new()
    };

    Ok(SummaryStats::from_sample(sample))
}

/// One set of statistics per calendar month (1-12), each closed over that
/// month's values inside the baseline window. Window boundaries are
/// `(year, month)` pairs that must match a row exactly.
pub fn monthly_describe(
    monthly: &[PeriodTotal],
    start: (i32, u32),
    end: (i32, u32),
) -> Result<BTreeMap<u32, SummaryStats>> {
    let lo = position(monthly, &month_label(start))?;
    let hi = position(monthly, &month_label(end))?;
    let window: &[PeriodTotal] = if lo <= hi { &monthly[lo..=hi] } else { &[] };

    let mut out = BTreeMap::new();
    for month in 1..=12 {
        let sample: Vec<f64> = window
            .iter()
            .filter(|t| t.start_date.month() == month)
            .map(|t| t.rainfall)
            .collect();
        out.insert(month, SummaryStats::from_sample(sample));
    }

    Ok(out)
}

/// A period total with its deviation from the baseline mean.
#[derive(Debug, Clone, Serialize)]
pub struct DeviationRow {
    pub label: String,
    pub start_date: NaiveDate,
    pub rainfall: f64,
    pub deviation: f64,
    pub deviation_pct: f64,
    pub percentile: f64,
}

/// Append deviation columns to a run of period totals. A zero baseline mean
/// yields non-finite percentages (IEEE-754 division), not an error.
pub fn apply_deviation(totals: &[PeriodTotal], stats: &SummaryStats) -> Vec<DeviationRow> {
    totals
        .iter()
        .map(|total| {
            let deviation = total.rainfall - stats.mean;
            DeviationRow {
                label: total.label.clone(),
                start_date: total.start_date,
                rainfall: total.rainfall,
                deviation,
                deviation_pct: deviation / stats.mean * 100.0,
                percentile: (stats.percentile_of(total.rainfall) * 10.0).round() / 10.0,
            }
        })
        .collect()
}

fn month_label((year, month): (i32, u32)) -> String {
    format!("{}-{:02}", year, month)
}

fn position(totals: &[PeriodTotal], label: &str) -> Result<usize> {
    totals
        .iter()
        .position(|t| t.label == label)
        .ok_or_else(|| AusrainError::PeriodNotFound(label.to_string()))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    fn totals_fixture(values: &[f64]) -> Vec<PeriodTotal> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| PeriodTotal {
                label: (1950 + i as i32).to_string(),
                start_date: NaiveDate::from_ymd_opt(1950 + i as i32, 1, 1).unwrap(),
                rainfall: *v,
                rainfall_count: 365,
                interpolated_count: 0,
                quality_count: 0,
            })
            .collect()
    }

    #[test]
    fn should_order_quantiles() {
        let totals = totals_fixture(&[532.0, 401.2, 387.9, 610.0, 455.1, 498.0, 520.3]);
        let stats = describe(&totals, None, None).unwrap();

        assert!(stats.pct5 <= stats.pct25);
        assert!(stats.pct25 <= stats.median);
        assert!(stats.median <= stats.pct75);
        assert!(stats.pct75 <= stats.pct95);
        assert_eq!(stats.min, 387.9);
        assert_eq!(stats.max, 610.0);
    }

    #[test]
    fn should_rank_median_near_fifty() {
        let totals = totals_fixture(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]);
        let stats = describe(&totals, None, None).unwrap();

        assert!((stats.percentile_of(stats.median) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn should_interpolate_quantiles_linearly() {
        let stats = SummaryStats::from_sample(vec![0.0, 10.0, 20.0, 30.0]);

        // h = 3 * 0.25 = 0.75 -> between 0.0 and 10.0
        assert!((stats.pct25 - 7.5).abs() < 1e-9);
        assert!((stats.median - 15.0).abs() < 1e-9);
    }

    #[test]
    fn should_average_tied_ranks() {
        let stats = SummaryStats::from_sample(vec![1.0, 2.0, 2.0, 3.0]);

        // one below, three at-or-below -> (1 + 3) / (2 * 4)
        assert!((stats.percentile_of(2.0) - 50.0).abs() < 1e-9);
        assert_eq!(stats.percentile_of(0.0), 0.0);
        assert_eq!(stats.percentile_of(4.0), 100.0);
    }

    #[test]
    fn should_slice_baseline_by_labels() {
        let totals = totals_fixture(&[100.0, 200.0, 300.0, 400.0, 500.0]);
        let stats = describe(&totals, Some("1951"), Some("1953")).unwrap();

        assert_eq!(stats.min, 200.0);
        assert_eq!(stats.max, 400.0);
        assert!((stats.mean - 300.0).abs() < 1e-9);
    }

    #[test]
    fn should_fail_on_unknown_baseline_label() {
        let totals = totals_fixture(&[100.0, 200.0]);

        assert!(matches!(
            describe(&totals, Some("1899"), None),
            Err(AusrainError::PeriodNotFound(_))
        ));
    }

    #[test]
    fn should_freeze_baseline_at_construction() {
        let totals = totals_fixture(&[10.0, 20.0, 30.0]);
        let stats = describe(&totals, None, None).unwrap();
        let before = stats.percentile_of(20.0);

        // ranks computed later against the same stats are unchanged by
        // whatever happened to the source table
        let mut extended = totals.clone();
        extended.extend(totals_fixture(&[90.0, 95.0]));
        assert_eq!(stats.percentile_of(20.0), before);
    }

    #[test]
    fn should_apply_deviation_columns() {
        let totals = totals_fixture(&[100.0, 200.0, 300.0]);
        let stats = describe(&totals, None, None).unwrap();
        let rows = apply_deviation(&totals, &stats);

        assert_eq!(rows.len(), 3);
        assert!((rows[0].deviation - -100.0).abs() < 1e-9);
        assert!((rows[0].deviation_pct - -50.0).abs() < 1e-9);
        assert!((rows[2].deviation - 100.0).abs() < 1e-9);
        assert_eq!(rows[1].percentile, 50.0);
    }

    #[test]
    fn should_recompute_identical_deviation() {
        let totals = totals_fixture(&[120.0, 80.0, 310.0, 95.0]);
        let stats = describe(&totals, None, None).unwrap();

        let first = apply_deviation(&totals, &stats);
        let second = apply_deviation(&totals, &stats);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.deviation, b.deviation);
            assert_eq!(a.deviation_pct, b.deviation_pct);
            assert_eq!(a.percentile, b.percentile);
        }
    }

    #[test]
    fn should_produce_non_finite_pct_for_zero_mean() {
        let totals = totals_fixture(&[0.0, 0.0]);
        let stats = describe(&totals, None, None).unwrap();
        let rows = apply_deviation(&totals_fixture(&[5.0]), &stats);

        assert!(!rows[0].deviation_pct.is_finite());
    }

    fn monthly_fixture() -> Vec<PeriodTotal> {
        let mut totals = Vec::new();
        for year in 2000..2004 {
            for month in 1..=12 {
                totals.push(PeriodTotal {
                    label: format!("{}-{:02}", year, month),
                    start_date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
                    rainfall: (month * 10) as f64 + (year - 2000) as f64,
                    rainfall_count: 30,
                    interpolated_count: 0,
                    quality_count: 0,
                });
            }
        }
        totals
    }

    #[test]
    fn should_describe_each_month_independently() {
        let monthly = monthly_fixture();
        let by_month = monthly_describe(&monthly, (2000, 1), (2003, 12)).unwrap();

        assert_eq!(by_month.len(), 12);
        // January sample is 10, 11, 12, 13
        let january = &by_month[&1];
        assert!((january.mean - 11.5).abs() < 1e-9);
        assert_eq!(january.min, 10.0);
        assert_eq!(january.max, 13.0);
        // December sample is 120..123
        assert!((by_month[&12].mean - 121.5).abs() < 1e-9);
    }

    #[test]
    fn should_fail_on_missing_monthly_boundary() {
        let monthly = monthly_fixture();

        assert!(matches!(
            monthly_describe(&monthly, (1990, 1), (2003, 12)),
            Err(AusrainError::PeriodNotFound(_))
        ));
        assert!(matches!(
            monthly_describe(&monthly, (2000, 1), (2010, 6)),
            Err(AusrainError::PeriodNotFound(_))
        ));
    }
}
