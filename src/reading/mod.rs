pub mod bom;
pub mod interpolation;
pub mod silo;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub use bom::{BomDay, Station};
pub use interpolation::Interpolation;
pub use silo::{SiloData, SiloDay};

use crate::calendar::financial_year;
use crate::error::{AusrainError, Result};

/// One canonical daily rainfall record. A day with no reading has no row;
/// dates are unique and ascending within a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainDay {
    pub date: NaiveDate,
    pub rainfall: f64,
    pub interp_code: u8,
    pub quality: Option<u8>,
    pub year: i32,
    pub month: u32,
    pub dayofyear: u32,
    pub finyear: String,
}

impl RainDay {
    pub fn new(date: NaiveDate, rainfall: f64, interp_code: u8, quality: Option<u8>) -> Self {
        RainDay {
            date,
            rainfall,
            interp_code,
            quality,
            year: date.year(),
            month: date.month(),
            dayofyear: date.ordinal(),
            finyear: financial_year(date),
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        Interpolation::from_code(self.interp_code)
    }

    pub fn is_observed(&self) -> bool {
        self.interp_code == 0
    }
}

/// Raw daily rows in one of the two supported source shapes.
#[derive(Debug, Clone)]
pub enum RawDaily {
    /// SILO Patched Point alldata rows: rainfall plus an interpolation code
    Silo(Vec<SiloDay>),
    /// BoM daily rainfall rows: every value is a station observation
    Bom(Vec<BomDay>),
}

impl RawDaily {
    /// Sniff the payload header and parse it as whichever source it matches.
    pub fn detect(text: &str) -> Result<RawDaily> {
        if silo::looks_like_alldata(text) {
            Ok(RawDaily::Silo(silo::parse_alldata(text)?.days))
        } else if bom::looks_like_daily_csv(text) {
            Ok(RawDaily::Bom(bom::parse_daily_csv(text)?))
        } else {
            Err(AusrainError::UnrecognizedSourceSchema)
        }
    }
}

/// Map raw source rows into the canonical daily table.
///
/// BoM rows carry no interpolation metadata, so every row normalizes as
/// observed (code 0); rows with a blank rainfall cell become missing days.
/// With `clip_ends`, rows before the first and after the last observed row
/// are discarded, leaving interpolated days only between real observations.
pub fn normalise(raw: RawDaily, clip_ends: bool) -> Result<Vec<RainDay>> {
    let mut days: Vec<RainDay> = match raw {
        RawDaily::Silo(rows) => rows
            .into_iter()
            .map(|row| RainDay::new(row.date, row.rain, row.srn, None))
            .collect(),
        RawDaily::Bom(rows) => rows
            .into_iter()
            .filter(|row| row.rainfall.is_some())
            .map(|row| {
                let date = row.date()?;
                Ok(RainDay::new(date, row.rainfall.unwrap_or(0.0), 0, row.grade()))
            })
            .collect::<Result<Vec<_>>>()?,
    };

    days.sort_by_key(|day| day.date);
    days.dedup_by_key(|day| day.date);

    if clip_ends {
        days = clip_to_observed(days)?;
    }

    Ok(days)
}

fn clip_to_observed(days: Vec<RainDay>) -> Result<Vec<RainDay>> {
    let first = days
        .iter()
        .position(RainDay::is_observed)
        .ok_or(AusrainError::NoObservedData)?;
    let last = days.iter().rposition(RainDay::is_observed).unwrap_or(first);

    Ok(days[first..=last].to_vec())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn silo_day(year: i32, month: u32, day: u32, rain: f64, srn: u8) -> SiloDay {
        SiloDay {
            date: date(year, month, day),
            rain,
            srn,
        }
    }

    fn bom_day(day: u32, rainfall: Option<f64>, quality: &str) -> BomDay {
        BomDay {
            product: "IDCJAC0009".to_string(),
            station: "023343".to_string(),
            year: 2020,
            month: 1,
            day,
            rainfall,
            period: rainfall.map(|_| 1),
            quality: if quality.is_empty() {
                None
            } else {
                Some(quality.to_string())
            },
        }
    }

    #[test]
    fn should_derive_columns() {
        let day = RainDay::new(date(2016, 5, 3), 1.2, 25, None);

        assert_eq!(day.year, 2016);
        assert_eq!(day.month, 5);
        assert_eq!(day.dayofyear, 124);
        assert_eq!(day.finyear, "2015-16");
        assert_eq!(day.interpolation().label(), "interpolated");
    }

    #[test]
    fn should_normalise_bom_rows_as_observed() {
        let raw = RawDaily::Bom(vec![
            bom_day(1, Some(0.0), "Y"),
            bom_day(2, Some(4.2), "Y"),
            bom_day(3, None, ""),
            bom_day(4, Some(1.6), "N"),
        ]);
        let days = normalise(raw, false).unwrap();

        // the blank day produced no row
        assert_eq!(days.len(), 3);
        for day in &days {
            assert_eq!(day.interp_code, 0);
            assert_eq!(day.interpolation().label(), "observed");
        }
        assert_eq!(days[0].quality, Some(1));
        assert_eq!(days[2].quality, None);
    }

    #[test]
    fn should_sort_and_dedupe_dates() {
        let raw = RawDaily::Silo(vec![
            silo_day(2020, 1, 3, 1.0, 0),
            silo_day(2020, 1, 1, 2.0, 0),
            silo_day(2020, 1, 1, 9.0, 0),
        ]);
        let days = normalise(raw, false).unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(2020, 1, 1));
        assert_eq!(days[0].rainfall, 2.0);
        assert_eq!(days[1].date, date(2020, 1, 3));
    }

    #[test]
    fn should_clip_leading_and_trailing_interpolation() {
        let raw = RawDaily::Silo(vec![
            silo_day(2020, 1, 1, 1.0, 25),
            silo_day(2020, 1, 2, 2.0, 0),
            silo_day(2020, 1, 3, 3.0, 75),
            silo_day(2020, 1, 4, 4.0, 0),
            silo_day(2020, 1, 5, 5.0, 35),
        ]);
        let days = normalise(raw, true).unwrap();

        assert_eq!(days.first().unwrap().date, date(2020, 1, 2));
        assert_eq!(days.last().unwrap().date, date(2020, 1, 4));
        // the interpolated day between observations survives
        assert_eq!(days.len(), 3);
        assert_eq!(days[1].interp_code, 75);
    }

    #[test]
    fn should_fail_clipping_without_observed_rows() {
        let raw = RawDaily::Silo(vec![
            silo_day(2020, 1, 1, 1.0, 25),
            silo_day(2020, 1, 2, 2.0, 35),
        ]);

        assert!(matches!(
            normalise(raw, true),
            Err(AusrainError::NoObservedData)
        ));
    }

    #[test]
    fn should_reject_unrecognized_payload() {
        assert!(matches!(
            RawDaily::detect("this is not a rainfall table"),
            Err(AusrainError::UnrecognizedSourceSchema)
        ));
    }

    #[test]
    fn should_detect_both_sources() {
        let silo_text = "Date Rain Srn\n() () ()\n20200101 0.5 0\n";
        assert!(matches!(
            RawDaily::detect(silo_text),
            Ok(RawDaily::Silo(_))
        ));

        let bom_text = "Product code,Bureau of Meteorology station number,Year,Month,Day,Rainfall amount (millimetres),Period over which rainfall was measured (days),Quality\nIDCJAC0009,023343,2020,1,1,0.0,1,Y\n";
        assert!(matches!(RawDaily::detect(bom_text), Ok(RawDaily::Bom(_))));
    }
}
