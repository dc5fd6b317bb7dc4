//! Parsing for Bureau of Meteorology payloads: the daily rainfall CSV
//! (product IDCJAC0009) and the fixed-width station directory listing.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AusrainError, Result};

/// One raw daily row from the BoM daily rainfall CSV. Rainfall may be blank
/// for days with no reading; `quality` is `Y` once the value has passed
/// quality control.
#[derive(Debug, Clone, Deserialize)]
pub struct BomDay {
    #[serde(rename = "Product code")]
    pub product: String,
    #[serde(rename = "Bureau of Meteorology station number")]
    pub station: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Rainfall amount (millimetres)")]
    pub rainfall: Option<f64>,
    #[serde(rename = "Period over which rainfall was measured (days)")]
    pub period: Option<u32>,
    #[serde(rename = "Quality")]
    pub quality: Option<String>,
}

impl BomDay {
    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            AusrainError::DateParse(format!("{}-{:02}-{:02}", self.year, self.month, self.day))
        })
    }

    /// Grade code for the canonical table: quality-controlled rows grade 1,
    /// anything else null.
    pub fn grade(&self) -> Option<u8> {
        match self.quality.as_deref().map(str::trim) {
            Some("Y") => Some(1),
            _ => None,
        }
    }
}

/// True if the payload looks like the BoM daily rainfall CSV.
pub fn looks_like_daily_csv(text: &str) -> bool {
    text.lines()
        .next()
        .map(|header| {
            header.contains("Bureau of Meteorology station number")
                && header.contains("Rainfall amount")
        })
        .unwrap_or(false)
}

/// Parse the daily rainfall CSV payload.
pub fn parse_daily_csv(text: &str) -> Result<Vec<BomDay>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut days = Vec::new();
    for row in reader.deserialize() {
        days.push(row?);
    }

    Ok(days)
}

/// One row of the BoM station directory (`alphaAUS_<obsCode>.txt`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Station {
    pub site: String,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub years: Option<f64>,
    pub percent: Option<u8>,
    pub aws: bool,
    pub obs_code: u32,
}

impl Station {
    /// Parse one fixed-width directory line. Column positions follow the
    /// published listing layout.
    pub fn from_line(line: &str, obs_code: u32) -> Result<Self> {
        let site = slice(line, 0, 8).to_string();
        if site.is_empty() || !site.chars().all(|c| c.is_ascii_digit()) {
            return Err(AusrainError::MalformedRow(line.to_string()));
        }

        Ok(Station {
            site,
            name: slice(line, 8, 49).to_string(),
            lat: parse_f64(slice(line, 49, 59)),
            lon: parse_f64(slice(line, 59, 68)),
            start: parse_month(slice(line, 68, 77)),
            end: parse_month(slice(line, 77, 86)),
            years: parse_f64(slice(line, 86, 93)),
            percent: slice(line, 93, 97).parse().ok(),
            aws: slice(line, 97, 102) == "Y",
            obs_code,
        })
    }
}

/// Parse the full directory listing, skipping the header and footer
/// furniture around the fixed-width table.
pub fn parse_station_list(text: &str, obs_code: u32) -> Vec<Station> {
    text.lines()
        .filter(|line| line.chars().next().map_or(false, |c| c.is_ascii_digit()))
        .filter_map(|line| Station::from_line(line, obs_code).ok())
        .collect()
}

fn slice(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line[start..end].trim()
}

fn parse_f64(s: &str) -> Option<f64> {
    s.parse().ok()
}

// Directory start/end columns hold a month like "Jan 1951"
fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01 {}", s), "%d %b %Y").ok()
}

// -- Tests -------------------------------------------------------------------
