//! Parsing for the SILO Patched Point "alldata" payload.
//!
//! The payload is a whitespace-delimited table preceded and followed by
//! comment lines starting with `"`. The comment block carries station
//! metadata; the row after the header carries units and is skipped.

use chrono::NaiveDate;

use crate::error::{AusrainError, Result};

/// One raw daily row from SILO: observation date, rainfall in mm, and the
/// `Srn` source code describing how the rainfall value was derived.
#[derive(Debug, Clone, PartialEq)]
pub struct SiloDay {
    pub date: NaiveDate,
    pub rain: f64,
    pub srn: u8,
}

/// The split payload: free-text comment block plus parsed daily rows.
#[derive(Debug, Clone)]
pub struct SiloData {
    pub comments: String,
    pub days: Vec<SiloDay>,
}

/// True if the payload looks like an alldata table (header row naming the
/// Date, Rain and Srn columns).
pub fn looks_like_alldata(text: &str) -> bool {
    header_line(text)
        .map(|header| {
            let cols: Vec<&str> = header.split_whitespace().collect();
            cols.contains(&"Date") && cols.contains(&"Rain") && cols.contains(&"Srn")
        })
        .unwrap_or(false)
}

/// Parse an alldata payload into its comment block and daily rows.
pub fn parse_alldata(text: &str) -> Result<SiloData> {
    let comments: Vec<&str> = text
        .lines()
        .filter(|line| line.trim_start().starts_with('"'))
        .collect();

    let header = header_line(text).ok_or(AusrainError::UnrecognizedSourceSchema)?;
    let columns: Vec<&str> = header.split_whitespace().collect();
    let date_idx = column_index(&columns, "Date")?;
    let rain_idx = column_index(&columns, "Rain")?;
    let srn_idx = column_index(&columns, "Srn")?;

    let mut days = Vec::new();
    let data_lines = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('"')
        })
        .skip(2); // header row, then the units row

    for line in data_lines {
        days.push(day_from_line(line, date_idx, rain_idx, srn_idx)?);
    }

    Ok(SiloData {
        comments: comments.join("\n"),
        days,
    })
}

/// Pull the station display name and a report title out of the comment
/// block. SILO writes a line like
/// `"Patched Point data for station: 23343 ADELAIDE (WEST TERRACE):  Lat: ..."`;
/// absence of that line is not an error.
pub fn station_title(comments: &str, station: &str) -> Option<(String, String)> {
    for line in comments.lines() {
        if !line.contains("Patched Point data for station") {
            continue;
        }
        let after_colon = line.splitn(2, ':').nth(1)?;
        let title = after_colon
            .split("Lat")
            .next()
            .unwrap_or(after_colon)
            .trim()
            .trim_end_matches(':')
            .trim_matches('"')
            .trim()
            .to_string();
        let name = title.replace(station, "").trim().to_string();
        return Some((title, name));
    }
    None
}

fn header_line(text: &str) -> Option<&str> {
    text.lines().find(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('"')
    })
}

fn column_index(columns: &[&str], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| *c == name)
        .ok_or(AusrainError::UnrecognizedSourceSchema)
}

fn day_from_line(line: &str, date_idx: usize, rain_idx: usize, srn_idx: usize) -> Result<SiloDay> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let field = |idx: usize| -> Result<&str> {
        fields
            .get(idx)
            .copied()
            .ok_or_else(|| AusrainError::MalformedRow(line.to_string()))
    };

    let date = NaiveDate::parse_from_str(field(date_idx)?, "%Y%m%d")
        .map_err(|_| AusrainError::DateParse(field(date_idx).unwrap_or("").to_string()))?;
    let rain: f64 = field(rain_idx)?
        .parse()
        .map_err(|_| AusrainError::MalformedRow(line.to_string()))?;
    let srn: u8 = field(srn_idx)?
        .parse()
        .map_err(|_| AusrainError::MalformedRow(line.to_string()))?;

    Ok(SiloDay { date, rain, srn })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    const PAYLOAD: &str = r#""Patched Point data for station: 23343 ADELAIDE (WEST TERRACE):  Lat: -34.93 Long: 138.59"
"Elevation:  29m. Data extracted on 20200102."
Date Day Date2 T.Max Smx T.Min Smn Rain Srn Evap Sev
(yyyymmdd) () (yyyy-mm-dd) (oC) () (oC) () (mm) () (mm) ()
20200101 1 2020-01-01 30.1 0 15.2 0 0.0 0 8.4 0
20200102 2 2020-01-02 31.5 0 16.0 0 4.2 25 7.9 0
20200103 3 2020-01-03 28.9 0 14.1 0 0.8 0 8.1 0
"Data are supplied subject to the conditions of use."
"#;

    #[test]
    fn should_recognize_alldata_payload() {
        assert!(looks_like_alldata(PAYLOAD));
        assert!(!looks_like_alldata("Year,Month,Day,Rainfall\n2020,1,1,0.0"));
    }

    #[test]
    fn should_parse_rows() {
        let data = parse_alldata(PAYLOAD).unwrap();

        assert_eq!(data.days.len(), 3);
        assert_eq!(
            data.days[0].date,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
        assert_eq!(data.days[0].rain, 0.0);
        assert_eq!(data.days[0].srn, 0);
        assert_eq!(data.days[1].rain, 4.2);
        assert_eq!(data.days[1].srn, 25);
    }

    #[test]
    fn should_collect_comment_block() {
        let data = parse_alldata(PAYLOAD).unwrap();

        assert_eq!(data.comments.lines().count(), 3);
        assert!(data.comments.contains("Patched Point data for station"));
        assert!(data.comments.contains("conditions of use"));
    }

    #[test]
    fn should_extract_station_title_and_name() {
        let data = parse_alldata(PAYLOAD).unwrap();
        let (title, name) = station_title(&data.comments, "23343").unwrap();

        assert_eq!(title, "23343 ADELAIDE (WEST TERRACE)");
        assert_eq!(name, "ADELAIDE (WEST TERRACE)");
    }

    #[test]
    fn should_return_none_without_station_comment() {
        assert!(station_title("\"some other comment\"", "23343").is_none());
    }

    #[test]
    fn should_reject_payload_without_rain_column() {
        let text = "Date Day T.Max\n() () ()\n20200101 1 30.1\n";
        assert!(matches!(
            parse_alldata(text),
            Err(AusrainError::UnrecognizedSourceSchema)
        ));
    }

    #[test]
    fn should_reject_malformed_row() {
        let text = "Date Rain Srn\n() () ()\n20200101 not-a-number 0\n";
        assert!(matches!(
            parse_alldata(text),
            Err(AusrainError::MalformedRow(_))
        ));
    }
}
