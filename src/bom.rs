//! Bureau of Meteorology access: the station directory listing and the
//! zipped daily rainfall data file.
//!
//! The directory lists every station for an observation code:
//!
//! <http://www.bom.gov.au/climate/data/lists_by_element/alphaAUS_136.txt>
//!
//! The daily data itself needs the long negative `p_c` dataset id published
//! in the station's weather-station-directory row:
//!
//! <http://www.bom.gov.au/jsp/ncc/cdio/weatherData/av?p_display_type=dailyZippedDataFile&p_stn_num=023343&p_nccObsCode=136&p_c=-108975703>

use indicatif::ProgressBar;
use tempfile::TempDir;

use crate::download::{download_file_with_progress, extract_zip_member, fetch_text};
use crate::error::Result;
use crate::reading::bom::{parse_daily_csv, parse_station_list, BomDay, Station};

/// Daily total rainfall.
pub const OBS_CODE_DAILY_RAINFALL: u32 = 136;

/// Observation codes with a published directory listing.
pub const OBS_CODES: [u32; 3] = [136, 122, 139];

pub fn obs_code_description(obs_code: u32) -> &'static str {
    match obs_code {
        136 => "Daily total rainfall",
        122 => "Daily max temp",
        139 => "Monthly total rainfall",
        _ => "Unknown",
    }
}

pub fn station_list_url(obs_code: u32) -> String {
    format!(
        "http://www.bom.gov.au/climate/data/lists_by_element/alphaAUS_{}.txt",
        obs_code
    )
}

pub fn daily_data_url(station: &str, p_c: i64) -> String {
    format!(
        "http://www.bom.gov.au/jsp/ncc/cdio/weatherData/av\
         ?p_display_type=dailyZippedDataFile&p_stn_num={}&p_nccObsCode={}&p_c={}",
        station, OBS_CODE_DAILY_RAINFALL, p_c
    )
}

/// Fetches the station directory for an observation code.
pub async fn fetch_station_list(obs_code: u32) -> Result<Vec<Station>> {
    let text = fetch_text(&station_list_url(obs_code)).await?;

    Ok(parse_station_list(&text, obs_code))
}

/// Downloads the zipped daily data file for a station and parses the CSV
/// member.
pub async fn fetch_daily_data(
    station: &str,
    p_c: i64,
    progress_bar: ProgressBar,
) -> Result<Vec<BomDay>> {
    let tmp_dir = TempDir::new()?;
    let archive_path = tmp_dir.path().join(format!("IDCJAC0009_{}.zip", station));

    let url = daily_data_url(station, p_c);
    download_file_with_progress(&url, archive_path.clone(), progress_bar).await?;

    let csv_text = extract_zip_member(&archive_path, "_Data.csv")?;
    parse_daily_csv(&csv_text)
}

// -- Tests -------------------------------------------------------------------
