//! SILO Patched Point Dataset access.
//!
//! Many BoM stations are served by SILO as a patched daily timeseries:
//!
//! <https://www.longpaddock.qld.gov.au/cgi-bin/silo/PatchedPointDataset.php?start=19950101&finish=20110110&station=023343&format=alldata&username=user@example.com>
//!
//! No account is needed, but a valid email address must be supplied.

use chrono::Local;

use crate::download::fetch_text;
use crate::error::Result;
use crate::reading::silo::{parse_alldata, SiloData};

const BASE_URL: &str = "https://www.longpaddock.qld.gov.au/cgi-bin/silo/PatchedPointDataset.php";

/// SILO's patched record starts in 1889.
pub const DEFAULT_START: &str = "18890101";

/// Builds the alldata request URL for a station and date window (YYYYMMDD).
pub fn alldata_url(station: &str, email: &str, start: &str, finish: &str) -> String {
    format!(
        "{}?start={}&finish={}&station={}&format=alldata&username={}",
        BASE_URL, start, finish, station, email
    )
}

/// Fetches and parses the alldata payload for a station. `start` and
/// `finish` are YYYYMMDD strings; they default to 1889-01-01 and today.
pub async fn fetch_alldata(
    station: &str,
    email: &str,
    start: Option<&str>,
    finish: Option<&str>,
) -> Result<SiloData> {
    let today = Local::now().format("%Y%m%d").to_string();
    let url = alldata_url(
        station,
        email,
        start.unwrap_or(DEFAULT_START),
        finish.unwrap_or(&today),
    );

    let text = fetch_text(&url).await?;
    parse_alldata(&text)
}

// -- Tests -------------------------------------------------------------------
