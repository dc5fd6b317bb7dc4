pub mod fetch;
pub mod stations;

use std::path::PathBuf;

use chrono::{Datelike, Local};
pub use fetch::fetch;
pub use stations::stations;

/// Output file name stamped with today's date, in the home directory.
pub fn make_output_file_name(station: &str, table: &str, extension: &str) -> PathBuf {
    let today = Local::now();
    let file_name = format!(
        "ausrain-{}-{}-{}-{:02}-{:02}.{}",
        station,
        table,
        today.year(),
        today.month(),
        today.day(),
        extension
    );

    dirs::home_dir().unwrap().join(file_name)
}
