//! CSV serialization of the output tables.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Writes any serializable run of rows as a headed CSV file.
pub fn write_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------
