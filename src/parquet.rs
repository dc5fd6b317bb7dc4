//! Save the canonical daily table to a parquet file.

use std::{fs::File, path::PathBuf, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{Date32Builder, Float64Builder, Int32Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::reading::RainDay;

pub fn save_daily(days: &[RainDay], file_path: &PathBuf) -> Result<()> {
    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("rainfall", DataType::Float64, false),
        Field::new("interp_code", DataType::Int32, false),
        Field::new("quality", DataType::Int32, true),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::Int32, false),
        Field::new("dayofyear", DataType::Int32, false),
        Field::new("finyear", DataType::Utf8, false),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::default(),
        ))
        .set_dictionary_enabled(true)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let mut date_builder = Date32Builder::with_capacity(days.len());
    let mut rainfall_builder = Float64Builder::with_capacity(days.len());
    let mut interp_builder = Int32Builder::with_capacity(days.len());
    let mut quality_builder = Int32Builder::with_capacity(days.len());
    let mut year_builder = Int32Builder::with_capacity(days.len());
    let mut month_builder = Int32Builder::with_capacity(days.len());
    let mut dayofyear_builder = Int32Builder::with_capacity(days.len());
    let mut finyear_builder = StringBuilder::with_capacity(days.len(), days.len() * 7);

    let epoch_offset = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().num_days_from_ce();

    for day in days {
        date_builder.append_value(day.date.num_days_from_ce() - epoch_offset);
        rainfall_builder.append_value(day.rainfall);
        interp_builder.append_value(day.interp_code as i32);
        quality_builder.append_option(day.quality.map(|q| q as i32));
        year_builder.append_value(day.year);
        month_builder.append_value(day.month as i32);
        dayofyear_builder.append_value(day.dayofyear as i32);
        finyear_builder.append_value(&day.finyear);
    }

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(date_builder.finish()),
            Arc::new(rainfall_builder.finish()),
            Arc::new(interp_builder.finish()),
            Arc::new(quality_builder.finish()),
            Arc::new(year_builder.finish()),
            Arc::new(month_builder.finish()),
            Arc::new(dayofyear_builder.finish()),
            Arc::new(finyear_builder.finish()),
        ],
    )?;

    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    #[test]
    fn should_round_trip_daily_table() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("daily.parquet");
        let days = readings_fixture();

        save_daily(&days, &path).unwrap();

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();

        let mut total_rows = 0;
        for batch_result in reader {
            let batch = batch_result.unwrap();
            total_rows += batch.num_rows();

            let schema = batch.schema();
            assert_eq!(schema.fields().len(), 8);
            assert_eq!(schema.field(0).name(), "date");
            assert_eq!(schema.field(1).name(), "rainfall");
            assert_eq!(schema.field(7).name(), "finyear");

            // one quality value is null
            assert_eq!(batch.column(3).null_count(), 1);
        }
        assert_eq!(total_rows, 2);
    }

    fn readings_fixture() -> Vec<RainDay> {
        vec![
            RainDay::new(
                NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(),
                2.4,
                0,
                Some(1),
            ),
            RainDay::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 0.0, 25, None),
        ]
    }
}
