use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::{
    aggregate::{srn_breakdown, PeriodTotal, StationData},
    bom,
    calendar::YearType,
    chart::plot_annual_rainfall,
    cli::{create_spinner, FetchArgs, Source},
    db::{default_db_path, Database},
    export::write_csv,
    parquet,
    reading::{self, silo::station_title, RawDaily, Station},
    silo,
    stats::{apply_deviation, describe, monthly_describe, SummaryStats},
};

use super::make_output_file_name;

pub async fn fetch(args: &FetchArgs) -> Result<String> {
    let year_type: YearType = args.year_type.parse()?;
    let cached_station = lookup_cached_station(args);

    let mut data = match args.source {
        Source::Silo => fetch_from_silo(args, cached_station.as_ref()).await?,
        Source::Bom => fetch_from_bom(args, cached_station.as_ref()).await?,
    };
    data.complete_years_only = args.complete_years_only;

    if data.days.is_empty() {
        return Err(anyhow!(
            "no daily rows returned for station {}",
            args.station
        ));
    }

    print_report(&data, year_type)?;

    let totals = match year_type {
        YearType::Calendar => data.annual()?,
        YearType::Financial => data.financial()?,
    };
    let stats = describe(
        &totals,
        args.baseline_start.as_deref(),
        args.baseline_end.as_deref(),
    )?;
    let deviation = apply_deviation(&totals, &stats);
    let monthly = data.monthly();

    print_stats(&stats);

    let annual_table = match year_type {
        YearType::Calendar => "annual",
        YearType::Financial => "financial",
    };
    let daily_path = make_output_file_name(&data.station, "daily", "csv");
    write_csv(&data.days, &daily_path)?;
    write_csv(&totals, &make_output_file_name(&data.station, annual_table, "csv"))?;
    write_csv(&monthly, &make_output_file_name(&data.station, "monthly", "csv"))?;
    write_csv(
        &deviation,
        &make_output_file_name(&data.station, "deviation", "csv"),
    )?;
    write_csv(
        &monthly_stats_rows(&monthly)?,
        &make_output_file_name(&data.station, "monthly-stats", "csv"),
    )?;

    if args.parquet {
        let parquet_path = make_output_file_name(&data.station, "daily", "parquet");
        parquet::save_daily(&data.days, &parquet_path)?;
        println!("Daily table saved to `{}`", parquet_path.display());
    }

    if args.chart {
        // the chart is always drawn over calendar years
        let chart_totals = data.annual()?;
        let chart_stats = describe(&chart_totals, None, None)?;
        let chart_path = make_output_file_name(&data.station, "annual", "png");
        plot_annual_rainfall(
            &chart_totals,
            &srn_breakdown(&data.days),
            chart_stats.mean,
            &data.title,
            &chart_path,
        )?;
        println!("Chart saved to `{}`", chart_path.display());
    }

    Ok(daily_path.to_string_lossy().to_string())
}

fn lookup_cached_station(args: &FetchArgs) -> Option<Station> {
    let db_path = args.db.clone().unwrap_or_else(default_db_path);
    let site = format!("{:0>6}", args.station);

    Database::open(&db_path)
        .ok()
        .and_then(|db| db.find_station(&site).ok().flatten())
}

async fn fetch_from_silo(args: &FetchArgs, cached: Option<&Station>) -> Result<StationData> {
    let email = args
        .email
        .as_deref()
        .ok_or_else(|| anyhow!("--email is required for the SILO source"))?;

    // the directory's first-month column resolves the default start
    let directory_start = cached
        .and_then(|station| station.start)
        .map(|date| date.format("%Y%m%d").to_string());
    let start = args.start.clone().or(directory_start);

    let bar = create_spinner(format!(
        "Fetching SILO daily data for station {}...",
        args.station
    ));
    let silo_data = silo::fetch_alldata(
        &args.station,
        email,
        start.as_deref(),
        args.finish.as_deref(),
    )
    .await?;
    bar.finish_with_message("SILO daily data downloaded");

    let (title, name) = station_title(&silo_data.comments, &args.station)
        .unwrap_or_else(|| (args.station.clone(), String::new()));
    let title = format!(
        "{} (fetched from SILO on {})",
        title,
        Local::now().format("%Y-%m-%d")
    );

    let days = reading::normalise(RawDaily::Silo(silo_data.days), args.clip_ends)?;

    Ok(StationData::new(args.station.clone(), name, title, days))
}

async fn fetch_from_bom(args: &FetchArgs, cached: Option<&Station>) -> Result<StationData> {
    let p_c = args
        .pc
        .ok_or_else(|| anyhow!("--pc (the BoM dataset id) is required for the BoM source"))?;

    let bar = create_spinner(format!(
        "Downloading BoM daily archive for station {}...",
        args.station
    ));
    let rows = bom::fetch_daily_data(&args.station, p_c, bar.clone()).await?;
    bar.finish_with_message("BoM daily archive downloaded");

    let mut days = reading::normalise(RawDaily::Bom(rows), args.clip_ends)?;

    // the archive holds the whole record; apply the query window here
    if let Some(start) = parse_window_date(args.start.as_deref())? {
        days.retain(|day| day.date >= start);
    }
    if let Some(finish) = parse_window_date(args.finish.as_deref())? {
        days.retain(|day| day.date <= finish);
    }

    let name = cached.map(|station| station.name.clone()).unwrap_or_default();
    let title = format!(
        "{} {} (fetched from BoM on {})",
        args.station,
        name,
        Local::now().format("%Y-%m-%d")
    );

    Ok(StationData::new(args.station.clone(), name, title, days))
}

/// Statistics per calendar month over the station's full monthly record.
#[derive(Serialize)]
struct MonthlyStatsRow {
    month: u32,
    mean: f64,
    median: f64,
    min: f64,
    max: f64,
    pct5: f64,
    pct25: f64,
    pct75: f64,
    pct95: f64,
}

fn monthly_stats_rows(monthly: &[PeriodTotal]) -> Result<Vec<MonthlyStatsRow>> {
    let (first, last) = match (monthly.first(), monthly.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(Vec::new()),
    };
    let start = (first.start_date.year(), first.start_date.month());
    let end = (last.start_date.year(), last.start_date.month());

    let by_month = monthly_describe(monthly, start, end)?;
    Ok(by_month
        .into_iter()
        .map(|(month, stats)| MonthlyStatsRow {
            month,
            mean: stats.mean,
            median: stats.median,
            min: stats.min,
            max: stats.max,
            pct5: stats.pct5,
            pct25: stats.pct25,
            pct75: stats.pct75,
            pct95: stats.pct95,
        })
        .collect())
}

fn parse_window_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(Some)
            .map_err(|_| anyhow!("expected YYYYMMDD, got `{}`", s)),
    }
}

fn print_report(data: &StationData, year_type: YearType) -> Result<()> {
    println!(
        "station #: {} name: {} title: {}",
        data.station, data.name, data.title
    );
    println!(
        "{} daily rows from {} to {}",
        data.days.len(),
        data.days.first().unwrap().date,
        data.days.last().unwrap().date
    );

    let mut infill: BTreeMap<&'static str, u32> = BTreeMap::new();
    for day in &data.days {
        if !day.is_observed() {
            *infill.entry(day.interpolation().label()).or_default() += 1;
        }
    }
    if !infill.is_empty() {
        let parts: Vec<String> = infill
            .iter()
            .map(|(label, count)| format!("{} {}", count, label))
            .collect();
        println!("infilled days: {}", parts.join(", "));
    }

    let missing = data.missing_days(year_type)?;
    let incomplete = missing.values().filter(|count| **count > 0).count();
    println!(
        "{} of {} periods have missing days{}",
        incomplete,
        missing.len(),
        if data.complete_years_only {
            " (dropped from the annual tables)"
        } else {
            ""
        }
    );

    Ok(())
}

fn print_stats(stats: &SummaryStats) {
    println!(
        "annual rainfall: mean {:.1} mm, median {:.1} mm, range {:.1}-{:.1} mm",
        stats.mean, stats.median, stats.min, stats.max
    );
    println!(
        "percentiles: 5% {:.1}  25% {:.1}  75% {:.1}  95% {:.1}",
        stats.pct5, stats.pct25, stats.pct75, stats.pct95
    );
}
