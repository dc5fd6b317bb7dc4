//! Annual rainfall chart: rainfall bars with a mean line, over a lower
//! panel showing how much of each year was infilled.

use std::path::Path;

use chrono::Datelike;
use plotters::prelude::*;

use crate::aggregate::{PeriodTotal, SrnYear};
use crate::error::{AusrainError, Result};

const RAINFALL_COLOUR: RGBColor = RGBColor(0, 176, 240);
const INTERPOLATED_COLOUR: RGBColor = RGBColor(210, 180, 140);
const DEACCUMULATED_COLOUR: RGBColor = RGBColor(255, 228, 225);

pub fn plot_annual_rainfall(
    annual: &[PeriodTotal],
    srn: &[SrnYear],
    mean: f64,
    title: &str,
    path: &Path,
) -> Result<()> {
    if annual.is_empty() {
        return Err(AusrainError::Chart("no annual totals to plot".to_string()));
    }

    let first_year = annual.first().unwrap().start_date.year();
    let last_year = annual.last().unwrap().start_date.year();
    let x_range = first_year..(last_year + 1);
    let y_max = annual
        .iter()
        .map(|total| total.rainfall)
        .fold(mean, f64::max)
        * 1.1;

    let root = BitMapBackend::new(path, (1080, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let (upper, lower) = root.split_vertically(360);

    let mut rainfall_chart = ChartBuilder::on(&upper)
        .caption(title, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(0)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), 0f64..y_max)
        .map_err(chart_err)?;
    rainfall_chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Annual rainfall (mm)")
        .draw()
        .map_err(chart_err)?;
    rainfall_chart
        .draw_series(annual.iter().map(|total| {
            let year = total.start_date.year();
            Rectangle::new(
                [(year, 0.0), (year + 1, total.rainfall)],
                RAINFALL_COLOUR.filled(),
            )
        }))
        .map_err(chart_err)?
        .label("Annual rainfall")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], RAINFALL_COLOUR.filled()));
    rainfall_chart
        .draw_series(LineSeries::new(
            vec![(first_year, mean), (last_year + 1, mean)],
            BLACK.stroke_width(1),
        ))
        .map_err(chart_err)?
        .label("Mean annual rainfall")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], &BLACK));
    rainfall_chart
        .configure_series_labels()
        .border_style(&TRANSPARENT)
        .draw()
        .map_err(chart_err)?;

    let mut srn_chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(25)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0f64..100f64)
        .map_err(chart_err)?;
    srn_chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("% of year")
        .draw()
        .map_err(chart_err)?;
    // stacked: interpolated at the bottom, deaccumulated on top
    srn_chart
        .draw_series(srn.iter().map(|year| {
            Rectangle::new(
                [(year.year, 0.0), (year.year + 1, year.interpolated_pct)],
                INTERPOLATED_COLOUR.filled(),
            )
        }))
        .map_err(chart_err)?;
    srn_chart
        .draw_series(srn.iter().map(|year| {
            Rectangle::new(
                [
                    (year.year, year.interpolated_pct),
                    (
                        year.year + 1,
                        year.interpolated_pct + year.deaccumulated_pct,
                    ),
                ],
                DEACCUMULATED_COLOUR.filled(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;

    Ok(())
}

fn chart_err<E: std::fmt::Display>(e: E) -> AusrainError {
    AusrainError::Chart(e.to_string())
}

// -- Tests -------------------------------------------------------------------
