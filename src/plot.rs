//! Price history charts.
//!
//! Prices are stored as display text. For plotting only, the first
//! numeric amount in that text is used (`"£1,299.99"` becomes 1299.99);
//! samples without one are left off the chart.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;
use tracing::{debug, info};

use crate::error::PlotError;
use crate::record::{PriceRecord, PriceTable};

/// One product's samples, oldest first, prices as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(NaiveDateTime, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotOutcome {
    NoMatches,
    NothingPlottable,
    Rendered { path: PathBuf, series: usize },
}

/// Rows whose name contains `term`, ignoring case, sorted by time.
pub fn select<'a>(table: &'a PriceTable, term: &str) -> Vec<&'a PriceRecord> {
    let needle = term.to_lowercase();
    let mut rows: Vec<_> = table
        .records()
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect();
    rows.sort_by_key(|record| record.timestamp);
    rows
}

/// Groups rows by exact name, in order of first appearance.
pub fn series(rows: &[&PriceRecord]) -> Vec<Series> {
    let mut grouped: Vec<Series> = Vec::new();
    for record in rows {
        let point = (record.timestamp, record.price.clone());
        match grouped.iter_mut().find(|s| s.name == record.name) {
            Some(series) => series.points.push(point),
            None => grouped.push(Series {
                name: record.name.clone(),
                points: vec![point],
            }),
        }
    }
    grouped
}

pub fn parse_amount(price: &str) -> Option<f64> {
    let start = price.find(|c: char| c.is_ascii_digit())?;
    let number: String = price[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();
    number.trim_end_matches('.').parse().ok()
}

pub fn plot(table: &PriceTable, term: &str, out: &Path) -> Result<PlotOutcome, PlotError> {
    let rows = select(table, term);
    if rows.is_empty() {
        info!("No data available for this item.");
        return Ok(PlotOutcome::NoMatches);
    }

    let lines: Vec<(String, Vec<(i64, f64)>)> = series(&rows)
        .into_iter()
        .filter_map(|s| {
            let points: Vec<_> = s
                .points
                .iter()
                .filter_map(|(ts, price)| match parse_amount(price) {
                    Some(amount) => Some((ts.and_utc().timestamp(), amount)),
                    None => {
                        debug!("no amount in price '{}' for {}", price, s.name);
                        None
                    }
                })
                .collect();
            (!points.is_empty()).then_some((s.name, points))
        })
        .collect();

    if lines.is_empty() {
        info!("No plottable prices for '{}'.", term);
        return Ok(PlotOutcome::NothingPlottable);
    }

    render(term, &lines, out)?;
    info!("Chart for '{}' written to {}", term, out.display());
    Ok(PlotOutcome::Rendered {
        path: out.to_path_buf(),
        series: lines.len(),
    })
}

fn bounds<T: Copy + PartialOrd>(values: impl Iterator<Item = T>) -> Option<(T, T)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((if v < lo { v } else { lo }, if v > hi { v } else { hi })),
    })
}

fn time_label(secs: &i64) -> String {
    DateTime::from_timestamp(*secs, 0)
        .map(|t| t.format("%d %b %H:%M").to_string())
        .unwrap_or_default()
}

fn render(term: &str, lines: &[(String, Vec<(i64, f64)>)], out: &Path) -> Result<(), PlotError> {
    let fail = |e: &dyn std::fmt::Display| PlotError::Render {
        path: out.to_path_buf(),
        reason: e.to_string(),
    };

    let all = || lines.iter().flat_map(|(_, points)| points.iter());
    let (x_min, x_max) = bounds(all().map(|p| p.0)).unwrap_or((0, 0));
    let (y_min, y_max) = bounds(all().map(|p| p.1)).unwrap_or((0.0, 0.0));
    let (x_min, x_max) = if x_min == x_max { (x_min - 1800, x_max + 1800) } else { (x_min, x_max) };
    let y_pad = if y_max > y_min { (y_max - y_min) * 0.05 } else { (y_max.abs() * 0.05).max(1.0) };

    let root = SVGBackend::new(out, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| fail(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Price Trend for '{}'", term), ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_min - y_pad)..(y_max + y_pad))
        .map_err(|e| fail(&e))?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Price (£)")
        .x_labels(8)
        .x_label_formatter(&time_label)
        .draw()
        .map_err(|e| fail(&e))?;

    for (idx, (name, points)) in lines.iter().enumerate() {
        let color = Palette99::pick(idx).mix(0.9);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)).point_size(3))
            .map_err(|e| fail(&e))?
            .label(name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| fail(&e))?;

    root.present().map_err(|e| fail(&e))?;
    Ok(())
}
