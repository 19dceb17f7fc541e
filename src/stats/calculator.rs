//! Statistics Calculator Module
//! Per-series descriptive statistics over the loaded table.

use crate::data::{parse_population, SeriesKind, Table};
use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::{Data, Median};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Descriptive statistics for one population column.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub kind: SeriesKind,
    /// Cells that parsed as numbers.
    pub count: usize,
    /// Cells that did not.
    pub invalid: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Region holding `max`.
    pub largest_region: Option<String>,
}

impl SeriesSummary {
    fn empty(kind: SeriesKind, invalid: usize) -> Self {
        Self {
            kind,
            count: 0,
            invalid,
            sum: 0.0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            largest_region: None,
        }
    }
}

/// Handles summary calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Build a frame with the region column and one nullable Float64 column per series.
    pub fn to_dataframe(table: &Table) -> Result<DataFrame, SummaryError> {
        let regions: Vec<String> = table.region_names().map(str::to_string).collect();
        let mut columns = vec![Column::new("region".into(), regions)];

        for kind in SeriesKind::ALL {
            let values: Vec<Option<f64>> = table
                .rows()
                .iter()
                .map(|row| parse_population(row.value(kind)))
                .collect();
            columns.push(Column::new(kind.column_name().into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Summarise one series column of a frame built by [`Self::to_dataframe`].
    pub fn summarize_column(
        df: &DataFrame,
        kind: SeriesKind,
    ) -> Result<SeriesSummary, SummaryError> {
        let column = df.column(kind.column_name())?;
        let value_ca = column.f64()?;
        let invalid = value_ca.null_count();

        let values: Vec<f64> = value_ca.into_iter().flatten().collect();
        if values.is_empty() {
            return Ok(SeriesSummary::empty(kind, invalid));
        }

        let regions = df.column("region")?;
        let region_ca = regions.str()?;
        let largest_region = value_ca
            .into_iter()
            .zip(region_ca.into_iter())
            .filter_map(|(v, r)| Some((v?, r?)))
            .fold(None::<(f64, &str)>, |best, (v, r)| match best {
                Some((b, _)) if b >= v => best,
                _ => Some((v, r)),
            })
            .map(|(_, r)| r.to_string());

        let std = if values.len() > 1 {
            statrs::statistics::Statistics::std_dev(&values)
        } else {
            0.0
        };

        Ok(SeriesSummary {
            kind,
            count: values.len(),
            invalid,
            sum: value_ca.sum().unwrap_or(0.0),
            mean: statrs::statistics::Statistics::mean(&values),
            median: Data::new(values.clone()).median(),
            std,
            min: value_ca.min().unwrap_or(f64::NAN),
            max: value_ca.max().unwrap_or(f64::NAN),
            largest_region,
        })
    }

    /// Compute summaries for all series in parallel, in canonical series order.
    pub fn compute_all_parallel(table: &Table) -> Result<Vec<SeriesSummary>, SummaryError> {
        let df = Self::to_dataframe(table)?;
        SeriesKind::ALL
            .par_iter()
            .map(|kind| Self::summarize_column(&df, *kind))
            .collect()
    }
}
