//! Stats module - dataset summaries

mod calculator;

pub use calculator::{SeriesSummary, StatsCalculator};
