//! Data Processor Module
//! Projects the table and the current selection into chart and table view models.

use crate::data::loader::{Row, Table};
use crate::data::selection::{RegionSelection, SelectionState, SeriesVisibility};
use crate::data::series::{parse_population, ColorStyle, SeriesKind};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Selected region '{0}' is not in the loaded table")]
    UnknownRegion(String),
}

/// One plotted series. `styles` is aligned with `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub styles: Vec<ColorStyle>,
}

impl ChartSeries {
    fn uniform(kind: SeriesKind, values: Vec<f64>) -> Self {
        Self {
            name: kind.label().to_string(),
            styles: vec![kind.style(); values.len()],
            values,
        }
    }

    /// Style shown in the legend.
    pub fn legend_style(&self) -> Option<ColorStyle> {
        self.styles.first().copied()
    }
}

/// Labels plus series, ready for a bar chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartViewModel {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartViewModel {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.is_empty()
    }

    /// Largest plotted value, 0 for an empty chart.
    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Column titles plus the rows to show in the data table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableViewModel {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

/// A cell that could not be read as a number. The row stays in the table view
/// and is left out of the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericFieldIssue {
    pub row: usize,
    pub region: String,
    pub field: SeriesKind,
    pub value: String,
}

impl fmt::Display for NumericFieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid numeric field: row {} ({}), {} = '{}'",
            self.row, self.region, self.field, self.value
        )
    }
}

/// Everything derived for one (table, selection) pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub chart: ChartViewModel,
    pub table: TableViewModel,
    pub issues: Vec<NumericFieldIssue>,
}

/// Stateless builder for dashboard views.
pub struct DataProcessor;

impl DataProcessor {
    /// Build the chart and table views for the current selection.
    pub fn build(table: &Table, state: &SelectionState) -> Result<DashboardView, ViewError> {
        match state.region() {
            RegionSelection::AllRegions => {
                Ok(Self::build_all_regions(table, state.visible_series()))
            }
            RegionSelection::SingleRegion(region) => {
                Self::build_single_region(table, region, state.visible_series())
            }
        }
    }

    /// One series per visible column across every region.
    /// Rows with an unreadable visible cell are dropped from the chart so
    /// that every series stays aligned with the labels.
    fn build_all_regions(table: &Table, visible: &SeriesVisibility) -> DashboardView {
        let kinds: Vec<SeriesKind> = visible.iter().collect();
        let mut labels: Vec<String> = Vec::with_capacity(table.row_count());
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(table.row_count()); kinds.len()];
        let mut issues: Vec<NumericFieldIssue> = Vec::new();

        for (i, row) in table.rows().iter().enumerate() {
            let parsed: Vec<Option<f64>> = kinds
                .iter()
                .map(|kind| parse_population(row.value(*kind)))
                .collect();

            let mut complete = true;
            for (kind, value) in kinds.iter().zip(&parsed) {
                if value.is_none() {
                    issues.push(Self::issue(i, row, *kind));
                    complete = false;
                }
            }
            if !complete {
                continue;
            }

            labels.push(row.region.clone());
            for (column, value) in columns.iter_mut().zip(parsed) {
                column.extend(value);
            }
        }

        let series = kinds
            .into_iter()
            .zip(columns)
            .map(|(kind, values)| ChartSeries::uniform(kind, values))
            .collect();

        DashboardView {
            chart: ChartViewModel { labels, series },
            table: TableViewModel {
                header: table.header().to_vec(),
                rows: table.rows().to_vec(),
            },
            issues,
        }
    }

    /// A single series named after the region, one bar per visible category.
    fn build_single_region(
        table: &Table,
        region: &str,
        visible: &SeriesVisibility,
    ) -> Result<DashboardView, ViewError> {
        let index = table
            .position(region)
            .ok_or_else(|| ViewError::UnknownRegion(region.to_string()))?;
        let row = &table.rows()[index];

        let mut labels = Vec::new();
        let mut values = Vec::new();
        let mut styles = Vec::new();
        let mut issues = Vec::new();

        for kind in visible.iter() {
            match parse_population(row.value(kind)) {
                Some(value) => {
                    labels.push(kind.label().to_string());
                    values.push(value);
                    styles.push(kind.style());
                }
                None => issues.push(Self::issue(index, row, kind)),
            }
        }

        Ok(DashboardView {
            chart: ChartViewModel {
                labels,
                series: vec![ChartSeries {
                    name: row.region.clone(),
                    values,
                    styles,
                }],
            },
            table: TableViewModel {
                header: table.header().to_vec(),
                rows: vec![row.clone()],
            },
            issues,
        })
    }

    fn issue(index: usize, row: &Row, field: SeriesKind) -> NumericFieldIssue {
        NumericFieldIssue {
            row: index,
            region: row.region.clone(),
            field,
            value: row.value(field).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "region,total,male,female\nAstana,500,240,260\nAlmaty,700,340,360\n";

    fn table() -> Table {
        Table::parse(SAMPLE).unwrap()
    }

    fn values(view: &DashboardView, name: &str) -> Vec<f64> {
        view.chart
            .series
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.values.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_all_regions_view() {
        let view = DataProcessor::build(&table(), &SelectionState::new()).unwrap();

        assert_eq!(view.chart.labels, ["Astana", "Almaty"]);
        let names: Vec<&str> = view.chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Total", "Male", "Female"]);
        assert_eq!(values(&view, "Total"), [500.0, 700.0]);
        assert_eq!(values(&view, "Male"), [240.0, 340.0]);
        assert_eq!(values(&view, "Female"), [260.0, 360.0]);
        assert_eq!(view.table.header, ["region", "total", "male", "female"]);
        assert_eq!(view.table.rows.len(), 2);
        assert!(view.issues.is_empty());
    }

    #[test]
    fn test_all_regions_lengths_match() {
        let raw = "region,total,male,female\nA,1,1,0\nB,2,1,1\nC,3,2,1\nD,4,2,2\n";
        let table = Table::parse(raw).unwrap();
        let view = DataProcessor::build(&table, &SelectionState::new()).unwrap();
        assert_eq!(view.chart.labels.len(), table.row_count());
        for series in &view.chart.series {
            assert_eq!(series.values.len(), view.chart.labels.len());
            assert_eq!(series.styles.len(), series.values.len());
        }
    }

    #[test]
    fn test_hidden_series_are_omitted() {
        let mut state = SelectionState::new();
        state.toggle_series(SeriesKind::Male).unwrap();

        let view = DataProcessor::build(&table(), &state).unwrap();
        let names: Vec<&str> = view.chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Total", "Female"]);
    }

    #[test]
    fn test_colors_follow_series_identity() {
        let mut state = SelectionState::new();
        state.toggle_series(SeriesKind::Total).unwrap();

        let view = DataProcessor::build(&table(), &state).unwrap();
        assert_eq!(
            view.chart.series[0].legend_style(),
            Some(SeriesKind::Male.style())
        );
        assert_eq!(
            view.chart.series[1].legend_style(),
            Some(SeriesKind::Female.style())
        );
    }

    #[test]
    fn test_single_region_view() {
        let table = table();
        let mut state = SelectionState::new();
        state.select_region(&table, "Almaty").unwrap();

        let view = DataProcessor::build(&table, &state).unwrap();
        assert_eq!(view.chart.labels, ["Total", "Male", "Female"]);
        assert_eq!(view.chart.series.len(), 1);
        assert_eq!(view.chart.series[0].name, "Almaty");
        assert_eq!(view.chart.series[0].values, [700.0, 340.0, 360.0]);
        assert_eq!(
            view.chart.series[0].styles,
            [
                SeriesKind::Total.style(),
                SeriesKind::Male.style(),
                SeriesKind::Female.style()
            ]
        );
        assert_eq!(view.table.rows, [Row::new("Almaty", "700", "340", "360")]);
        assert_eq!(view.table.header, table.header());
    }

    #[test]
    fn test_single_region_drops_hidden_label_and_value() {
        let table = table();
        let mut state = SelectionState::new();
        state.select_region(&table, "Astana").unwrap();
        state.toggle_series(SeriesKind::Male).unwrap();

        let view = DataProcessor::build(&table, &state).unwrap();
        assert_eq!(view.chart.labels, ["Total", "Female"]);
        assert_eq!(view.chart.series[0].values, [500.0, 260.0]);
        assert_eq!(
            view.chart.series[0].styles,
            [SeriesKind::Total.style(), SeriesKind::Female.style()]
        );
    }

    #[test]
    fn test_every_region_filters_to_one_row() {
        let table = table();
        for region in table.region_names() {
            let mut state = SelectionState::new();
            state.select_region(&table, region).unwrap();
            let view = DataProcessor::build(&table, &state).unwrap();
            assert_eq!(view.table.rows.len(), 1);
            assert_eq!(view.table.rows[0].region, region);
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let table = table();
        let mut state = SelectionState::new();
        state.toggle_series(SeriesKind::Female).unwrap();
        let first = DataProcessor::build(&table, &state).unwrap();
        let second = DataProcessor::build(&table, &state).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_restores_all_regions_view() {
        let table = table();
        let mut state = SelectionState::new();
        let initial = DataProcessor::build(&table, &state).unwrap();

        state.select_region(&table, "Astana").unwrap();
        assert_ne!(DataProcessor::build(&table, &state).unwrap(), initial);

        state.select_region(&table, "").unwrap();
        assert_eq!(DataProcessor::build(&table, &state).unwrap(), initial);
    }

    #[test]
    fn test_selection_missing_after_reload() {
        let table = table();
        let mut state = SelectionState::new();
        state.select_region(&table, "Almaty").unwrap();

        let reloaded = Table::parse("region,total,male,female\nShymkent,1,1,0\n").unwrap();
        let err = DataProcessor::build(&reloaded, &state).unwrap_err();
        assert_eq!(err, ViewError::UnknownRegion("Almaty".to_string()));
    }

    #[test]
    fn test_invalid_numeric_cell_excluded_from_chart() {
        let raw = "region,total,male,female\nAstana,500,240,260\nAlmaty,abc,340,360\n";
        let table = Table::parse(raw).unwrap();
        let view = DataProcessor::build(&table, &SelectionState::new()).unwrap();

        assert_eq!(view.chart.labels, ["Astana"]);
        assert_eq!(values(&view, "Male"), [240.0]);
        assert_eq!(view.table.rows.len(), 2);
        assert_eq!(view.table.rows[1].total, "abc");
        assert_eq!(
            view.issues,
            [NumericFieldIssue {
                row: 1,
                region: "Almaty".to_string(),
                field: SeriesKind::Total,
                value: "abc".to_string(),
            }]
        );
    }

    #[test]
    fn test_invalid_cell_in_hidden_series_is_ignored() {
        let raw = "region,total,male,female\nAstana,500,240,260\nAlmaty,abc,340,360\n";
        let table = Table::parse(raw).unwrap();
        let mut state = SelectionState::new();
        state.toggle_series(SeriesKind::Total).unwrap();

        let view = DataProcessor::build(&table, &state).unwrap();
        assert_eq!(view.chart.labels, ["Astana", "Almaty"]);
        assert!(view.issues.is_empty());
    }

    #[test]
    fn test_invalid_cell_in_single_region() {
        let raw = "region,total,male,female\nAstana,500,,260\n";
        let table = Table::parse(raw).unwrap();
        let mut state = SelectionState::new();
        state.select_region(&table, "Astana").unwrap();

        let view = DataProcessor::build(&table, &state).unwrap();
        assert_eq!(view.chart.labels, ["Total", "Female"]);
        assert_eq!(view.chart.series[0].values, [500.0, 260.0]);
        assert_eq!(view.issues.len(), 1);
        assert_eq!(view.issues[0].field, SeriesKind::Male);
        assert_eq!(view.table.rows[0].male, "");
    }

    #[test]
    fn test_max_value() {
        let view = DataProcessor::build(&table(), &SelectionState::new()).unwrap();
        assert_eq!(view.chart.max_value(), 700.0);
        assert_eq!(ChartViewModel::default().max_value(), 0.0);
    }
}
