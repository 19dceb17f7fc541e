//! Chart Plotter Module
//! Draws the population bar chart and data tables using egui_plot.

use crate::data::{ChartViewModel, ColorStyle, SeriesKind, TableViewModel};
use crate::stats::SeriesSummary;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Corner, GridMark, Legend, Plot};

/// Share of each label slot covered by its bar group.
pub const GROUP_WIDTH: f64 = 0.8;

/// Highlight for cells that are not numbers.
pub const INVALID_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

/// Creates the dashboard visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn fill_color(style: ColorStyle) -> Color32 {
        let [r, g, b, a] = style.fill;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    pub fn border_color(style: ColorStyle) -> Color32 {
        let [r, g, b] = style.border;
        Color32::from_rgb(r, g, b)
    }

    /// Center offset and width of series `index` within a group of `count` bars.
    pub fn bar_slot(index: usize, count: usize) -> (f64, f64) {
        let count = count.max(1);
        let width = GROUP_WIDTH / count as f64;
        let offset = (index as f64 - (count as f64 - 1.0) / 2.0) * width;
        (offset, width)
    }

    /// Grouped bar chart. X-axis: labels, Y-axis: population.
    pub fn draw_bar_chart(ui: &mut egui::Ui, chart: &ChartViewModel, height: f32) {
        let labels = chart.labels.clone();
        let label_count = labels.len();
        let series_count = chart.series.len();

        Plot::new("population_chart")
            .height(height)
            .legend(Legend::default().position(Corner::RightTop))
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label("Population")
            .x_grid_spacer(move |_input| {
                (0..label_count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (s, series) in chart.series.iter().enumerate() {
                    let (offset, width) = Self::bar_slot(s, series_count);

                    let bars: Vec<Bar> = series
                        .values
                        .iter()
                        .zip(series.styles.iter())
                        .enumerate()
                        .map(|(i, (&value, &style))| {
                            let label = chart.labels.get(i).map(String::as_str).unwrap_or("");
                            Bar::new(i as f64 + offset, value)
                                .width(width)
                                .name(label)
                                .fill(Self::fill_color(style))
                                .stroke(egui::Stroke::new(1.0, Self::border_color(style)))
                        })
                        .collect();

                    let mut bar_chart = BarChart::new(bars).name(&series.name);
                    if let Some(style) = series.legend_style() {
                        bar_chart = bar_chart.color(Self::border_color(style));
                    }
                    plot_ui.bar_chart(bar_chart);
                }
            });
    }

    /// Data table: raw cells, non-numeric population cells highlighted.
    pub fn draw_data_table(ui: &mut egui::Ui, table: &TableViewModel) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("population_table")
                    .striped(true)
                    .min_col_width(90.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for title in Self::column_titles(&table.header) {
                            ui.label(RichText::new(title).strong());
                        }
                        ui.end_row();

                        let default_text_color = ui.visuals().text_color();
                        for row in &table.rows {
                            ui.label(row.region.as_str());
                            for kind in SeriesKind::ALL {
                                let cell = row.value(kind);
                                let color = if crate::data::parse_population(cell).is_some() {
                                    default_text_color
                                } else {
                                    INVALID_COLOR
                                };
                                ui.label(RichText::new(cell).color(color));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Titles for the data table, taken from the dataset header.
    /// Missing or blank header fields fall back to the built-in names.
    pub fn column_titles(header: &[String]) -> Vec<String> {
        let defaults = std::iter::once("Region").chain(SeriesKind::ALL.map(SeriesKind::label));
        defaults
            .enumerate()
            .map(|(i, fallback)| match header.get(i) {
                Some(title) if !title.is_empty() => title.clone(),
                _ => fallback.to_string(),
            })
            .collect()
    }

    /// Per-series summary statistics.
    pub fn draw_summary_table(ui: &mut egui::Ui, summaries: &[SeriesSummary]) {
        egui::Grid::new("summary_table")
            .striped(true)
            .min_col_width(55.0)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                for header in [
                    "Series", "N", "Invalid", "Sum", "Mean", "Median", "Std", "Min", "Max",
                    "Largest",
                ] {
                    ui.label(RichText::new(header).strong().size(11.0));
                }
                ui.end_row();

                for summary in summaries {
                    let color = Self::border_color(summary.kind.style());
                    ui.label(RichText::new(summary.kind.label()).size(11.0).color(color));
                    ui.label(RichText::new(summary.count.to_string()).size(11.0));
                    if summary.invalid > 0 {
                        ui.label(
                            RichText::new(summary.invalid.to_string())
                                .size(11.0)
                                .color(INVALID_COLOR),
                        );
                    } else {
                        ui.label(RichText::new("0").size(11.0));
                    }
                    for value in [
                        summary.sum,
                        summary.mean,
                        summary.median,
                        summary.std,
                        summary.min,
                        summary.max,
                    ] {
                        ui.label(RichText::new(Self::format_number(value)).size(11.0));
                    }
                    ui.label(
                        RichText::new(summary.largest_region.as_deref().unwrap_or("-")).size(11.0),
                    );
                    ui.end_row();
                }
            });
    }

    /// One decimal place, `-` for NaN.
    pub fn format_number(value: f64) -> String {
        if value.is_nan() {
            "-".to_string()
        } else {
            format!("{:.1}", value)
        }
    }
}
