//! Chart Viewer Widget
//! Central scrollable panel: bar chart, data table, summary and README.

use crate::charts::ChartPlotter;
use crate::data::DashboardView;
use crate::gui::readme_view::ReadmeView;
use crate::stats::SeriesSummary;
use egui::{Color32, RichText, ScrollArea};

pub const STATUS_ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

const CHART_HEIGHT: f32 = 520.0;
const SECTION_SPACING: f32 = 15.0;

/// Scrollable display of the current dashboard view.
#[derive(Default)]
pub struct ChartViewer {
    pub title: String,
    pub view: Option<DashboardView>,
    pub summaries: Vec<SeriesSummary>,
    pub readme: Option<ReadmeView>,
    /// Shown instead of the chart when no view could be built.
    pub error: Option<String>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, title: String, view: DashboardView) {
        self.title = title;
        self.view = Some(view);
        self.error = None;
    }

    pub fn set_readme(&mut self, markdown: &str) {
        self.readme = Some(ReadmeView::parse(markdown));
    }

    /// Drop the current view and show `error` in its place
    pub fn set_error(&mut self, error: String) {
        self.view = None;
        self.error = Some(error);
    }

    pub fn show(&mut self, _ctx: &egui::Context, ui: &mut egui::Ui) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                match (&self.view, &self.error) {
                    (Some(view), _) => Self::draw_view(ui, &self.title, view),
                    (None, Some(error)) => {
                        ui.vertical_centered(|ui| {
                            ui.add_space(40.0);
                            ui.label(RichText::new(error).size(16.0).color(STATUS_ERROR_COLOR));
                        });
                    }
                    (None, None) => {
                        ui.vertical_centered(|ui| {
                            ui.add_space(40.0);
                            ui.label(RichText::new("No Data").size(20.0));
                        });
                    }
                }

                if !self.summaries.is_empty() {
                    ui.add_space(SECTION_SPACING);
                    ui.label(RichText::new("Dataset Summary").size(16.0).strong());
                    ui.add_space(5.0);
                    ChartPlotter::draw_summary_table(ui, &self.summaries);
                }

                if let Some(readme) = &mut self.readme {
                    ui.add_space(SECTION_SPACING);
                    egui::CollapsingHeader::new(RichText::new("README").size(16.0).strong())
                        .default_open(true)
                        .show(ui, |ui| readme.show(ui));
                }
            });
    }

    fn draw_view(ui: &mut egui::Ui, title: &str, view: &DashboardView) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(title)
                    .size(22.0)
                    .color(Color32::from_rgb(7, 89, 133)),
            );
        });
        ui.add_space(10.0);

        ChartPlotter::draw_bar_chart(ui, &view.chart, CHART_HEIGHT);

        if !view.issues.is_empty() {
            ui.add_space(5.0);
            for issue in &view.issues {
                ui.label(
                    RichText::new(format!("⚠ {}", issue))
                        .size(11.0)
                        .color(STATUS_ERROR_COLOR),
                );
            }
        }

        ui.add_space(SECTION_SPACING);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Dataset Table").size(16.0).strong());
        });
        ui.add_space(5.0);
        ChartPlotter::draw_data_table(ui, &view.table);
    }
}
