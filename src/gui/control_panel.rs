//! Control Panel Widget
//! Left side panel with data source, region picker and series toggles.

use crate::data::{SelectionState, SeriesKind, REGION_PLACEHOLDER};
use crate::gui::chart_viewer::STATUS_ERROR_COLOR;
use egui::{Color32, ComboBox, RichText};

/// Left side control panel with data source and selection controls.
pub struct ControlPanel {
    pub regions: Vec<String>,
    pub source_label: String,
    pub dataset_year: u16,
    pub status: String,
    pub busy: bool,
}

impl ControlPanel {
    pub fn new(dataset_year: u16) -> Self {
        Self {
            regions: Vec::new(),
            source_label: "No data loaded".to_string(),
            dataset_year,
            status: "Ready".to_string(),
            busy: false,
        }
    }

    /// Update the region picker after a table load
    pub fn update_regions<'a>(&mut self, regions: impl Iterator<Item = &'a str>) {
        self.regions = regions.map(str::to_string).collect();
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, selection: &SelectionState) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let has_data = !self.regions.is_empty();

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 City Population")
                    .size(22.0)
                    .color(Color32::from_rgb(7, 89, 133)),
            );
            ui.label(RichText::new("Dashboard").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.source_label).size(11.0).color(Color32::GRAY));
                ui.add_space(5.0);
                ui.add_enabled_ui(!self.busy, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                        if ui.button("📂 Open CSV").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Region Section =====
        ui.label(RichText::new("🗺 Region").size(14.0).strong());
        ui.add_space(5.0);

        let selected_text = selection.selected_region().unwrap_or(REGION_PLACEHOLDER);
        ui.add_enabled_ui(has_data, |ui| {
            ui.horizontal(|ui| {
                ComboBox::from_id_salt("region")
                    .width(200.0)
                    .selected_text(selected_text)
                    .show_ui(ui, |ui| {
                        if ui
                            .selectable_label(selection.selected_region().is_none(), REGION_PLACEHOLDER)
                            .clicked()
                        {
                            action = ControlPanelAction::RegionChanged(String::new());
                        }
                        for region in &self.regions {
                            let is_selected = selection.selected_region() == Some(region.as_str());
                            if ui.selectable_label(is_selected, region.as_str()).clicked() {
                                action = ControlPanelAction::RegionChanged(region.clone());
                            }
                        }
                    });
                ui.label(RichText::new(self.dataset_year.to_string()).color(Color32::GRAY));
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Series Section =====
        ui.label(RichText::new("⚙️ Series").size(14.0).strong());
        ui.add_space(5.0);

        for kind in SeriesKind::ALL {
            let mut checked = selection.visible_series().contains(kind);
            if ui.checkbox(&mut checked, kind.label()).changed() {
                action = ControlPanelAction::ToggleSeries(kind);
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.busy, |ui| {
                let button = egui::Button::new(RichText::new("⬇ Download CSV").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::DownloadCsv;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(has_data, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Chart PNG").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportChart;
                }
            });

            ui.add_space(8.0);

            if ui.link("GitHub repository").clicked() {
                action = ControlPanelAction::OpenRepository;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = if self.status.starts_with("Error") {
                STATUS_ERROR_COLOR
            } else if self.status.starts_with("Loaded") || self.status.starts_with("Saved") {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
    BrowseCsv,
    DownloadCsv,
    RegionChanged(String),
    ToggleSeries(SeriesKind),
    ExportChart,
    OpenRepository,
}
