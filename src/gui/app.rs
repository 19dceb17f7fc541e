//! Population Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{
    DataLoader, DataProcessor, DataSource, RemoteSource, SelectionState, SeriesKind, Table,
};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::{SeriesSummary, StatsCalculator};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use tracing::{error, info, warn};

const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 800;

/// Data loading result from background thread
enum LoadResult {
    Progress(String),
    Complete {
        table: Table,
        source: DataSource,
        summaries: Vec<SeriesSummary>,
        /// `None` keeps the README already shown.
        readme: Option<String>,
    },
    Error(String),
}

/// Download result from background thread
enum DownloadResult {
    Saved { path: PathBuf, bytes: usize },
    Error(String),
}

/// Main application window.
pub struct PopulationApp {
    config: DashboardConfig,
    remote: Option<RemoteSource>,
    loader: DataLoader,
    selection: SelectionState,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async data loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    // Async download
    download_rx: Option<Receiver<DownloadResult>>,
    is_downloading: bool,
}

impl PopulationApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        Self::configure_style(&cc.egui_ctx);

        let mut app = Self {
            control_panel: ControlPanel::new(config.dataset_year),
            remote: None,
            loader: DataLoader::new(),
            selection: SelectionState::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            download_rx: None,
            is_downloading: false,
            config,
        };

        match RemoteSource::new(app.config.request_timeout()) {
            Ok(remote) => {
                app.remote = Some(remote);
                app.start_remote_load();
            }
            Err(e) => {
                error!("http client setup failed: {}", e);
                app.control_panel.set_status(&format!("Error: {}", e));
            }
        }

        app
    }

    /// One-time visual setup for the whole process
    fn configure_style(ctx: &egui::Context) {
        ctx.set_visuals(egui::Visuals::light());
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        });
    }

    fn chart_title(&self) -> String {
        match self.selection.selected_region() {
            Some(region) => format!(
                "{} ({}): {}",
                self.config.chart_title, self.config.dataset_year, region
            ),
            None => format!("{} ({})", self.config.chart_title, self.config.dataset_year),
        }
    }

    fn busy(&self) -> bool {
        self.is_loading || self.is_downloading
    }

    /// Fetch CSV and README in a background thread
    fn start_remote_load(&mut self) {
        if self.is_loading {
            return;
        }
        let Some(remote) = self.remote.clone() else {
            return;
        };

        let csv_url = self.config.csv_url.clone();
        let readme_url = self.config.readme_url.clone();
        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.set_status("Fetching dataset...");

        thread::spawn(move || {
            let table = match remote
                .fetch_text(&csv_url)
                .map_err(|e| e.to_string())
                .and_then(|raw| Table::parse(&raw).map_err(|e| e.to_string()))
            {
                Ok(table) => table,
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e));
                    return;
                }
            };

            let _ = tx.send(LoadResult::Progress("Fetching README...".to_string()));
            let readme = match remote.fetch_readme(&readme_url) {
                Ok(text) => text,
                Err(e) => {
                    warn!("README unavailable: {}", e);
                    format!("README unavailable: {}", e)
                }
            };

            Self::finish_load(&tx, table, DataSource::Remote(csv_url), Some(readme));
        });
    }

    /// Handle local CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.set_status("Reading CSV file...");

        thread::spawn(move || {
            let result = DataLoader::read_file(&path);
            match result {
                Ok(table) => Self::finish_load(&tx, table, DataSource::File(path), None),
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Summaries are computed off the UI thread together with ingestion
    fn finish_load(
        tx: &Sender<LoadResult>,
        table: Table,
        source: DataSource,
        readme: Option<String>,
    ) {
        let _ = tx.send(LoadResult::Progress("Calculating summary...".to_string()));
        let summaries = StatsCalculator::compute_all_parallel(&table).unwrap_or_else(|e| {
            warn!("summary failed: {}", e);
            Vec::new()
        });
        let _ = tx.send(LoadResult::Complete {
            table,
            source,
            summaries,
            readme,
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        let (results, connected) = drain(&rx);
        let mut finished = false;
        for result in results {
            match result {
                LoadResult::Progress(status) => {
                    self.control_panel.set_status(&status);
                }
                LoadResult::Complete {
                    table,
                    source,
                    summaries,
                    readme,
                } => {
                    self.control_panel.update_regions(table.region_names());
                    self.loader.set_table(table, source);
                    self.control_panel.source_label = self
                        .loader
                        .get_source()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    self.chart_viewer.summaries = summaries;
                    if let Some(readme) = readme {
                        self.chart_viewer.set_readme(&readme);
                    }
                    self.control_panel.set_status(&format!(
                        "Loaded {} regions",
                        self.loader.get_row_count()
                    ));
                    self.rebuild_view();
                    finished = true;
                }
                LoadResult::Error(e) => {
                    self.report_load_error(&e);
                    finished = true;
                }
            }
        }

        if finished {
            self.is_loading = false;
        } else if !connected {
            self.report_load_error("loader stopped without a result");
            self.is_loading = false;
        } else {
            self.load_rx = Some(rx);
        }
    }

    fn report_load_error(&mut self, e: &str) {
        error!("data load failed: {}", e);
        self.control_panel.set_status(&format!("Error: {}", e));
        if self.loader.get_table().is_err() {
            self.chart_viewer.set_error(format!("Failed to load data: {}", e));
        }
    }

    /// Recompute the view models from the table and the current selection
    fn rebuild_view(&mut self) {
        let title = self.chart_title();
        let Ok(table) = self.loader.get_table() else {
            return;
        };

        match DataProcessor::build(table, &self.selection) {
            Ok(view) => {
                for issue in &view.issues {
                    warn!("{}", issue);
                }
                self.chart_viewer.set_view(title, view);
            }
            Err(e) => {
                error!("view rebuild failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
                self.chart_viewer.set_error(e.to_string());
            }
        }
    }

    fn handle_region_changed(&mut self, name: &str) {
        let Ok(table) = self.loader.get_table() else {
            return;
        };
        match self.selection.select_region(table, name) {
            Ok(()) => {
                info!(region = name, "region changed");
                self.rebuild_view();
            }
            Err(e) => {
                warn!("region change rejected: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn handle_toggle_series(&mut self, kind: SeriesKind) {
        match self.selection.toggle_series(kind) {
            Ok(()) => self.rebuild_view(),
            Err(e) => {
                warn!("series toggle rejected: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Ask for a destination, then fetch the raw CSV in the background
    fn handle_download(&mut self) {
        if self.is_downloading {
            return;
        }
        let Some(remote) = self.remote.clone() else {
            self.control_panel.set_status("Error: HTTP client unavailable");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(&self.config.download_file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        let url = self.config.csv_url.clone();
        let (tx, rx) = channel();
        self.download_rx = Some(rx);
        self.is_downloading = true;
        self.control_panel.set_status("Downloading CSV...");

        thread::spawn(move || {
            let result = match remote.download_to(&url, &path) {
                Ok(bytes) => DownloadResult::Saved { path, bytes },
                Err(e) => DownloadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    fn check_download_results(&mut self) {
        let Some(rx) = self.download_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(DownloadResult::Saved { path, bytes }) => {
                self.control_panel
                    .set_status(&format!("Saved {} bytes to {}", bytes, path.display()));
                self.is_downloading = false;
            }
            Ok(DownloadResult::Error(e)) => {
                error!("download failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
                self.is_downloading = false;
            }
            Err(TryRecvError::Empty) => {
                self.download_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.is_downloading = false;
            }
        }
    }

    /// Render the current chart to PNG and save it
    fn handle_export_chart(&mut self) {
        let Some(view) = &self.chart_viewer.view else {
            self.control_panel.set_status("Error: no chart to export");
            return;
        };

        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("population_chart.png")
            .save_file()
        else {
            return;
        };

        let result = StaticChartRenderer::render_png(
            &view.chart,
            &self.chart_viewer.title,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
        )
        .map_err(|e| e.to_string())
        .and_then(|png| std::fs::write(&output_path, png).map_err(|e| e.to_string()));

        match result {
            Ok(()) => {
                info!(path = %output_path.display(), "chart exported");
                self.control_panel
                    .set_status(&format!("Saved chart to {}", output_path.display()));
            }
            Err(e) => {
                error!("chart export failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn handle_open_repository(&mut self) {
        if let Err(e) = open::that(&self.config.repository_url) {
            warn!("failed to open {}: {}", self.config.repository_url, e);
            self.control_panel.set_status(&format!("Error: {}", e));
        }
    }
}

/// Take everything queued on `rx`. The flag is false once the sending side is gone.
fn drain<T>(rx: &Receiver<T>) -> (Vec<T>, bool) {
    let mut items = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(item) => items.push(item),
            Err(TryRecvError::Empty) => return (items, true),
            Err(TryRecvError::Disconnected) => return (items, false),
        }
    }
}

impl eframe::App for PopulationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_download_results();

        self.control_panel.busy = self.busy();
        if self.busy() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &self.selection);

                    match action {
                        ControlPanelAction::Reload => self.start_remote_load(),
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::DownloadCsv => self.handle_download(),
                        ControlPanelAction::RegionChanged(name) => {
                            self.handle_region_changed(&name)
                        }
                        ControlPanelAction::ToggleSeries(kind) => self.handle_toggle_series(kind),
                        ControlPanelAction::ExportChart => self.handle_export_chart(),
                        ControlPanelAction::OpenRepository => self.handle_open_repository(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ctx, ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_open_channel() {
        let (tx, rx) = channel();
        tx.send(1).unwrap();
        tx.send(2).unwrap();

        let (items, connected) = drain(&rx);
        assert_eq!(items, [1, 2]);
        assert!(connected);

        let (items, connected) = drain(&rx);
        assert!(items.is_empty());
        assert!(connected);
    }

    #[test]
    fn test_drain_reports_finished_sender() {
        let (tx, rx) = channel();
        tx.send("Fetching dataset...").unwrap();
        drop(tx);

        let (items, connected) = drain(&rx);
        assert_eq!(items, ["Fetching dataset..."]);
        assert!(!connected);
    }

    #[test]
    fn test_drain_sender_dropped_without_result() {
        let (tx, rx) = channel::<LoadResult>();
        thread::spawn(move || drop(tx)).join().unwrap();

        let (items, connected) = drain(&rx);
        assert!(items.is_empty());
        assert!(!connected);
    }
}
