//! Data module - CSV ingestion, selection state and view model building

mod fetch;
mod loader;
mod processor;
mod selection;
mod series;

pub use fetch::RemoteSource;
pub use loader::{DataLoader, DataSource, Table};
pub use processor::{ChartViewModel, DashboardView, DataProcessor, TableViewModel};
pub use selection::{SelectionState, REGION_PLACEHOLDER};
pub use series::{parse_population, ColorStyle, SeriesKind};
