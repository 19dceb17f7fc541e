//! Selection state: region filter plus series visibility.

use crate::data::loader::Table;
use crate::data::series::SeriesKind;
use thiserror::Error;
use tracing::debug;

/// Placeholder entry of the region picker; selecting it means "all regions".
pub const REGION_PLACEHOLDER: &str = "Select a region";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Region not found: {0}")]
    UnknownRegion(String),
    #[error("At least one series must stay visible ({0} is the last one)")]
    InvalidSelection(SeriesKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionSelection {
    #[default]
    AllRegions,
    SingleRegion(String),
}

/// Visibility flags, indexed by series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesVisibility {
    total: bool,
    male: bool,
    female: bool,
}

impl Default for SeriesVisibility {
    fn default() -> Self {
        Self {
            total: true,
            male: true,
            female: true,
        }
    }
}

impl SeriesVisibility {
    pub fn contains(&self, kind: SeriesKind) -> bool {
        match kind {
            SeriesKind::Total => self.total,
            SeriesKind::Male => self.male,
            SeriesKind::Female => self.female,
        }
    }

    fn flag_mut(&mut self, kind: SeriesKind) -> &mut bool {
        match kind {
            SeriesKind::Total => &mut self.total,
            SeriesKind::Male => &mut self.male,
            SeriesKind::Female => &mut self.female,
        }
    }

    /// Visible series in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = SeriesKind> + '_ {
        SeriesKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

/// User-controlled view parameters. Owned by the UI, changed one event at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    region: RegionSelection,
    visible: SeriesVisibility,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> &RegionSelection {
        &self.region
    }

    /// Selected region name, `None` for all regions.
    pub fn selected_region(&self) -> Option<&str> {
        match &self.region {
            RegionSelection::AllRegions => None,
            RegionSelection::SingleRegion(name) => Some(name),
        }
    }

    pub fn visible_series(&self) -> &SeriesVisibility {
        &self.visible
    }

    /// Handle a region picker change. Unknown names leave the state untouched.
    pub fn select_region(&mut self, table: &Table, name: &str) -> Result<(), SelectionError> {
        if name.is_empty() || name == REGION_PLACEHOLDER {
            debug!("selection reset to all regions");
            self.region = RegionSelection::AllRegions;
            return Ok(());
        }

        if !table.contains_region(name) {
            return Err(SelectionError::UnknownRegion(name.to_string()));
        }

        debug!(region = name, "region selected");
        self.region = RegionSelection::SingleRegion(name.to_string());
        Ok(())
    }

    /// Flip one series. Hiding the last visible series is rejected.
    pub fn toggle_series(&mut self, kind: SeriesKind) -> Result<(), SelectionError> {
        if self.visible.contains(kind) && self.visible.count() == 1 {
            return Err(SelectionError::InvalidSelection(kind));
        }

        let flag = self.visible.flag_mut(kind);
        *flag = !*flag;
        debug!(series = %kind, visible = *flag, "series toggled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::parse("region,total,male,female\nAstana,500,240,260\nAlmaty,700,340,360\n")
            .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = SelectionState::new();
        assert_eq!(state.region(), &RegionSelection::AllRegions);
        assert_eq!(state.selected_region(), None);
        assert_eq!(state.visible_series().count(), 3);
    }

    #[test]
    fn test_select_known_region() {
        let table = table();
        let mut state = SelectionState::new();
        state.select_region(&table, "Almaty").unwrap();
        assert_eq!(
            state.region(),
            &RegionSelection::SingleRegion("Almaty".to_string())
        );
    }

    #[test]
    fn test_select_unknown_region_keeps_state() {
        let table = table();
        let mut state = SelectionState::new();
        state.select_region(&table, "Astana").unwrap();
        let before = state.clone();

        let err = state.select_region(&table, "Unknown").unwrap_err();
        assert_eq!(err, SelectionError::UnknownRegion("Unknown".to_string()));
        assert_eq!(state, before);

        // Lookup is case-sensitive
        assert!(state.select_region(&table, "astana").is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_empty_name_and_placeholder_reset() {
        let table = table();
        let mut state = SelectionState::new();

        state.select_region(&table, "Astana").unwrap();
        state.select_region(&table, "").unwrap();
        assert_eq!(state.region(), &RegionSelection::AllRegions);

        state.select_region(&table, "Almaty").unwrap();
        state.select_region(&table, REGION_PLACEHOLDER).unwrap();
        assert_eq!(state.region(), &RegionSelection::AllRegions);
    }

    #[test]
    fn test_toggle_is_involution() {
        let mut state = SelectionState::new();
        for kind in SeriesKind::ALL {
            let before = *state.visible_series();
            state.toggle_series(kind).unwrap();
            assert!(!state.visible_series().contains(kind));
            state.toggle_series(kind).unwrap();
            assert_eq!(*state.visible_series(), before);
        }
    }

    #[test]
    fn test_cannot_hide_last_series() {
        for keep in SeriesKind::ALL {
            let mut state = SelectionState::new();
            for kind in SeriesKind::ALL.into_iter().filter(|k| *k != keep) {
                state.toggle_series(kind).unwrap();
            }
            let before = *state.visible_series();
            assert_eq!(before.iter().collect::<Vec<_>>(), vec![keep]);

            let err = state.toggle_series(keep).unwrap_err();
            assert_eq!(err, SelectionError::InvalidSelection(keep));
            assert_eq!(*state.visible_series(), before);

            // Showing a hidden series is still allowed
            let other = SeriesKind::ALL.into_iter().find(|k| *k != keep).unwrap();
            state.toggle_series(other).unwrap();
            assert_eq!(state.visible_series().count(), 2);
        }
    }

    #[test]
    fn test_toggle_independent_of_region() {
        let table = table();
        let mut state = SelectionState::new();
        state.toggle_series(SeriesKind::Male).unwrap();
        state.select_region(&table, "Astana").unwrap();
        assert!(!state.visible_series().contains(SeriesKind::Male));
        state.select_region(&table, "").unwrap();
        assert!(!state.visible_series().contains(SeriesKind::Male));
    }
}
