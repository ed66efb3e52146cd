use std::path::Path;

use crate::data::filter::{FilterSelection, WorkingStatusFilter};
use crate::data::loader::load_file;
use crate::data::model::{RentalDataset, Season};
use crate::data::view::{render, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<RentalDataset>,

    /// Current side-panel selection.
    pub selection: FilterSelection,

    /// Aggregates for the current selection (cached until it changes).
    pub view: Option<DashboardView>,

    /// File name of the loaded dataset, for the top bar.
    pub source_name: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` and make it the current dataset; on failure keep the
    /// previous dataset and surface the error in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_dataset(dataset, Some(name));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset with everything selected.
    pub fn set_dataset(&mut self, dataset: RentalDataset, source_name: Option<String>) {
        self.selection = FilterSelection::all(&dataset);
        self.dataset = Some(dataset);
        self.source_name = source_name;
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the view after a selection change.
    pub fn refresh(&mut self) {
        self.view = self.dataset.as_ref().map(|ds| render(ds, &self.selection));
    }

    pub fn toggle_year(&mut self, year: i32) {
        if !self.selection.years.remove(&year) {
            self.selection.years.insert(year);
        }
        self.refresh();
    }

    pub fn toggle_season(&mut self, season: Season) {
        if !self.selection.seasons.remove(&season) {
            self.selection.seasons.insert(season);
        }
        self.refresh();
    }

    pub fn select_all_years(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection.years = ds.years.clone();
            self.refresh();
        }
    }

    pub fn select_no_years(&mut self) {
        self.selection.years.clear();
        self.refresh();
    }

    pub fn select_all_seasons(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection.seasons = ds.seasons.clone();
            self.refresh();
        }
    }

    pub fn select_no_seasons(&mut self) {
        self.selection.seasons.clear();
        self.refresh();
    }

    pub fn set_working_status(&mut self, status: WorkingStatusFilter) {
        if self.selection.working_status != status {
            self.selection.working_status = status;
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::tests::record;
    use crate::data::error::LoadReport;

    fn state() -> AppState {
        let ds = RentalDataset::from_records(
            vec![
                record(0, 2, 1, false, 10),
                record(1, 14, 1, true, 20),
                record(2, 14, 2, true, 30),
                record(400, 8, 3, true, 40),
            ],
            LoadReport::default(),
        );
        let mut state = AppState::default();
        state.set_dataset(ds, Some("test.csv".into()));
        state
    }

    fn visible(state: &AppState) -> usize {
        state.view.as_ref().map_or(0, |v| v.visible_rows())
    }

    #[test]
    fn test_new_dataset_selects_everything() {
        let state = state();
        assert_eq!(visible(&state), 4);
        assert_eq!(state.selection.working_status, WorkingStatusFilter::All);
        assert_eq!(state.source_name.as_deref(), Some("test.csv"));
    }

    #[test]
    fn test_toggles_recompute_view() {
        let mut state = state();
        state.toggle_year(2012);
        assert_eq!(visible(&state), 3);
        state.toggle_season(Season::Spring);
        assert_eq!(visible(&state), 1);
        state.toggle_season(Season::Spring);
        state.toggle_year(2012);
        assert_eq!(visible(&state), 4);
    }

    #[test]
    fn test_select_none_and_all() {
        let mut state = state();
        state.select_no_seasons();
        assert_eq!(visible(&state), 0);
        state.select_all_seasons();
        state.select_no_years();
        assert_eq!(visible(&state), 0);
        state.select_all_years();
        assert_eq!(visible(&state), 4);
    }

    #[test]
    fn test_working_status_choice() {
        let mut state = state();
        state.set_working_status(WorkingStatusFilter::NonWorkingDay);
        assert_eq!(visible(&state), 1);
        state.set_working_status(WorkingStatusFilter::WorkingDay);
        assert_eq!(visible(&state), 3);
    }

    #[test]
    fn test_failed_load_keeps_previous_dataset() {
        let mut state = state();
        state.load_path(Path::new("/definitely/not/here.csv"));
        assert!(state.dataset.is_some());
        assert!(state
            .status_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error:")));
    }

    #[test]
    fn test_successful_load_clears_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.csv");
        std::fs::write(
            &path,
            "datetime,season,workingday,weather,temp,casual,registered,count\n\
             2012-06-01 12:00:00,2,1,1,25.5,40,200,240\n",
        )
        .unwrap();

        let mut state = state();
        state.load_path(Path::new("/definitely/not/here.csv"));
        assert!(state.status_message.is_some());

        state.load_path(&path);
        assert!(state.status_message.is_none());
        assert_eq!(state.source_name.as_deref(), Some("hourly.csv"));
        assert_eq!(visible(&state), 1);
    }
}
