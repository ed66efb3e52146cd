use std::time::Instant;

use serde::Serialize;

use super::aggregate::{
    correlation_matrix, mean_by, summarize, CorrelationMatrix, GroupMean, GroupOrder,
    NumericColumn, SummaryMetrics,
};
use super::filter::{apply_filter, FilterSelection};
use super::model::{DayOfWeek, DayPeriod, RentalDataset, Season, Weather, WorkingStatus};

/// Everything the dashboard draws for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: FilterSelection,
    /// Rows in the whole dataset, regardless of the selection.
    pub dataset_rows: usize,
    pub summary: SummaryMetrics,
    /// Mean rentals per hour of day, ascending hour.
    pub hourly: Vec<GroupMean<u32>>,
    /// Non-working before working day.
    pub by_working_status: Vec<GroupMean<WorkingStatus>>,
    /// Largest mean first. `None` keys are records with an unknown season code.
    pub by_season: Vec<GroupMean<Option<Season>>>,
    /// Largest mean first. `None` keys are records with an unknown weather code.
    pub by_weather: Vec<GroupMean<Option<Weather>>>,
    /// Always Night, Morning, Afternoon, Evening.
    pub by_day_period: Vec<GroupMean<DayPeriod>>,
    /// Always Monday .. Sunday.
    pub by_weekday: Vec<GroupMean<DayOfWeek>>,
    pub correlation: CorrelationMatrix,
}

impl DashboardView {
    /// Number of rows that passed the selection.
    pub fn visible_rows(&self) -> usize {
        self.summary.record_count
    }
}

/// Run filter and every aggregate for `selection`.
pub fn render(dataset: &RentalDataset, selection: &FilterSelection) -> DashboardView {
    let started = Instant::now();
    let rows = apply_filter(&dataset.records, selection);

    let view = DashboardView {
        selection: selection.clone(),
        dataset_rows: dataset.len(),
        summary: summarize(&rows),
        hourly: mean_by(&rows, |r| r.hour, GroupOrder::KeyAscending),
        by_working_status: mean_by(&rows, |r| r.working_status, GroupOrder::KeyAscending),
        by_season: mean_by(&rows, |r| r.season, GroupOrder::MeanDescending),
        by_weather: mean_by(&rows, |r| r.weather, GroupOrder::MeanDescending),
        by_day_period: mean_by(&rows, |r| r.day_period, GroupOrder::Fixed(&DayPeriod::ALL)),
        by_weekday: mean_by(&rows, |r| r.day_of_week, GroupOrder::Fixed(&DayOfWeek::ALL)),
        correlation: correlation_matrix(&rows, &NumericColumn::ALL),
    };

    log::debug!(
        "Rendered view: {} of {} rows in {:?}",
        rows.len(),
        dataset.len(),
        started.elapsed()
    );
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::tests::record;
    use crate::data::error::LoadReport;
    use crate::data::filter::WorkingStatusFilter;

    #[test]
    fn test_vacuous_selection_renders_empty_view() {
        let ds = RentalDataset::from_records(
            vec![record(0, 8, 1, true, 12), record(1, 9, 2, false, 7)],
            LoadReport::default(),
        );
        let mut selection = FilterSelection::all(&ds);
        selection.seasons.clear();

        let view = render(&ds, &selection);
        assert_eq!(view.dataset_rows, 2);
        assert_eq!(view.visible_rows(), 0);
        assert_eq!(view.summary.total_rentals, 0);
        assert!(view.hourly.is_empty());
        assert!(view.by_season.is_empty());
        assert_eq!(view.by_day_period.len(), 4);
        assert_eq!(view.by_weekday.len(), 7);
        assert!(view.by_weekday.iter().all(|g| g.mean.is_none()));
        assert_eq!(view.correlation.len(), NumericColumn::ALL.len());
    }

    #[test]
    fn test_working_status_chart_order() {
        let ds = RentalDataset::from_records(
            vec![record(0, 8, 1, true, 12), record(5, 9, 1, false, 7)],
            LoadReport::default(),
        );
        let mut selection = FilterSelection::all(&ds);
        selection.working_status = WorkingStatusFilter::All;
        let view = render(&ds, &selection);
        let keys: Vec<_> = view.by_working_status.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![WorkingStatus::NonWorkingDay, WorkingStatus::WorkingDay]);
    }

    #[test]
    fn test_view_serializes_to_json() {
        let ds = RentalDataset::from_records(vec![record(0, 8, 1, true, 12)], LoadReport::default());
        let view = render(&ds, &FilterSelection::all(&ds));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["summary"]["total_rentals"], 12);
        assert_eq!(json["by_season"][0]["key"], "Spring");
        assert_eq!(json["by_day_period"][1]["key"], "Morning");
        // Single row: every correlation is undefined and serializes as null.
        assert!(json["correlation"]["values"][0][0].is_null());
    }
}
