use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{EnrichedRecord, RentalDataset, Season, WorkingStatus};

// ---------------------------------------------------------------------------
// Working-status choice
// ---------------------------------------------------------------------------

/// The working-status drop-down: either everything or one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkingStatusFilter {
    #[default]
    All,
    #[serde(rename = "Working Day")]
    WorkingDay,
    #[serde(rename = "Non-Working Day")]
    NonWorkingDay,
}

impl WorkingStatusFilter {
    /// Drop-down order.
    pub const ALL: [WorkingStatusFilter; 3] = [
        WorkingStatusFilter::All,
        WorkingStatusFilter::WorkingDay,
        WorkingStatusFilter::NonWorkingDay,
    ];

    pub fn accepts(self, status: WorkingStatus) -> bool {
        match self {
            WorkingStatusFilter::All => true,
            WorkingStatusFilter::WorkingDay => status == WorkingStatus::WorkingDay,
            WorkingStatusFilter::NonWorkingDay => status == WorkingStatus::NonWorkingDay,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkingStatusFilter::All => "All",
            WorkingStatusFilter::WorkingDay => WorkingStatus::WorkingDay.label(),
            WorkingStatusFilter::NonWorkingDay => WorkingStatus::NonWorkingDay.label(),
        }
    }
}

impl fmt::Display for WorkingStatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// What the user currently has selected in the side panel.
///
/// Unlike a "no constraint" default, an empty `years` or `seasons` set
/// selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub seasons: BTreeSet<Season>,
    pub working_status: WorkingStatusFilter,
}

impl FilterSelection {
    /// Everything selected, i.e. the initial UI state for `dataset`.
    pub fn all(dataset: &RentalDataset) -> Self {
        FilterSelection {
            years: dataset.years.clone(),
            seasons: dataset.seasons.clone(),
            working_status: WorkingStatusFilter::All,
        }
    }

    /// Whether a single record passes the selection.
    pub fn matches(&self, record: &EnrichedRecord) -> bool {
        if !self.years.contains(&record.year) {
            return false;
        }
        match record.season {
            Some(season) if self.seasons.contains(&season) => {}
            _ => return false,
        }
        self.working_status.accepts(record.working_status)
    }
}

/// Return the records that pass `selection`, in source order. An empty
/// year or season set matches nothing.
pub fn apply_filter<'a>(
    records: &'a [EnrichedRecord],
    selection: &FilterSelection,
) -> Vec<&'a EnrichedRecord> {
    records.iter().filter(|r| selection.matches(r)).collect()
}

/// Return indices of records that pass `selection`.
pub fn filtered_indices(dataset: &RentalDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| selection.matches(r).then_some(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::tests::record;
    use crate::data::error::LoadReport;

    fn dataset() -> RentalDataset {
        let mut raw = vec![
            record(0, 2, 1, false, 10),
            record(1, 14, 1, true, 20),
            record(2, 14, 2, true, 30),
            record(400, 9, 3, true, 40),
            record(500, 20, 4, false, 50),
        ];
        // An out-of-domain season code: never selectable.
        raw.push(record(3, 3, 8, true, 60));
        RentalDataset::from_records(raw, LoadReport::default())
    }

    #[test]
    fn test_all_selects_everything_known() {
        let ds = dataset();
        let sel = FilterSelection::all(&ds);
        assert_eq!(sel.years, BTreeSet::from([2011, 2012]));
        assert_eq!(sel.seasons.len(), 4);
        let kept = apply_filter(&ds.records, &sel);
        assert_eq!(kept.len(), 5);
        let counts: Vec<u32> = kept.iter().map(|r| r.total_count()).collect();
        assert_eq!(counts, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_empty_years_selects_nothing() {
        let ds = dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.years.clear();
        assert!(apply_filter(&ds.records, &sel).is_empty());
        assert!(filtered_indices(&ds, &sel).is_empty());
    }

    #[test]
    fn test_empty_seasons_selects_nothing() {
        let ds = dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.seasons.clear();
        assert!(apply_filter(&ds.records, &sel).is_empty());
    }

    #[test]
    fn test_working_status_filter() {
        let ds = dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.working_status = WorkingStatusFilter::NonWorkingDay;
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 4]);

        sel.working_status = WorkingStatusFilter::WorkingDay;
        assert_eq!(filtered_indices(&ds, &sel), vec![1, 2, 3]);
    }

    #[test]
    fn test_year_and_season_combine() {
        let ds = dataset();
        let sel = FilterSelection {
            years: BTreeSet::from([2011]),
            seasons: BTreeSet::from([Season::Spring, Season::Fall]),
            working_status: WorkingStatusFilter::All,
        };
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1]);
    }

    #[test]
    fn test_working_status_filter_labels() {
        let labels: Vec<_> = WorkingStatusFilter::ALL.iter().map(|f| f.to_string()).collect();
        assert_eq!(labels, vec!["All", "Working Day", "Non-Working Day"]);
    }

    #[test]
    fn test_indices_agree_with_records() {
        let ds = dataset();
        for working_status in WorkingStatusFilter::ALL {
            let mut sel = FilterSelection::all(&ds);
            sel.working_status = working_status;
            sel.years.remove(&2012);
            let by_index: Vec<&EnrichedRecord> =
                filtered_indices(&ds, &sel).into_iter().map(|i| &ds.records[i]).collect();
            assert_eq!(by_index, apply_filter(&ds.records, &sel));
        }
    }
}
