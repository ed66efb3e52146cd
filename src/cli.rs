use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::data::error::LoadReport;
use crate::data::filter::{FilterSelection, WorkingStatusFilter};
use crate::data::loader::load_file;
use crate::data::model::{RentalDataset, Season};
use crate::data::view::{render, DashboardView};

#[derive(Debug, Parser)]
#[command(
    name = "rusty-pedals",
    version,
    about = "Explore hourly bike rental data: filter by year, season and working day"
)]
pub struct Cli {
    /// Dataset to open (.csv, .json or .parquet)
    #[arg(short, long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Print the dashboard aggregates as JSON instead of opening a window
    #[arg(long, requires = "data")]
    pub headless: bool,

    /// Keep only these years (repeatable, default: all)
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,

    /// Keep only these seasons (repeatable, default: all)
    #[arg(long = "season", value_name = "SEASON", value_parser = parse_season)]
    pub seasons: Vec<Season>,

    /// Working-day filter
    #[arg(long, value_enum, default_value_t = WorkingStatusArg::All)]
    pub working_status: WorkingStatusArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkingStatusArg {
    All,
    Working,
    NonWorking,
}

impl From<WorkingStatusArg> for WorkingStatusFilter {
    fn from(arg: WorkingStatusArg) -> Self {
        match arg {
            WorkingStatusArg::All => WorkingStatusFilter::All,
            WorkingStatusArg::Working => WorkingStatusFilter::WorkingDay,
            WorkingStatusArg::NonWorking => WorkingStatusFilter::NonWorkingDay,
        }
    }
}

fn parse_season(s: &str) -> Result<Season, String> {
    Season::from_label(s)
        .ok_or_else(|| format!("unknown season '{s}' (expected Spring, Summer, Fall or Winter)"))
}

/// What `--headless` prints.
#[derive(Debug, Serialize)]
pub struct HeadlessReport {
    pub source: String,
    pub load_report: LoadReport,
    pub view: DashboardView,
}

impl Cli {
    /// The selection the flags describe; omitted years/seasons mean "all".
    pub fn selection(&self, dataset: &RentalDataset) -> FilterSelection {
        let mut selection = FilterSelection::all(dataset);
        if !self.years.is_empty() {
            selection.years = self.years.iter().copied().collect();
        }
        if !self.seasons.is_empty() {
            selection.seasons = self.seasons.iter().copied().collect();
        }
        selection.working_status = self.working_status.into();
        selection
    }

    /// Load `--data`, apply the flags and build the report.
    pub fn run_headless(&self) -> Result<HeadlessReport> {
        let path = self
            .data
            .as_deref()
            .context("--headless needs a dataset (--data <PATH>)")?;
        let dataset = load_file(path)?;
        let selection = self.selection(&dataset);
        log::debug!("Headless selection: {selection:?}");
        let view = render(&dataset, &selection);
        Ok(HeadlessReport {
            source: path.display().to_string(),
            load_report: dataset.report.clone(),
            view,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const CSV: &str = "datetime,season,holiday,workingday,weather,temp,atemp,humidity,windspeed,casual,registered,count
2011-01-01 00:00:00,1,0,0,1,9.84,14.395,81,0,3,13,16
2011-07-01 14:00:00,3,0,1,1,30.1,33.0,40,12.0,60,200,260
2012-01-02 08:00:00,1,1,0,2,8.2,10.6,70,6.0,2,50,52
2012-01-02 09:00:00,9,0,1,1,8.2,10.6,70,6.0,2,50,52
";

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "rusty-pedals",
            "--data",
            "train.csv",
            "--headless",
            "--year",
            "2011",
            "--year",
            "2012",
            "--season",
            "spring",
            "--working-status",
            "non-working",
        ])
        .unwrap();
        assert!(cli.headless);
        assert_eq!(cli.years, vec![2011, 2012]);
        assert_eq!(cli.seasons, vec![Season::Spring]);
        assert_eq!(cli.working_status, WorkingStatusArg::NonWorking);
    }

    #[test]
    fn test_headless_requires_data() {
        assert!(Cli::try_parse_from(["rusty-pedals", "--headless"]).is_err());
        assert!(Cli::try_parse_from(["rusty-pedals", "--season", "monsoon"]).is_err());
    }

    #[test]
    fn test_run_headless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        std::fs::write(&path, CSV).unwrap();

        let cli = Cli::try_parse_from([
            "rusty-pedals",
            "--data",
            path.to_str().unwrap(),
            "--headless",
            "--season",
            "Spring",
        ])
        .unwrap();
        let report = cli.run_headless().unwrap();

        assert_eq!(report.load_report.rows_kept, 3);
        assert_eq!(report.load_report.skipped_total(), 1);
        assert_eq!(report.view.selection.years, BTreeSet::from([2011, 2012]));
        assert_eq!(report.view.visible_rows(), 2);
        assert_eq!(report.view.summary.total_rentals, 68);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["view"]["by_season"][0]["key"], "Spring");
        assert_eq!(json["view"]["by_season"][0]["mean"], 34.0);
    }
}
