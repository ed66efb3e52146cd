use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::derive::enrich_all;
use super::error::LoadReport;

// ---------------------------------------------------------------------------
// Categorical labels
// ---------------------------------------------------------------------------

/// Season of the year, decoded from the source `season` code (1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    /// Parse a label case-insensitively (`"spring"`, `"Fall"`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        Season::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// Weather situation, decoded from the source `weather` code (1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weather {
    #[serde(rename = "Clear/Partly Cloudy")]
    Clear,
    #[serde(rename = "Mist/Cloudy")]
    Mist,
    #[serde(rename = "Light Snow/Rain")]
    LightPrecipitation,
    #[serde(rename = "Heavy Rain/Snow")]
    HeavyPrecipitation,
}

impl Weather {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Weather::Clear),
            2 => Some(Weather::Mist),
            3 => Some(Weather::LightPrecipitation),
            4 => Some(Weather::HeavyPrecipitation),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weather::Clear => "Clear/Partly Cloudy",
            Weather::Mist => "Mist/Cloudy",
            Weather::LightPrecipitation => "Light Snow/Rain",
            Weather::HeavyPrecipitation => "Heavy Rain/Snow",
        }
    }
}

/// Coarse part of the day a record's hour falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayPeriod {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    /// Display order used by the day-period chart.
    pub const ALL: [DayPeriod; 4] = [
        DayPeriod::Night,
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayPeriod::Night => "Night",
            DayPeriod::Morning => "Morning",
            DayPeriod::Afternoon => "Afternoon",
            DayPeriod::Evening => "Evening",
        }
    }
}

/// Day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// 0 = Monday .. 6 = Sunday. Indices past 6 wrap around.
    pub fn from_index(index: u32) -> Self {
        Self::ALL[(index % 7) as usize]
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, DayOfWeek::Saturday | DayOfWeek::Sunday)
    }
}

/// Working-day status. Ordered the way the labels sort alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkingStatus {
    #[serde(rename = "Non-Working Day")]
    NonWorkingDay,
    #[serde(rename = "Working Day")]
    WorkingDay,
}

impl WorkingStatus {
    pub fn from_flag(is_working_day: bool) -> Self {
        if is_working_day {
            WorkingStatus::WorkingDay
        } else {
            WorkingStatus::NonWorkingDay
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkingStatus::NonWorkingDay => "Non-Working Day",
            WorkingStatus::WorkingDay => "Working Day",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

display_via_label!(Season, Weather, DayPeriod, DayOfWeek, WorkingStatus);

/// Label for an optional category; records with an out-of-domain code land here.
pub fn label_or_unknown<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "Unknown".to_string(), |v| v.to_string())
}

// ---------------------------------------------------------------------------
// RentalRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One hour of observed rentals, as read from the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalRecord {
    pub timestamp: NaiveDateTime,
    pub season_code: u8,
    pub weather_code: u8,
    pub is_working_day: bool,
    pub is_holiday: Option<bool>,
    /// Air temperature in °C.
    pub temperature: f64,
    /// "Feels like" temperature in °C (`atemp`).
    pub feels_like_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub casual_count: u32,
    pub registered_count: u32,
    /// Trusted from the source; expected to equal casual + registered.
    pub total_count: u32,
}

// ---------------------------------------------------------------------------
// EnrichedRecord – raw row plus derived calendar/categorical fields
// ---------------------------------------------------------------------------

/// A [`RentalRecord`] with its derived fields. Built by
/// [`enrich`](super::derive::enrich) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub raw: RentalRecord,
    pub year: i32,
    pub month: u32,
    pub day_of_week: DayOfWeek,
    /// 0..=23
    pub hour: u32,
    /// `None` when the season code is outside 1..=4.
    pub season: Option<Season>,
    pub day_period: DayPeriod,
    /// `None` when the weather code is outside 1..=4.
    pub weather: Option<Weather>,
    pub working_status: WorkingStatus,
}

impl EnrichedRecord {
    pub fn total_count(&self) -> u32 {
        self.raw.total_count
    }
}

// ---------------------------------------------------------------------------
// RentalDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full dataset, enriched once at construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct RentalDataset {
    /// Enriched rows in source order.
    pub records: Vec<EnrichedRecord>,
    /// Distinct years present, ascending.
    pub years: BTreeSet<i32>,
    /// Distinct (known) seasons present.
    pub seasons: BTreeSet<Season>,
    /// What happened while reading the source file.
    pub report: LoadReport,
}

impl RentalDataset {
    /// Enrich the raw rows and index the available filter values.
    pub fn from_records(records: Vec<RentalRecord>, report: LoadReport) -> Self {
        let records = enrich_all(&records);
        let years = records.iter().map(|r| r.year).collect();
        let seasons = records.iter().filter_map(|r| r.season).collect();
        RentalDataset {
            records,
            years,
            seasons,
            report,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mappings() {
        assert_eq!(Season::from_code(1), Some(Season::Spring));
        assert_eq!(Season::from_code(4), Some(Season::Winter));
        assert_eq!(Season::from_code(0), None);
        assert_eq!(Weather::from_code(3).map(Weather::label), Some("Light Snow/Rain"));
        assert_eq!(Weather::from_code(5), None);
    }

    #[test]
    fn test_season_from_label_ignores_case() {
        assert_eq!(Season::from_label("fall"), Some(Season::Fall));
        assert_eq!(Season::from_label(" Winter "), Some(Season::Winter));
        assert_eq!(Season::from_label("monsoon"), None);
    }

    #[test]
    fn test_working_status_sorts_like_labels() {
        assert!(WorkingStatus::NonWorkingDay < WorkingStatus::WorkingDay);
        assert!(WorkingStatus::NonWorkingDay.label() < WorkingStatus::WorkingDay.label());
    }

    #[test]
    fn test_day_of_week_index_roundtrip() {
        for (i, day) in DayOfWeek::ALL.iter().enumerate() {
            assert_eq!(DayOfWeek::from_index(i as u32), *day);
            assert_eq!(day.index(), i as u32);
        }
        assert!(DayOfWeek::Sunday.is_weekend());
        assert!(!DayOfWeek::Friday.is_weekend());
    }

    #[test]
    fn test_labels_serialize_as_display_text() {
        let json = serde_json::to_string(&Weather::Mist).unwrap();
        assert_eq!(json, "\"Mist/Cloudy\"");
        assert_eq!(label_or_unknown(None::<Season>), "Unknown");
        assert_eq!(label_or_unknown(Some(Season::Summer)), "Summer");
    }
}
