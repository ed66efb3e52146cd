use chrono::{Datelike, Timelike};

use super::model::{
    DayOfWeek, DayPeriod, EnrichedRecord, RentalRecord, Season, Weather, WorkingStatus,
};

// ---------------------------------------------------------------------------
// Day-period policy
// ---------------------------------------------------------------------------

/// Map an hour of the day onto its [`DayPeriod`].
///
/// | hours   | period    |
/// |---------|-----------|
/// | 0..6    | Night     |
/// | 6..12   | Morning   |
/// | 12..18  | Afternoon |
/// | 18..24  | Evening   |
pub fn day_period(hour: u32) -> DayPeriod {
    match hour {
        0..=5 => DayPeriod::Night,
        6..=11 => DayPeriod::Morning,
        12..=17 => DayPeriod::Afternoon,
        _ => DayPeriod::Evening,
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Derive the calendar and categorical fields of one record.
///
/// Total: unknown season/weather codes become `None` labels instead of errors.
pub fn enrich(raw: &RentalRecord) -> EnrichedRecord {
    let ts = raw.timestamp;
    let hour = ts.hour();
    EnrichedRecord {
        raw: raw.clone(),
        year: ts.year(),
        month: ts.month(),
        day_of_week: DayOfWeek::from_index(ts.weekday().num_days_from_monday()),
        hour,
        season: Season::from_code(i64::from(raw.season_code)),
        day_period: day_period(hour),
        weather: Weather::from_code(i64::from(raw.weather_code)),
        working_status: WorkingStatus::from_flag(raw.is_working_day),
    }
}

/// Enrich every record, one-to-one and in order.
pub fn enrich_all(raw: &[RentalRecord]) -> Vec<EnrichedRecord> {
    raw.iter().map(enrich).collect()
}
