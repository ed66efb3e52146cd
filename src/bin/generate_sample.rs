use std::f64::consts::PI;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate, Weekday};
use parquet::arrow::ArrowWriter;

use rusty_pedals::data::loader::RawRow;

const CSV_PATH: &str = "sample_bikes.csv";
const PARQUET_PATH: &str = "sample_bikes.parquet";

/// Only the first 19 days of each month are sampled, like the public
/// training split of the hourly bike-sharing data.
const DAYS_PER_MONTH: u32 = 19;

/// Federal holidays that fall within the sampled days.
const HOLIDAYS: [(i32, u32, u32); 8] = [
    (2011, 1, 17),
    (2011, 2, 21),
    (2011, 4, 15),
    (2011, 7, 4),
    (2012, 1, 2),
    (2012, 1, 16),
    (2012, 2, 20),
    (2012, 7, 4),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Relative demand per hour: commuter peaks on working days, a midday hump
/// otherwise.
fn hourly_profile(hour: u32, working: bool) -> f64 {
    let h = f64::from(hour);
    let bump = |center: f64, width: f64| (-(h - center).powi(2) / (2.0 * width * width)).exp();
    if working {
        0.05 + 1.6 * bump(8.0, 1.0) + 1.9 * bump(17.5, 1.3) + 0.5 * bump(13.0, 3.0)
    } else {
        0.08 + 1.1 * bump(14.0, 3.5)
    }
}

/// Season code by month, as in the source data: Jan-Mar is season 1.
fn season_code(month: u32) -> i64 {
    i64::from((month - 1) / 3 + 1)
}

fn weather_code(rng: &mut SimpleRng) -> i64 {
    match rng.next_f64() {
        p if p < 0.65 => 1,
        p if p < 0.91 => 2,
        p if p < 0.995 => 3,
        _ => 4,
    }
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<RawRow> {
    let mut rows = Vec::new();
    for year in [2011, 2012] {
        for month in 1..=12 {
            for day in 1..=DAYS_PER_MONTH {
                let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                    continue;
                };
                let holiday = HOLIDAYS.contains(&(year, month, day));
                let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
                let working = !holiday && !weekend;
                let doy = f64::from(date.ordinal());
                let seasonal_temp = 16.0 + 11.0 * (2.0 * PI * (doy - 105.0) / 365.0).sin();
                let growth = if year == 2012 { 1.65 } else { 1.0 };

                for hour in 0..24u32 {
                    let weather = weather_code(rng);
                    let temp = (seasonal_temp
                        + 3.5 * (2.0 * PI * (f64::from(hour) - 9.0) / 24.0).sin()
                        + rng.gauss(0.0, 2.0))
                    .clamp(-5.0, 41.0);
                    let atemp = temp + 2.5 + rng.gauss(0.0, 1.5);
                    let humidity =
                        (62.0 + 12.0 * weather as f64 + rng.gauss(0.0, 12.0)).clamp(0.0, 100.0);
                    let windspeed = rng.gauss(12.0, 7.0).clamp(0.0, 57.0);

                    let comfort = (1.0 - ((temp - 27.0) / 22.0).powi(2)).max(0.1);
                    let weather_factor = [1.0, 0.85, 0.45, 0.15][(weather - 1) as usize];
                    let mean = 210.0 * growth * hourly_profile(hour, working) * comfort * weather_factor;
                    let total = rng.gauss(mean, mean.sqrt() * 1.5).round().max(0.0) as i64;
                    let casual_share = if working { 0.12 } else { 0.38 };
                    let casual = ((total as f64) * (casual_share + rng.gauss(0.0, 0.03)).clamp(0.0, 1.0))
                        .round() as i64;

                    rows.push(RawRow {
                        datetime: format!("{} {:02}:00:00", date, hour),
                        season: season_code(month),
                        holiday: Some(i64::from(holiday)),
                        workingday: i64::from(working),
                        weather,
                        temp: (temp * 100.0).round() / 100.0,
                        atemp: Some((atemp * 1000.0).round() / 1000.0),
                        humidity: Some(humidity.round()),
                        windspeed: Some((windspeed * 10000.0).round() / 10000.0),
                        casual,
                        registered: total - casual,
                        count: total,
                    });
                }
            }
        }
    }
    rows
}

fn write_csv(rows: &[RawRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV output")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(rows: &[RawRow]) -> Result<()> {
    let int_column = |f: fn(&RawRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let float_column = |f: fn(&RawRow) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("datetime", DataType::Utf8, false),
        Field::new("season", DataType::Int64, false),
        Field::new("holiday", DataType::Int64, false),
        Field::new("workingday", DataType::Int64, false),
        Field::new("weather", DataType::Int64, false),
        Field::new("temp", DataType::Float64, false),
        Field::new("atemp", DataType::Float64, false),
        Field::new("humidity", DataType::Float64, false),
        Field::new("windspeed", DataType::Float64, false),
        Field::new("casual", DataType::Int64, false),
        Field::new("registered", DataType::Int64, false),
        Field::new("count", DataType::Int64, false),
    ]));

    let datetime: ArrayRef = Arc::new(StringArray::from(
        rows.iter().map(|r| r.datetime.as_str()).collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            datetime,
            int_column(|r| r.season),
            int_column(|r| r.holiday.unwrap_or(0)),
            int_column(|r| r.workingday),
            int_column(|r| r.weather),
            float_column(|r| r.temp),
            float_column(|r| r.atemp.unwrap_or(r.temp)),
            float_column(|r| r.humidity.unwrap_or(0.0)),
            float_column(|r| r.windspeed.unwrap_or(0.0)),
            int_column(|r| r.casual),
            int_column(|r| r.registered),
            int_column(|r| r.count),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_csv(&rows)?;
    write_parquet(&rows)?;

    let total: i64 = rows.iter().map(|r| r.count).sum();
    println!(
        "Wrote {} hourly records ({total} rentals) to {CSV_PATH} and {PARQUET_PATH}",
        rows.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_pedals::data::model::RentalRecord;

    #[test]
    fn test_season_code_by_month() {
        let codes: Vec<i64> = (1..=12).map(season_code).collect();
        assert_eq!(codes, vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn test_working_days_peak_at_commute_hours() {
        assert!(hourly_profile(8, true) > hourly_profile(12, true));
        assert!(hourly_profile(17, true) > hourly_profile(3, true));
        assert!(hourly_profile(14, false) > hourly_profile(8, false));
    }

    #[test]
    fn test_generated_rows_are_valid_records() {
        let rows = generate_rows(&mut SimpleRng::new(7));
        assert_eq!(rows.len(), 2 * 12 * DAYS_PER_MONTH as usize * 24);
        for row in rows {
            assert_eq!(row.casual + row.registered, row.count);
            assert!(row.humidity.is_some_and(|h| (0.0..=100.0).contains(&h)));
            assert!(RentalRecord::try_from(row).is_ok());
        }
    }

    #[test]
    fn test_generator_is_deterministic() {
        let a = generate_rows(&mut SimpleRng::new(42));
        let b = generate_rows(&mut SimpleRng::new(42));
        assert_eq!(a, b);
    }
}
