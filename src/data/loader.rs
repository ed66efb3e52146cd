use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Float64Type, Int64Type, TimeUnit, TimestampMicrosecondType,
};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::error::{LoadReport, RowError};
use super::model::{RentalDataset, RentalRecord, Season, Weather};

/// Columns every source file must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "datetime",
    "season",
    "workingday",
    "weather",
    "temp",
    "casual",
    "registered",
    "count",
];

/// Accepted `datetime` layouts, tried in order.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a rental dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the original hourly table, one header row
/// * `.json`    – `[{ "datetime": "...", "season": 1, ... }, ...]`
/// * `.parquet` – same columns; `datetime` as text or an Arrow timestamp
///
/// Rows that fail validation are skipped and counted in the dataset's
/// [`LoadReport`]; a missing required column fails the whole load.
pub fn load_file(path: &Path) -> Result<RentalDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (records, report) = match ext.as_str() {
        "csv" => {
            let file = File::open(path)
                .with_context(|| format!("opening CSV file {}", path.display()))?;
            read_csv(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading JSON file {}", path.display()))?;
            read_json(&text)?
        }
        "parquet" | "pq" => {
            let file = File::open(path)
                .with_context(|| format!("opening parquet file {}", path.display()))?;
            read_parquet(file)?
        }
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} rows from {} ({} skipped)",
        report.rows_kept,
        path.display(),
        report.skipped_total()
    );
    if !report.skipped.is_empty() {
        log::info!("Skipped rows by reason: {:?}", report.skipped);
    }

    Ok(RentalDataset::from_records(records, report))
}

// ---------------------------------------------------------------------------
// Raw rows and validation
// ---------------------------------------------------------------------------

/// One source row before validation. `T` is the timestamp representation:
/// text for CSV/JSON, already decoded for Parquet timestamp columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow<T = String> {
    pub datetime: T,
    pub season: i64,
    #[serde(default)]
    pub holiday: Option<i64>,
    pub workingday: i64,
    pub weather: i64,
    pub temp: f64,
    #[serde(default)]
    pub atemp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub windspeed: Option<f64>,
    pub casual: i64,
    pub registered: i64,
    pub count: i64,
}

impl<T> RawRow<T> {
    fn with_datetime<U>(self, datetime: U) -> RawRow<U> {
        RawRow {
            datetime,
            season: self.season,
            holiday: self.holiday,
            workingday: self.workingday,
            weather: self.weather,
            temp: self.temp,
            atemp: self.atemp,
            humidity: self.humidity,
            windspeed: self.windspeed,
            casual: self.casual,
            registered: self.registered,
            count: self.count,
        }
    }
}

impl TryFrom<RawRow<String>> for RentalRecord {
    type Error = RowError;

    fn try_from(row: RawRow<String>) -> Result<Self, RowError> {
        let timestamp = parse_timestamp(&row.datetime)?;
        RentalRecord::try_from(row.with_datetime(timestamp))
    }
}

impl TryFrom<RawRow<NaiveDateTime>> for RentalRecord {
    type Error = RowError;

    fn try_from(row: RawRow<NaiveDateTime>) -> Result<Self, RowError> {
        // Codes are range-checked here, so the narrowing casts below are lossless.
        Season::from_code(row.season).ok_or(RowError::UnknownSeason(row.season))?;
        Weather::from_code(row.weather).ok_or(RowError::UnknownWeather(row.weather))?;

        Ok(RentalRecord {
            timestamp: row.datetime,
            season_code: row.season as u8,
            weather_code: row.weather as u8,
            is_working_day: flag(row.workingday).ok_or(RowError::BadWorkingDay(row.workingday))?,
            is_holiday: row
                .holiday
                .map(|h| flag(h).ok_or(RowError::BadHoliday(h)))
                .transpose()?,
            temperature: finite(Some(row.temp)).ok_or(RowError::Missing("temp"))?,
            feels_like_temperature: finite(row.atemp),
            humidity: finite(row.humidity),
            wind_speed: finite(row.windspeed),
            casual_count: count("casual", row.casual)?,
            registered_count: count("registered", row.registered)?,
            total_count: count("count", row.count)?,
        })
    }
}

fn flag(value: i64) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// `NaN` and infinite cells count as missing, as they do in a data frame.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn count(column: &'static str, value: i64) -> Result<u32, RowError> {
    u32::try_from(value).map_err(|_| RowError::InvalidCount { column, value })
}

/// Parse a source timestamp such as `2011-01-01 00:00:00`.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, RowError> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| RowError::BadTimestamp(text.to_string()))
}

/// Validate one row and file it into `records` or the report.
fn ingest<T>(
    row_no: usize,
    row: Result<RawRow<T>, RowError>,
    records: &mut Vec<RentalRecord>,
    report: &mut LoadReport,
) where
    RentalRecord: TryFrom<RawRow<T>, Error = RowError>,
{
    match row.and_then(<RentalRecord as TryFrom<RawRow<T>>>::try_from) {
        Ok(record) => {
            report.record_kept();
            records.push(record);
        }
        Err(err) => report.record_skip(row_no, &err),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: a header row with at least [`REQUIRED_COLUMNS`]; `holiday`,
/// `atemp`, `humidity` and `windspeed` are optional. Extra columns are
/// ignored.
pub fn read_csv<R: Read>(source: R) -> Result<(Vec<RentalRecord>, LoadReport)> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV missing '{column}' column");
        }
    }

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    for (row_no, result) in reader.deserialize::<RawRow>().enumerate() {
        let row = result.map_err(|e| RowError::Decode(e.to_string()));
        ingest(row_no, row, &mut records, &mut report);
    }
    Ok((records, report))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "datetime": "2011-01-01 00:00:00", "season": 1, "holiday": 0,
///     "workingday": 0, "weather": 1, "temp": 9.84, "atemp": 14.395,
///     "humidity": 81, "windspeed": 0.0, "casual": 3, "registered": 13,
///     "count": 16 },
///   ...
/// ]
/// ```
pub fn read_json(text: &str) -> Result<(Vec<RentalRecord>, LoadReport)> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        for column in REQUIRED_COLUMNS {
            if !first.contains_key(column) {
                bail!("JSON records missing '{column}' key");
            }
        }
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut report = LoadReport::default();
    for (row_no, value) in rows.iter().enumerate() {
        let row = RawRow::<String>::deserialize(value).map_err(|e| RowError::Decode(e.to_string()));
        ingest(row_no, row, &mut records, &mut report);
    }
    Ok((records, report))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load rental rows from Parquet.
///
/// Numeric columns may be any integer or float type; `workingday` and
/// `holiday` may also be booleans. `datetime` may be a string column or an
/// Arrow timestamp. Works with files written by both **Pandas** and
/// **Polars**.
pub fn read_parquet(file: File) -> Result<(Vec<RentalRecord>, LoadReport)> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    {
        let schema = builder.schema();
        for column in REQUIRED_COLUMNS {
            if schema.index_of(column).is_err() {
                bail!("Parquet file missing '{column}' column");
            }
        }
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = BatchColumns::new(&batch)?;
        for row in 0..batch.num_rows() {
            ingest(row_offset + row, columns.row(row), &mut records, &mut report);
        }
        row_offset += batch.num_rows();
    }

    Ok((records, report))
}

// -- Parquet / Arrow helpers --

/// The `datetime` column, either as text or decoded timestamps.
enum TimestampColumn {
    Text(StringArray),
    Micros(arrow::array::TimestampMicrosecondArray),
}

impl TimestampColumn {
    fn new(col: &ArrayRef) -> Result<Self> {
        match col.data_type() {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                let text = cast(col.as_ref(), &DataType::Utf8).context("casting 'datetime' to text")?;
                Ok(TimestampColumn::Text(text.as_string::<i32>().clone()))
            }
            DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
                let micros = cast(col.as_ref(), &DataType::Timestamp(TimeUnit::Microsecond, None))
                    .context("casting 'datetime' to timestamp")?;
                Ok(TimestampColumn::Micros(
                    micros.as_primitive::<TimestampMicrosecondType>().clone(),
                ))
            }
            other => bail!("Unsupported 'datetime' column type {other:?}"),
        }
    }

    fn get(&self, row: usize) -> Result<NaiveDateTime, RowError> {
        match self {
            TimestampColumn::Text(arr) if arr.is_valid(row) => parse_timestamp(arr.value(row)),
            TimestampColumn::Micros(arr) if arr.is_valid(row) => arr
                .value_as_datetime(row)
                .ok_or_else(|| RowError::BadTimestamp(arr.value(row).to_string())),
            _ => Err(RowError::Missing("datetime")),
        }
    }
}

/// An integer-valued column. Float columns are kept as floats so that a
/// fractional code is rejected instead of truncated by the cast.
enum IntColumn {
    Int(Int64Array),
    Float(Float64Array),
}

impl IntColumn {
    fn new(col: &ArrayRef, name: &str) -> Result<Self> {
        match col.data_type() {
            DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => Ok(IntColumn::Float(float_column(col, name)?)),
            _ => {
                let casted = cast(col.as_ref(), &DataType::Int64)
                    .with_context(|| format!("column '{name}' is not an integer column"))?;
                Ok(IntColumn::Int(casted.as_primitive::<Int64Type>().clone()))
            }
        }
    }

    fn get(&self, row: usize, name: &'static str) -> Result<Option<i64>, RowError> {
        match self {
            IntColumn::Int(arr) => Ok(optional_value(arr, row)),
            IntColumn::Float(arr) => match optional_value(arr, row) {
                Some(v) if v.is_nan() => Ok(None),
                Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
                Some(value) => Err(RowError::NotInteger { column: name, value }),
                None => Ok(None),
            },
        }
    }

    fn required(&self, row: usize, name: &'static str) -> Result<i64, RowError> {
        self.get(row, name)?.ok_or(RowError::Missing(name))
    }
}

/// All columns of one record batch, cast to the types [`RawRow`] needs.
struct BatchColumns {
    datetime: TimestampColumn,
    season: IntColumn,
    holiday: Option<IntColumn>,
    workingday: IntColumn,
    weather: IntColumn,
    temp: Float64Array,
    atemp: Option<Float64Array>,
    humidity: Option<Float64Array>,
    windspeed: Option<Float64Array>,
    casual: IntColumn,
    registered: IntColumn,
    count: IntColumn,
}

impl BatchColumns {
    fn new(batch: &RecordBatch) -> Result<Self> {
        let required = |name: &str| {
            batch
                .column_by_name(name)
                .with_context(|| format!("Parquet batch missing '{name}' column"))
        };
        Ok(BatchColumns {
            datetime: TimestampColumn::new(required("datetime")?)?,
            season: IntColumn::new(required("season")?, "season")?,
            holiday: batch
                .column_by_name("holiday")
                .map(|c| IntColumn::new(c, "holiday"))
                .transpose()?,
            workingday: IntColumn::new(required("workingday")?, "workingday")?,
            weather: IntColumn::new(required("weather")?, "weather")?,
            temp: float_column(required("temp")?, "temp")?,
            atemp: batch.column_by_name("atemp").map(|c| float_column(c, "atemp")).transpose()?,
            humidity: batch
                .column_by_name("humidity")
                .map(|c| float_column(c, "humidity"))
                .transpose()?,
            windspeed: batch
                .column_by_name("windspeed")
                .map(|c| float_column(c, "windspeed"))
                .transpose()?,
            casual: IntColumn::new(required("casual")?, "casual")?,
            registered: IntColumn::new(required("registered")?, "registered")?,
            count: IntColumn::new(required("count")?, "count")?,
        })
    }

    fn row(&self, row: usize) -> Result<RawRow<NaiveDateTime>, RowError> {
        Ok(RawRow {
            datetime: self.datetime.get(row)?,
            season: self.season.required(row, "season")?,
            holiday: match &self.holiday {
                Some(col) => col.get(row, "holiday")?,
                None => None,
            },
            workingday: self.workingday.required(row, "workingday")?,
            weather: self.weather.required(row, "weather")?,
            temp: required_value(&self.temp, row, "temp")?,
            atemp: self.atemp.as_ref().and_then(|a| optional_value(a, row)),
            humidity: self.humidity.as_ref().and_then(|a| optional_value(a, row)),
            windspeed: self.windspeed.as_ref().and_then(|a| optional_value(a, row)),
            casual: self.casual.required(row, "casual")?,
            registered: self.registered.required(row, "registered")?,
            count: self.count.required(row, "count")?,
        })
    }
}

fn float_column(col: &ArrayRef, name: &str) -> Result<Float64Array> {
    let casted = cast(col.as_ref(), &DataType::Float64)
        .with_context(|| format!("column '{name}' is not a numeric column"))?;
    Ok(casted.as_primitive::<Float64Type>().clone())
}

fn optional_value<T: arrow::datatypes::ArrowPrimitiveType>(
    arr: &arrow::array::PrimitiveArray<T>,
    row: usize,
) -> Option<T::Native> {
    arr.is_valid(row).then(|| arr.value(row))
}

fn required_value<T: arrow::datatypes::ArrowPrimitiveType>(
    arr: &arrow::array::PrimitiveArray<T>,
    row: usize,
    name: &'static str,
) -> Result<T::Native, RowError> {
    optional_value(arr, row).ok_or(RowError::Missing(name))
}
