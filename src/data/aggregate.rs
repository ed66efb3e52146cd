use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::model::EnrichedRecord;

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Mean `total_count` of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean<K> {
    pub key: K,
    /// `None` for a fixed-order category with no rows.
    pub mean: Option<f64>,
    /// Number of rows in the group.
    pub count: usize,
}

/// How the groups of a [`mean_by`] result are ordered.
#[derive(Debug, Clone, Copy)]
pub enum GroupOrder<'a, K> {
    /// Groups present in the data, by ascending key.
    KeyAscending,
    /// Groups present in the data, largest mean first. Ties keep key order.
    MeanDescending,
    /// Exactly these categories in this order, including empty ones.
    Fixed(&'a [K]),
}

/// Group `records` by `key` and compute the mean `total_count` per group.
pub fn mean_by<K, F>(records: &[&EnrichedRecord], key: F, order: GroupOrder<'_, K>) -> Vec<GroupMean<K>>
where
    K: Ord + Clone,
    F: Fn(&EnrichedRecord) -> K,
{
    // key -> (sum, count)
    let mut groups: BTreeMap<K, (u64, usize)> = BTreeMap::new();
    for &record in records {
        let entry = groups.entry(key(record)).or_insert((0, 0));
        entry.0 += u64::from(record.total_count());
        entry.1 += 1;
    }

    let present = |(key, (sum, count)): (K, (u64, usize))| GroupMean {
        key,
        mean: Some(sum as f64 / count as f64),
        count,
    };

    match order {
        GroupOrder::KeyAscending => groups.into_iter().map(present).collect(),
        GroupOrder::MeanDescending => {
            let mut out: Vec<GroupMean<K>> = groups.into_iter().map(present).collect();
            out.sort_by(|a, b| {
                let a = a.mean.unwrap_or(f64::NEG_INFINITY);
                let b = b.mean.unwrap_or(f64::NEG_INFINITY);
                b.total_cmp(&a)
            });
            out
        }
        GroupOrder::Fixed(categories) => categories
            .iter()
            .map(|category| match groups.get(category) {
                Some(&(sum, count)) => GroupMean {
                    key: category.clone(),
                    mean: Some(sum as f64 / count as f64),
                    count,
                },
                None => GroupMean {
                    key: category.clone(),
                    mean: None,
                    count: 0,
                },
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Headline numbers over the whole filtered set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_rentals: u64,
    /// Mean `total_count` per hourly record.
    pub mean_rentals: Option<f64>,
    pub total_casual: u64,
    pub total_registered: u64,
    pub record_count: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub mean_temperature: Option<f64>,
}

/// Compute [`SummaryMetrics`]; an empty input gives zero sums and `None` means.
pub fn summarize(records: &[&EnrichedRecord]) -> SummaryMetrics {
    let mut metrics = SummaryMetrics::default();
    let mut temperature_sum = 0.0;

    for record in records {
        let raw = &record.raw;
        metrics.total_rentals += u64::from(raw.total_count);
        metrics.total_casual += u64::from(raw.casual_count);
        metrics.total_registered += u64::from(raw.registered_count);
        temperature_sum += raw.temperature;
        metrics.first_timestamp = Some(match metrics.first_timestamp {
            Some(ts) => ts.min(raw.timestamp),
            None => raw.timestamp,
        });
        metrics.last_timestamp = Some(match metrics.last_timestamp {
            Some(ts) => ts.max(raw.timestamp),
            None => raw.timestamp,
        });
    }

    metrics.record_count = records.len();
    if !records.is_empty() {
        let n = records.len() as f64;
        metrics.mean_rentals = Some(metrics.total_rentals as f64 / n);
        metrics.mean_temperature = Some(temperature_sum / n);
    }
    metrics
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Numeric columns that take part in the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericColumn {
    Holiday,
    WorkingDay,
    Weather,
    Temp,
    Atemp,
    Humidity,
    WindSpeed,
    Casual,
    Registered,
    Count,
    Year,
    Month,
    DayOfWeek,
    Hour,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 14] = [
        NumericColumn::Holiday,
        NumericColumn::WorkingDay,
        NumericColumn::Weather,
        NumericColumn::Temp,
        NumericColumn::Atemp,
        NumericColumn::Humidity,
        NumericColumn::WindSpeed,
        NumericColumn::Casual,
        NumericColumn::Registered,
        NumericColumn::Count,
        NumericColumn::Year,
        NumericColumn::Month,
        NumericColumn::DayOfWeek,
        NumericColumn::Hour,
    ];

    /// Source column name.
    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Holiday => "holiday",
            NumericColumn::WorkingDay => "workingday",
            NumericColumn::Weather => "weather",
            NumericColumn::Temp => "temp",
            NumericColumn::Atemp => "atemp",
            NumericColumn::Humidity => "humidity",
            NumericColumn::WindSpeed => "windspeed",
            NumericColumn::Casual => "casual",
            NumericColumn::Registered => "registered",
            NumericColumn::Count => "count",
            NumericColumn::Year => "year",
            NumericColumn::Month => "month",
            NumericColumn::DayOfWeek => "dayofweek",
            NumericColumn::Hour => "hour",
        }
    }

    /// The column's value for one record; `None` when the source had no value.
    pub fn value(self, record: &EnrichedRecord) -> Option<f64> {
        let raw = &record.raw;
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match self {
            NumericColumn::Holiday => raw.is_holiday.map(flag),
            NumericColumn::WorkingDay => Some(flag(raw.is_working_day)),
            NumericColumn::Weather => Some(f64::from(raw.weather_code)),
            NumericColumn::Temp => Some(raw.temperature),
            NumericColumn::Atemp => raw.feels_like_temperature,
            NumericColumn::Humidity => raw.humidity,
            NumericColumn::WindSpeed => raw.wind_speed,
            NumericColumn::Casual => Some(f64::from(raw.casual_count)),
            NumericColumn::Registered => Some(f64::from(raw.registered_count)),
            NumericColumn::Count => Some(f64::from(raw.total_count)),
            NumericColumn::Year => Some(f64::from(record.year)),
            NumericColumn::Month => Some(f64::from(record.month)),
            NumericColumn::DayOfWeek => Some(f64::from(record.day_of_week.index())),
            NumericColumn::Hour => Some(f64::from(record.hour)),
        }
    }
}

/// Pairwise Pearson correlations. `values[i][j]` correlates `columns[i]`
/// with `columns[j]`; undefined entries are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

/// Correlate every pair of `columns` over `records`, using the rows where
/// both values are present.
pub fn correlation_matrix(records: &[&EnrichedRecord], columns: &[NumericColumn]) -> CorrelationMatrix {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|col| records.iter().map(|r| col.value(r)).collect())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        values[i][i] = if varies(series[i].iter().flatten().copied()) {
            1.0
        } else {
            f64::NAN
        };
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

/// True when at least two distinct values are present.
fn varies(mut values: impl Iterator<Item = f64>) -> bool {
    match values.next() {
        Some(first) => values.any(|v| v != first),
        None => false,
    }
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if !varies(pairs.iter().map(|p| p.0)) || !varies(pairs.iter().map(|p| p.1)) {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::enrich;
    use crate::data::derive::tests::record;
    use crate::data::model::{DayOfWeek, DayPeriod, Season};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn sample() -> Vec<EnrichedRecord> {
        vec![
            enrich(&record(0, 2, 1, false, 10)),
            enrich(&record(1, 14, 1, true, 20)),
            enrich(&record(2, 14, 2, true, 30)),
            enrich(&record(3, 20, 3, true, 100)),
        ]
    }

    #[test]
    fn test_mean_by_hour_ascending() {
        let records = sample();
        let refs: Vec<&EnrichedRecord> = records.iter().collect();
        let hourly = mean_by(&refs, |r| r.hour, GroupOrder::KeyAscending);
        let pairs: Vec<(u32, Option<f64>)> = hourly.iter().map(|g| (g.key, g.mean)).collect();
        assert_eq!(pairs, vec![(2, Some(10.0)), (14, Some(25.0)), (20, Some(100.0))]);
        assert_eq!(hourly[1].count, 2);
    }

    #[test]
    fn test_mean_by_descending_mean() {
        let records = sample();
        let refs: Vec<&EnrichedRecord> = records.iter().collect();
        let seasons = mean_by(&refs, |r| r.season, GroupOrder::MeanDescending);
        let keys: Vec<_> = seasons.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![Some(Season::Fall), Some(Season::Summer), Some(Season::Spring)]);
        assert_eq!(seasons[2].mean, Some(15.0));
    }

    #[test]
    fn test_fixed_order_reports_empty_categories() {
        let records = sample();
        let refs: Vec<&EnrichedRecord> = records.iter().collect();
        let periods = mean_by(&refs, |r| r.day_period, GroupOrder::Fixed(&DayPeriod::ALL));
        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].key, DayPeriod::Night);
        assert_eq!(periods[0].mean, Some(10.0));
        assert_eq!(periods[1].key, DayPeriod::Morning);
        assert_eq!(periods[1].mean, None);
        assert_eq!(periods[1].count, 0);
        assert_eq!(periods[2].mean, Some(25.0));
        assert_eq!(periods[3].mean, Some(100.0));
    }

    #[test]
    fn test_fixed_order_on_empty_input() {
        let weekdays = mean_by(&[], |r| r.day_of_week, GroupOrder::Fixed(&DayOfWeek::ALL));
        assert_eq!(weekdays.len(), 7);
        assert!(weekdays.iter().all(|g| g.mean.is_none() && g.count == 0));
        assert_eq!(weekdays[6].key, DayOfWeek::Sunday);

        let free = mean_by(&[], |r| r.hour, GroupOrder::KeyAscending);
        assert!(free.is_empty());
    }

    #[test]
    fn test_summarize() {
        let records = sample();
        let refs: Vec<&EnrichedRecord> = records.iter().collect();
        let m = summarize(&refs);
        assert_eq!(m.total_rentals, 160);
        assert_eq!(m.record_count, 4);
        assert_abs_diff_eq!(m.mean_rentals.unwrap(), 40.0, epsilon = 1e-12);
        assert_eq!(m.total_casual + m.total_registered, 160);
        assert_eq!(m.first_timestamp, Some(records[0].raw.timestamp));
        assert_eq!(m.last_timestamp, Some(records[3].raw.timestamp));
        assert_abs_diff_eq!(m.mean_temperature.unwrap(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_summarize_empty() {
        let m = summarize(&[]);
        assert_eq!(m.total_rentals, 0);
        assert_eq!(m.record_count, 0);
        assert_eq!(m.mean_rentals, None);
        assert_eq!(m.first_timestamp, None);
        assert_eq!(m.mean_temperature, None);
    }

    #[test]
    fn test_pearson_perfect_and_inverse() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let ys = [Some(2.0), Some(4.0), Some(6.0), Some(8.0)];
        let zs = [Some(4.0), Some(3.0), Some(2.0), Some(1.0)];
        assert_abs_diff_eq!(pearson(&xs, &ys), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pearson(&xs, &zs), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_skips_missing_pairs() {
        let xs = [Some(1.0), None, Some(3.0), Some(5.0)];
        let ys = [Some(1.0), Some(100.0), Some(3.0), Some(5.0)];
        assert_abs_diff_eq!(pearson(&xs, &ys), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_constant_column_is_nan() {
        let xs = [Some(1.0), Some(1.0), Some(1.0)];
        let ys = [Some(1.0), Some(2.0), Some(3.0)];
        assert!(pearson(&xs, &ys).is_nan());
        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_nan());
    }

    #[test]
    fn test_correlation_matrix_shape_and_symmetry() {
        let records = sample();
        let refs: Vec<&EnrichedRecord> = records.iter().collect();
        let m = correlation_matrix(&refs, &NumericColumn::ALL);
        assert_eq!(m.len(), NumericColumn::ALL.len());

        for i in 0..m.len() {
            for j in 0..m.len() {
                let (a, b) = (m.get(i, j), m.get(j, i));
                assert!(a == b || (a.is_nan() && b.is_nan()));
                if !a.is_nan() {
                    assert!((-1.0..=1.0).contains(&a));
                }
            }
        }

        let idx = |c: NumericColumn| m.columns.iter().position(|&x| x == c).unwrap();
        // count varies across the sample, temp is constant.
        assert_eq!(m.get(idx(NumericColumn::Count), idx(NumericColumn::Count)), 1.0);
        assert!(m.get(idx(NumericColumn::Temp), idx(NumericColumn::Temp)).is_nan());
        assert!(m.get(idx(NumericColumn::Temp), idx(NumericColumn::Count)).is_nan());
    }

    proptest! {
        #[test]
        fn prop_group_counts_cover_input(
            rows in prop::collection::vec((0u32..700, 0u32..24, 1u8..5, any::<bool>(), 0u32..1000), 0..60)
        ) {
            let records: Vec<EnrichedRecord> = rows
                .iter()
                .map(|&(day, hour, season, working, count)| enrich(&record(day, hour, season, working, count)))
                .collect();
            let refs: Vec<&EnrichedRecord> = records.iter().collect();

            let hourly = mean_by(&refs, |r| r.hour, GroupOrder::KeyAscending);
            prop_assert_eq!(hourly.iter().map(|g| g.count).sum::<usize>(), refs.len());

            let seasons = mean_by(&refs, |r| r.season, GroupOrder::MeanDescending);
            prop_assert_eq!(seasons.iter().map(|g| g.count).sum::<usize>(), refs.len());
            for pair in seasons.windows(2) {
                prop_assert!(pair[0].mean >= pair[1].mean);
            }

            let weekdays = mean_by(&refs, |r| r.day_of_week, GroupOrder::Fixed(&DayOfWeek::ALL));
            prop_assert_eq!(weekdays.len(), 7);
            prop_assert_eq!(
                weekdays.iter().filter(|g| g.mean.is_some()).map(|g| g.count).sum::<usize>(),
                refs.len()
            );
        }
    }
}
