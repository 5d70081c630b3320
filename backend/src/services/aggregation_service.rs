use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{DailyPoint, DateRange, MonthlyPoint, SalesRecord};

pub const MOVING_AVERAGE_WINDOW: usize = 7;
pub const PEAK_WINDOW: usize = 5;
pub const PEAK_THRESHOLD: f64 = 1.5;

/// Records that fall strictly inside `range`, or all of them when no range is given.
pub fn filter_by_range<'a>(
    records: &'a [SalesRecord],
    range: Option<&'a DateRange>,
) -> impl Iterator<Item = &'a SalesRecord> + 'a {
    records
        .iter()
        .filter(move |r| range.map_or(true, |range| range.contains(r.date)))
}

/// Trailing arithmetic mean aligned with `values`:
/// - `None` until `window` values exist
/// - `Some(mean)` of the last `window` values (inclusive) after that
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || values.len() < window {
        return vec![None; values.len()];
    }

    let warmup = std::iter::repeat(None).take(window - 1);
    let means = values
        .windows(window)
        .map(|w| Some(w.iter().sum::<f64>() / window as f64));

    warmup.chain(means).collect()
}

/// Groups sales by calendar day, then adds the 7-day moving average and peak flags.
///
/// Output is ascending by date with one point per day that had at least one record.
pub fn compute_daily_series(records: &[SalesRecord], range: Option<&DateRange>) -> Vec<DailyPoint> {
    let mut by_day: BTreeMap<NaiveDate, (u64, f64)> = BTreeMap::new();
    for record in filter_by_range(records, range) {
        let entry = by_day.entry(record.date).or_insert((0, 0.0));
        entry.0 += record.quantity as u64;
        entry.1 += record.revenue;
    }

    let mut points: Vec<DailyPoint> = by_day
        .into_iter()
        .map(|(date, (quantity, revenue))| DailyPoint {
            date,
            quantity,
            revenue,
            avg_quantity: None,
            avg_revenue: None,
            is_peak: None,
        })
        .collect();

    apply_moving_averages(&mut points);
    apply_peak_flags(&mut points);
    points
}

fn apply_moving_averages(points: &mut [DailyPoint]) {
    let quantities: Vec<f64> = points.iter().map(|p| p.quantity as f64).collect();
    let revenues: Vec<f64> = points.iter().map(|p| p.revenue).collect();

    let avg_quantities = trailing_mean(&quantities, MOVING_AVERAGE_WINDOW);
    let avg_revenues = trailing_mean(&revenues, MOVING_AVERAGE_WINDOW);

    for ((point, avg_q), avg_r) in points.iter_mut().zip(avg_quantities).zip(avg_revenues) {
        point.avg_quantity = avg_q;
        point.avg_revenue = avg_r;
    }
}

/// Marks interior points whose quantity beats 1.5x the mean of their
/// 5 neighbours on each side. Edge points are left unflagged.
fn apply_peak_flags(points: &mut [DailyPoint]) {
    let n = points.len();
    if n < 2 * PEAK_WINDOW + 1 {
        return;
    }

    let quantities: Vec<f64> = points.iter().map(|p| p.quantity as f64).collect();

    for i in PEAK_WINDOW..n - PEAK_WINDOW {
        let before = &quantities[i - PEAK_WINDOW..i];
        let after = &quantities[i + 1..=i + PEAK_WINDOW];
        let surrounding_mean =
            (before.iter().sum::<f64>() + after.iter().sum::<f64>()) / (2 * PEAK_WINDOW) as f64;

        points[i].is_peak = Some(quantities[i] > surrounding_mean * PEAK_THRESHOLD);
    }
}

/// Groups sales by calendar month, ascending by "YYYY-MM".
pub fn compute_monthly_series(records: &[SalesRecord], range: Option<&DateRange>) -> Vec<MonthlyPoint> {
    let mut by_month: BTreeMap<(i32, u32), (u64, f64)> = BTreeMap::new();
    for record in filter_by_range(records, range) {
        let entry = by_month
            .entry((record.date.year(), record.date.month()))
            .or_insert((0, 0.0));
        entry.0 += record.quantity as u64;
        entry.1 += record.revenue;
    }

    by_month
        .into_iter()
        .map(|((year, month), (quantity, revenue))| MonthlyPoint {
            month_key: format!("{:04}-{:02}", year, month),
            month_label: month_label(year, month),
            quantity,
            revenue,
        })
        .collect()
}

/// Display form, e.g. "Mar 2024".
pub fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:04}-{:02}", year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, quantity: u32, revenue: f64) -> SalesRecord {
        SalesRecord::new(date, "M-SK-34-GRA-GPH-FLE-25S", quantity, revenue)
    }

    /// One record per day starting 2024-01-01 with the given quantities
    fn series(quantities: &[u32]) -> Vec<SalesRecord> {
        let start = day(2024, 1, 1);
        quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| record(start + Duration::days(i as i64), q, q as f64 * 10.0))
            .collect()
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(compute_daily_series(&[], None).is_empty());
        assert!(compute_monthly_series(&[], None).is_empty());
    }

    #[test]
    fn test_daily_groups_and_sorts() {
        let records = vec![
            record(day(2024, 1, 3), 1, 10.0),
            record(day(2024, 1, 1), 2, 20.0),
            record(day(2024, 1, 3), 4, 40.0),
            record(day(2024, 1, 2), 0, 0.0),
        ];

        let daily = compute_daily_series(&records, None);

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].date, day(2024, 1, 1));
        assert_eq!(daily[1].date, day(2024, 1, 2));
        assert_eq!(daily[2].date, day(2024, 1, 3));
        assert_eq!(daily[2].quantity, 5);
        assert_eq!(daily[2].revenue, 50.0);
        assert!(daily.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_moving_average_starts_at_seventh_point() {
        let daily = compute_daily_series(&series(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), None);

        for point in &daily[..6] {
            assert!(point.avg_quantity.is_none());
            assert!(point.avg_revenue.is_none());
        }
        assert_eq!(daily[6].avg_quantity, Some(4.0)); // mean of 1..=7
        assert_eq!(daily[7].avg_quantity, Some(5.0)); // mean of 2..=8
        assert_eq!(daily[8].avg_revenue, Some(60.0));
    }

    #[test]
    fn test_short_series_has_no_averages_or_peaks() {
        let daily = compute_daily_series(&series(&[5, 50, 5]), None);
        assert!(daily.iter().all(|p| p.avg_quantity.is_none() && p.is_peak.is_none()));
    }

    #[test]
    fn test_peak_detection_interior_only() {
        let mut quantities = vec![10; 15];
        quantities[7] = 16; // surrounding mean 10, 16 > 15
        quantities[0] = 100; // edge, never flagged
        quantities[14] = 100;
        let daily = compute_daily_series(&series(&quantities), None);

        for (i, point) in daily.iter().enumerate() {
            if i < PEAK_WINDOW || i >= daily.len() - PEAK_WINDOW {
                assert!(point.is_peak.is_none(), "edge point {} must not be evaluated", i);
            } else {
                assert!(point.is_peak.is_some());
            }
        }
        assert_eq!(daily[7].is_peak, Some(true));
        assert_eq!(daily[6].is_peak, Some(false));
    }

    #[test]
    fn test_peak_threshold_is_strict() {
        let mut quantities = vec![10; 11];
        quantities[5] = 15; // exactly 1.5x, not a peak
        let daily = compute_daily_series(&series(&quantities), None);
        assert_eq!(daily[5].is_peak, Some(false));
    }

    #[test]
    fn test_range_filter_is_exclusive() {
        let records = series(&[1, 1, 1, 1, 1]); // Jan 1..=5
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 5)).unwrap();

        let daily = compute_daily_series(&records, Some(&range));

        let dates: Vec<NaiveDate> = daily.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 2), day(2024, 1, 3), day(2024, 1, 4)]);
    }

    #[test]
    fn test_monthly_groups_in_order() {
        let records = vec![
            record(day(2024, 2, 10), 2, 20.0),
            record(day(2024, 1, 5), 5, 50.0),
            record(day(2024, 1, 20), 3, 30.0),
        ];

        let monthly = compute_monthly_series(&records, None);

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month_key, "2024-01");
        assert_eq!(monthly[0].quantity, 8);
        assert_eq!(monthly[0].month_label, "Jan 2024");
        assert_eq!(monthly[1].month_key, "2024-02");
        assert_eq!(monthly[1].quantity, 2);
    }

    #[test]
    fn test_monthly_crosses_year_boundary() {
        let records = vec![record(day(2024, 1, 1), 1, 1.0), record(day(2023, 12, 31), 1, 1.0)];
        let keys: Vec<String> = compute_monthly_series(&records, None)
            .into_iter()
            .map(|m| m.month_key)
            .collect();
        assert_eq!(keys, vec!["2023-12", "2024-01"]);
    }

    #[test]
    fn test_recomputation_is_identical() {
        let records = series(&[3, 9, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7]);
        assert_eq!(compute_daily_series(&records, None), compute_daily_series(&records, None));
        assert_eq!(
            compute_monthly_series(&records, None),
            compute_monthly_series(&records, None)
        );
    }

    #[test]
    fn test_trailing_mean_alignment() {
        let means = trailing_mean(&[2.0, 4.0, 6.0], 2);
        assert_eq!(means, vec![None, Some(3.0), Some(5.0)]);
        assert_eq!(trailing_mean(&[1.0], 0), vec![None]);
    }
}
