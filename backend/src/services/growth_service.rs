use crate::models::{DailyPoint, GrowthStats};

pub const GROWTH_WINDOW: usize = 7;

/// Compares the last 7 daily points with the 7 before them.
///
/// Returns `None` when fewer than 14 points exist; callers treat that as
/// "insufficient data", not as zero growth.
pub fn compute_growth(daily: &[DailyPoint]) -> Option<GrowthStats> {
    if daily.len() < GROWTH_WINDOW * 2 {
        return None;
    }

    let n = daily.len();
    let last_week = &daily[n - GROWTH_WINDOW..];
    let prev_week = &daily[n - 2 * GROWTH_WINDOW..n - GROWTH_WINDOW];

    let (last_qty, last_rev) = window_totals(last_week);
    let (prev_qty, prev_rev) = window_totals(prev_week);

    Some(GrowthStats {
        quantity_growth_pct: percent_change(prev_qty, last_qty),
        revenue_growth_pct: percent_change(prev_rev, last_rev),
    })
}

fn window_totals(points: &[DailyPoint]) -> (f64, f64) {
    points.iter().fold((0.0, 0.0), |(q, r), p| (q + p.quantity as f64, r + p.revenue))
}

/// Growth from a zero base counts as +100%.
fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        100.0
    } else {
        (current - previous) / previous * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn points(quantities: &[u64], revenues: &[f64]) -> Vec<DailyPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        quantities
            .iter()
            .zip(revenues)
            .enumerate()
            .map(|(i, (&quantity, &revenue))| DailyPoint {
                date: start + Duration::days(i as i64),
                quantity,
                revenue,
                avg_quantity: None,
                avg_revenue: None,
                is_peak: None,
            })
            .collect()
    }

    #[test]
    fn test_insufficient_points_yield_none() {
        let daily = points(&[1; 13], &[1.0; 13]);
        assert!(compute_growth(&daily).is_none());
        assert!(compute_growth(&[]).is_none());
    }

    #[test]
    fn test_forty_percent_growth() {
        // previous 7 sum to 100, last 7 sum to 140
        let mut quantities = vec![10, 20, 10, 20, 10, 20, 10];
        quantities.extend([20, 20, 20, 20, 20, 20, 20]);
        let revenues: Vec<f64> = quantities.iter().map(|&q| q as f64 * 2.0).collect();

        let growth = compute_growth(&points(&quantities, &revenues)).unwrap();
        assert!((growth.quantity_growth_pct - 40.0).abs() < 1e-9);
        assert!((growth.revenue_growth_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_base_is_one_hundred_percent() {
        let mut quantities = vec![0; 7];
        quantities.extend([3; 7]);
        let revenues = vec![0.0; 14];

        let growth = compute_growth(&points(&quantities, &revenues)).unwrap();
        assert_eq!(growth.quantity_growth_pct, 100.0);
        assert_eq!(growth.revenue_growth_pct, 100.0);
    }

    #[test]
    fn test_only_last_fourteen_points_count() {
        let mut quantities = vec![1000; 5];
        quantities.extend([10; 7]);
        quantities.extend([5; 7]);
        let revenues: Vec<f64> = quantities.iter().map(|&q| q as f64).collect();

        let growth = compute_growth(&points(&quantities, &revenues)).unwrap();
        assert!((growth.quantity_growth_pct + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_are_independent() {
        let quantities = vec![1; 14];
        let mut revenues = vec![10.0; 7];
        revenues.extend([5.0; 7]);

        let growth = compute_growth(&points(&quantities, &revenues)).unwrap();
        assert_eq!(growth.quantity_growth_pct, 0.0);
        assert!((growth.revenue_growth_pct + 50.0).abs() < 1e-9);
    }
}
