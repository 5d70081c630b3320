use std::ops::Range;

use chrono::{Datelike, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::models::{ForecastParams, ForecastPoint, MonthlyPoint};
use crate::utils::stable_seed;

pub const MIN_HISTORY_POINTS: usize = 2;
pub const MAX_HORIZON_MONTHS: u32 = 36;
pub const MIN_CONFIDENCE_LEVEL: u32 = 50;
pub const MAX_CONFIDENCE_LEVEL: u32 = 99;

const TREND_WEIGHT_BASE: f64 = 1.2;
const TREND_DAMPENING: f64 = 0.7;
const SEASONAL_MIN_POINTS: usize = 6;
const SEASON_LENGTH: usize = 12;
const STEP_GROWTH_FLOOR: Range<f64> = 0.03..0.05;
const REPAIR_GROWTH: Range<f64> = 0.01..0.05;
const UPPER_BAND_SKEW: f64 = 1.2;
const REPAIR_BAND: f64 = 0.10;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("need at least {required} monthly data points to forecast, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("{0}")]
    InvalidParams(String),
}

pub fn validate_params(params: &ForecastParams) -> Result<(), ForecastError> {
    if params.horizon_months == 0 || params.horizon_months > MAX_HORIZON_MONTHS {
        return Err(ForecastError::InvalidParams(format!(
            "Forecast horizon must be between 1 and {} months, got {}",
            MAX_HORIZON_MONTHS, params.horizon_months
        )));
    }

    if !(MIN_CONFIDENCE_LEVEL..=MAX_CONFIDENCE_LEVEL).contains(&params.confidence_level) {
        return Err(ForecastError::InvalidParams(format!(
            "Confidence level must be between {} and {}, got {}",
            MIN_CONFIDENCE_LEVEL, MAX_CONFIDENCE_LEVEL, params.confidence_level
        )));
    }

    Ok(())
}

/// Extrapolates monthly demand from a chronological monthly history.
///
/// The heuristic never forecasts a decline: seasonal dips are ignored and a
/// non-increasing series is replaced by a compounding growth curve. Randomness
/// is seeded from the inputs, so identical calls return identical forecasts.
pub fn generate_forecast(
    history: &[MonthlyPoint],
    params: &ForecastParams,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    let mut rng = StdRng::seed_from_u64(forecast_seed(history, params));
    generate_forecast_with_rng(history, params, &mut rng)
}

pub fn generate_forecast_with_rng<R: Rng + ?Sized>(
    history: &[MonthlyPoint],
    params: &ForecastParams,
    rng: &mut R,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    validate_params(params)?;

    if history.len() < MIN_HISTORY_POINTS {
        return Err(ForecastError::InsufficientData {
            required: MIN_HISTORY_POINTS,
            actual: history.len(),
        });
    }

    let quantities: Vec<f64> = history.iter().map(|p| p.quantity as f64).collect();
    let n = quantities.len();
    let average = quantities.iter().sum::<f64>() / n as f64;
    let trend = weighted_trend(&quantities);

    let seasonal = if params.seasonal_adjustment && n >= SEASONAL_MIN_POINTS {
        seasonal_pattern(history, average)
    } else {
        [None; SEASON_LENGTH]
    };

    let std_dev = match population_std_dev(&quantities, average) {
        sd if sd > 0.0 => sd,
        _ => average * 0.1,
    };
    let spread = std_dev * (100 - params.confidence_level) as f64 / 25.0;

    debug!(
        "Forecasting {} months from {} points: average={:.2}, trend={:.3}, std_dev={:.2}",
        params.horizon_months, n, average, trend, std_dev
    );

    let last_month = history.last().map(|p| p.month_key.as_str()).unwrap_or_default();
    let month_keys = following_month_keys(last_month, params.horizon_months)?;

    let mut forecast: Vec<ForecastPoint> = Vec::with_capacity(month_keys.len());
    let mut previous = quantities[n - 1];
    let mut previous_lower = 1.0_f64;

    for month_key in month_keys {
        let floor_rate = rng.random_range(STEP_GROWTH_FLOOR);
        let base = (previous + trend).max(previous * (1.0 + floor_rate));

        let ratio = month_index(&month_key)
            .and_then(|m| seasonal[m])
            .unwrap_or(1.0)
            .max(1.0);

        let predicted = (base * ratio).round().max(1.0);
        let lower = (predicted - spread).max(previous_lower).max(1.0).floor().min(predicted);
        let upper = (predicted + spread * UPPER_BAND_SKEW).ceil();

        forecast.push(ForecastPoint {
            month_key,
            predicted_demand: predicted as u64,
            lower_bound: lower as u64,
            upper_bound: upper as u64,
        });

        previous = predicted;
        previous_lower = lower;
    }

    if !is_strictly_increasing(&forecast) {
        debug!("Forecast not strictly increasing, regenerating as compounding growth");
        repair_monotonicity(&mut forecast, rng);
    }

    Ok(forecast)
}

/// Weighted mean of consecutive differences, later differences weighted by
/// 1.2^k, then dampened.
fn weighted_trend(quantities: &[f64]) -> f64 {
    let (weighted_sum, total_weight) = quantities
        .windows(2)
        .enumerate()
        .fold((0.0, 0.0), |(sum, weights), (k, pair)| {
            let weight = TREND_WEIGHT_BASE.powi(k as i32);
            (sum + (pair[1] - pair[0]) * weight, weights + weight)
        });

    if total_weight == 0.0 {
        0.0
    } else {
        weighted_sum / total_weight * TREND_DAMPENING
    }
}

/// Ratio of each calendar month's average demand to the overall average.
/// Months absent from the history have no ratio.
fn seasonal_pattern(history: &[MonthlyPoint], average: f64) -> [Option<f64>; SEASON_LENGTH] {
    let mut totals = [(0.0_f64, 0_usize); SEASON_LENGTH];
    for point in history {
        if let Some(m) = month_index(&point.month_key) {
            totals[m].0 += point.quantity as f64;
            totals[m].1 += 1;
        }
    }

    totals.map(|(sum, count)| match count {
        0 => None,
        _ if average == 0.0 => Some(1.0),
        _ => Some(sum / count as f64 / average),
    })
}

/// Zero-based calendar month of a "YYYY-MM" key.
fn month_index(month_key: &str) -> Option<usize> {
    NaiveDate::parse_from_str(&format!("{}-01", month_key), "%Y-%m-%d")
        .ok()
        .map(|d| d.month0() as usize)
}

fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn following_month_keys(last_month_key: &str, count: u32) -> Result<Vec<String>, ForecastError> {
    let first_of_month = NaiveDate::parse_from_str(&format!("{}-01", last_month_key), "%Y-%m-%d")
        .map_err(|_| ForecastError::InvalidParams(format!("Invalid month key '{}'", last_month_key)))?;

    (1..=count)
        .map(|i| {
            first_of_month
                .checked_add_months(Months::new(i))
                .map(|d| d.format("%Y-%m").to_string())
                .ok_or_else(|| ForecastError::InvalidParams("Forecast runs past the supported calendar".into()))
        })
        .collect()
}

fn is_strictly_increasing(points: &[ForecastPoint]) -> bool {
    points
        .windows(2)
        .all(|w| w[1].predicted_demand > w[0].predicted_demand)
}

/// Keeps the first step and rebuilds the rest as 1-5% compounding growth,
/// with bands of +/-10% around every prediction.
fn repair_monotonicity<R: Rng + ?Sized>(points: &mut [ForecastPoint], rng: &mut R) {
    let mut previous: Option<u64> = None;

    for point in points.iter_mut() {
        let predicted = match previous {
            None => point.predicted_demand.max(1),
            Some(prev) => {
                let growth = rng.random_range(REPAIR_GROWTH);
                let grown = (prev as f64 * (1.0 + growth)).round() as u64;
                grown.max(prev + 1)
            }
        };

        let band = (predicted as f64 * REPAIR_BAND).round() as u64;
        point.predicted_demand = predicted;
        point.lower_bound = predicted.saturating_sub(band).max(1);
        point.upper_bound = predicted + band;
        previous = Some(predicted);
    }
}

fn forecast_seed(history: &[MonthlyPoint], params: &ForecastParams) -> u64 {
    let mut chunks: Vec<Vec<u8>> = history
        .iter()
        .map(|p| format!("{}={}", p.month_key, p.quantity).into_bytes())
        .collect();
    chunks.push(
        format!(
            "{}/{}/{}",
            params.horizon_months, params.confidence_level, params.seasonal_adjustment
        )
        .into_bytes(),
    );
    stable_seed(chunks.iter().map(|c| c.as_slice()))
}
