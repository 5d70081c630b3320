pub(crate) mod analytics;
pub(crate) mod forecast;
pub(crate) mod health;
pub(crate) mod sales;
pub(crate) mod skus;

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::DateRange;

/// Only a complete `start`/`end` pair narrows the data.
pub(crate) fn parse_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Option<DateRange>, AppError> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some(DateRange::new(start, end)?)),
        (None, None) => Ok(None),
        _ => Err(AppError::Validation(
            "Both start and end must be provided for a date range".to_string(),
        )),
    }
}
