use tracing::info;

use crate::errors::AppError;
use crate::external::sales_provider::SalesProvider;
use crate::models::{AnalyticsResponse, DateRange, DemandForecast, ForecastParams, SalesBatch, SalesFeed};
use crate::services::aggregation_service::{compute_daily_series, compute_monthly_series, filter_by_range};
use crate::services::forecasting_service::{generate_forecast, validate_params};
use crate::services::growth_service::compute_growth;
use crate::utils::validate_sku_id;

/// Fetches a SKU's records and narrows them to `range`.
pub async fn get_sales(
    provider: &dyn SalesProvider,
    sku_id: &str,
    range: Option<DateRange>,
) -> Result<SalesBatch, AppError> {
    let sku_id = validate_sku_id(sku_id)?;
    let batch = provider.fetch_batch(sku_id).await?;

    let records = filter_by_range(&batch.records, range.as_ref()).cloned().collect();

    Ok(SalesBatch { records, ..batch })
}

/// Every SKU's records, narrowed to `range`.
pub async fn get_all_sales(
    provider: &dyn SalesProvider,
    range: Option<DateRange>,
) -> Result<SalesFeed, AppError> {
    let feed = provider.fetch_feed().await?;

    let records = filter_by_range(&feed.records, range.as_ref()).cloned().collect();

    Ok(SalesFeed { records, ..feed })
}

/// Daily series, monthly series and week-over-week growth for one SKU.
///
/// Everything is recomputed from the freshly fetched records.
pub async fn get_analytics(
    provider: &dyn SalesProvider,
    sku_id: &str,
    range: Option<DateRange>,
) -> Result<AnalyticsResponse, AppError> {
    let batch = get_sales(provider, sku_id, range).await?;

    let daily = compute_daily_series(&batch.records, None);
    let monthly = compute_monthly_series(&batch.records, None);
    let growth = compute_growth(&daily);

    info!(
        "Analytics for {} ({:?}): {} records, {} days, {} months, growth {}",
        batch.sku_id,
        batch.source,
        batch.records.len(),
        daily.len(),
        monthly.len(),
        if growth.is_some() { "available" } else { "insufficient data" }
    );

    Ok(AnalyticsResponse {
        sku_id: batch.sku_id,
        source: batch.source,
        record_count: batch.records.len(),
        daily,
        monthly,
        growth,
    })
}

/// Monthly history plus a demand forecast for one SKU.
pub async fn get_demand_forecast(
    provider: &dyn SalesProvider,
    sku_id: &str,
    range: Option<DateRange>,
    params: ForecastParams,
) -> Result<DemandForecast, AppError> {
    // Reject bad knobs before paying for an upstream round trip
    validate_params(&params)?;

    let batch = get_sales(provider, sku_id, range).await?;
    let history = compute_monthly_series(&batch.records, None);
    let forecast = generate_forecast(&history, &params)?;

    info!(
        "Forecast for {} ({:?}): {} history months -> {} forecast months",
        batch.sku_id,
        batch.source,
        history.len(),
        forecast.len()
    );

    Ok(DemandForecast {
        sku_id: batch.sku_id,
        source: batch.source,
        history,
        forecast,
        params,
    })
}
