use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::sales_provider::{SalesProvider, SalesProviderError};
use crate::models::{SalesRecord, SkuSummary};
use crate::utils::stable_seed;

const HISTORY_DAYS: i64 = 365;
const NO_SALE_PROBABILITY: f64 = 0.15;
const MAX_DISCOUNT: f64 = 0.2;

/// Synthetic sales used when the real backend cannot answer.
///
/// Output depends only on the SKU and the anchor date, so two requests on the
/// same day see the same history.
#[derive(Debug, Clone, Default)]
pub struct MockSalesProvider {
    anchor: Option<NaiveDate>,
}

impl MockSalesProvider {
    pub fn new() -> Self {
        Self { anchor: None }
    }

    /// Pins "today" instead of reading the clock.
    pub fn anchored_at(anchor: NaiveDate) -> Self {
        Self { anchor: Some(anchor) }
    }

    fn today(&self) -> NaiveDate {
        self.anchor.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[async_trait]
impl SalesProvider for MockSalesProvider {
    async fn fetch_sales_records(&self, sku_id: &str) -> Result<Vec<SalesRecord>, SalesProviderError> {
        Ok(generate_mock_sales(sku_id, self.today()))
    }

    async fn fetch_all_sales(&self) -> Result<Vec<SalesRecord>, SalesProviderError> {
        Ok(generate_mock_catalog_sales(self.today()))
    }

    async fn list_skus(&self) -> Result<Vec<SkuSummary>, SalesProviderError> {
        Ok(mock_catalog())
    }
}

/// List price by SKU naming pattern.
pub fn base_price_for_sku(sku_id: &str) -> f64 {
    if sku_id.contains("SK") {
        40.14
    } else if sku_id.contains("SHR") {
        125.05
    } else if sku_id.contains("JKT") {
        215.99
    } else {
        50.00
    }
}

fn seed_for(sku_id: &str, today: NaiveDate) -> u64 {
    stable_seed([sku_id.as_bytes(), today.to_string().as_bytes()])
}

/// A year of daily transactions ending at `today`.
///
/// Volume follows a weekend lift, quarter-end seasonal peaks and a mild upward
/// trend; some days have no sales at all.
pub fn generate_mock_sales(sku_id: &str, today: NaiveDate) -> Vec<SalesRecord> {
    let mut rng = StdRng::seed_from_u64(seed_for(sku_id, today));
    let base_price = base_price_for_sku(sku_id);
    let mut records = Vec::new();

    for position in 0..HISTORY_DAYS {
        let date = today - Duration::days(HISTORY_DAYS - 1 - position);

        if rng.random_bool(NO_SALE_PROBABILITY) {
            continue;
        }

        let seasonal = if date.month() % 3 == 0 { 1.5 } else { 1.0 };
        let weekly = match date.weekday() {
            Weekday::Sat | Weekday::Sun => 1.3,
            _ => 1.0,
        };
        let growth = 0.9 + (position as f64 / HISTORY_DAYS as f64) * 0.25;

        let expected = 3.0 * seasonal * weekly * growth;
        let quantity = (expected + rng.random_range(-1.5..1.5)).round().max(1.0) as u32;

        // Busy days are sometimes rung up as two separate transactions
        let lines = if quantity >= 2 && rng.random_bool(0.4) {
            let first = rng.random_range(1..quantity);
            vec![first, quantity - first]
        } else {
            vec![quantity]
        };

        for line_quantity in lines {
            let discount = rng.random_range(0.0..MAX_DISCOUNT);
            let revenue = base_price * (1.0 - discount) * line_quantity as f64;
            records.push(SalesRecord::new(
                date,
                sku_id,
                line_quantity,
                (revenue * 100.0).round() / 100.0,
            ));
        }
    }

    records
}

/// Synthetic history for every catalog SKU, in date order.
pub fn generate_mock_catalog_sales(today: NaiveDate) -> Vec<SalesRecord> {
    let mut records: Vec<SalesRecord> = mock_catalog()
        .iter()
        .flat_map(|sku| generate_mock_sales(&sku.sku_id, today))
        .collect();
    records.sort_by_key(|r| r.date);
    records
}

/// Fixed catalog offered when the SKU listing is unavailable.
pub fn mock_catalog() -> Vec<SkuSummary> {
    [
        ("M-SK-34-GRA-GPH-FLE-25S", "Graphic Fleece Skirt", "Skirt", 96),
        ("M-SHR-M-CRE-STR-SAT-25F", "Stripe Satin Shorts", "Shorts", 90),
        ("M-JKT-L-BLK-PLN-LEA-30W", "Plain Leather Jacket", "Jacket", 42),
    ]
    .into_iter()
    .map(|(sku_id, name, category, stock)| SkuSummary {
        sku_id: sku_id.to_string(),
        product_name: Some(name.to_string()),
        category: Some(category.to_string()),
        brand: Some("Aurora Fashion".to_string()),
        price: Some(base_price_for_sku(sku_id)),
        stock_quantity: Some(stock),
    })
    .collect()
}
