use async_trait::async_trait;
use tracing::{info, warn};

use crate::external::mock::MockSalesProvider;
use crate::external::sales_provider::{SalesProvider, SalesProviderError};
use crate::models::{DataSource, SalesBatch, SalesFeed, SalesRecord, SkuSummary};
use crate::services::failure_cache::{FailureCache, FailureType};

/// Fetches from the real backend and substitutes synthetic data when it fails.
///
/// Strategy:
/// 1. If the SKU failed recently, go straight to synthetic data
/// 2. Otherwise ask the primary provider
/// 3. Errors and empty answers are remembered and answered with synthetic data
///
/// With fallback disabled, primary errors surface to the caller unchanged.
pub struct FallbackSalesProvider {
    primary: Box<dyn SalesProvider>,
    mock: MockSalesProvider,
    failure_cache: FailureCache,
    fallback_enabled: bool,
}

impl FallbackSalesProvider {
    pub fn new(
        primary: Box<dyn SalesProvider>,
        mock: MockSalesProvider,
        failure_cache: FailureCache,
        fallback_enabled: bool,
    ) -> Self {
        Self {
            primary,
            mock,
            failure_cache,
            fallback_enabled,
        }
    }

    async fn mock_batch(&self, sku_id: &str) -> Result<SalesBatch, SalesProviderError> {
        let records = self.mock.fetch_sales_records(sku_id).await?;
        Ok(SalesBatch {
            sku_id: sku_id.to_string(),
            source: DataSource::Mock,
            records,
        })
    }

    async fn mock_feed(&self) -> Result<SalesFeed, SalesProviderError> {
        let records = self.mock.fetch_all_sales().await?;
        Ok(SalesFeed {
            source: DataSource::Mock,
            records,
        })
    }
}

#[async_trait]
impl SalesProvider for FallbackSalesProvider {
    async fn fetch_sales_records(&self, sku_id: &str) -> Result<Vec<SalesRecord>, SalesProviderError> {
        self.fetch_batch(sku_id).await.map(|batch| batch.records)
    }

    async fn fetch_all_sales(&self) -> Result<Vec<SalesRecord>, SalesProviderError> {
        self.fetch_feed().await.map(|feed| feed.records)
    }

    async fn list_skus(&self) -> Result<Vec<SkuSummary>, SalesProviderError> {
        match self.primary.list_skus().await {
            Ok(skus) if !skus.is_empty() => return Ok(skus),
            Ok(_) => info!("Upstream returned no SKUs"),
            Err(e) if !self.fallback_enabled => return Err(e),
            Err(e) => warn!("Upstream SKU listing failed: {}", e),
        }

        if !self.fallback_enabled {
            return Ok(Vec::new());
        }

        info!("Serving mock SKU catalog");
        self.mock.list_skus().await
    }

    async fn fetch_batch(&self, sku_id: &str) -> Result<SalesBatch, SalesProviderError> {
        if self.fallback_enabled {
            if let Some(failure) = self.failure_cache.is_failed(sku_id) {
                info!(
                    "Skipping upstream for SKU {} (failed {:?} at {}), using mock data",
                    sku_id, failure.error_type, failure.failed_at
                );
                return self.mock_batch(sku_id).await;
            }
        }

        match self.primary.fetch_sales_records(sku_id).await {
            Ok(records) if !records.is_empty() => {
                self.failure_cache.clear(sku_id);
                Ok(SalesBatch {
                    sku_id: sku_id.to_string(),
                    source: DataSource::Upstream,
                    records,
                })
            }
            Ok(records) => {
                if !self.fallback_enabled {
                    return Ok(SalesBatch {
                        sku_id: sku_id.to_string(),
                        source: DataSource::Upstream,
                        records,
                    });
                }
                info!("Upstream returned no sales for SKU {}, falling back to mock data", sku_id);
                self.failure_cache.record_failure(sku_id, FailureType::Empty);
                self.mock_batch(sku_id).await
            }
            Err(e) => {
                if !self.fallback_enabled {
                    return Err(e);
                }
                warn!("Upstream fetch failed for SKU {}: {}. Falling back to mock data", sku_id, e);
                self.failure_cache.record_failure(sku_id, FailureType::from(&e));
                self.mock_batch(sku_id).await
            }
        }
    }

    /// The whole sales table. Not tracked in the failure cache, which is per SKU.
    async fn fetch_feed(&self) -> Result<SalesFeed, SalesProviderError> {
        match self.primary.fetch_all_sales().await {
            Ok(records) if !records.is_empty() || !self.fallback_enabled => Ok(SalesFeed {
                source: DataSource::Upstream,
                records,
            }),
            Ok(_) => {
                info!("Upstream returned no sales, falling back to mock data");
                self.mock_feed().await
            }
            Err(e) if !self.fallback_enabled => Err(e),
            Err(e) => {
                warn!("Upstream sales fetch failed: {}. Falling back to mock data", e);
                self.mock_feed().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubProvider {
        calls: Arc<AtomicUsize>,
        result: fn() -> Result<Vec<SalesRecord>, SalesProviderError>,
    }

    #[async_trait]
    impl SalesProvider for StubProvider {
        async fn fetch_sales_records(&self, _sku_id: &str) -> Result<Vec<SalesRecord>, SalesProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }

        async fn fetch_all_sales(&self) -> Result<Vec<SalesRecord>, SalesProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }

        async fn list_skus(&self) -> Result<Vec<SkuSummary>, SalesProviderError> {
            Err(SalesProviderError::Timeout)
        }
    }

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn provider(
        result: fn() -> Result<Vec<SalesRecord>, SalesProviderError>,
        fallback_enabled: bool,
    ) -> (FallbackSalesProvider, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let stub = StubProvider { calls: calls.clone(), result };
        let provider = FallbackSalesProvider::new(
            Box::new(stub),
            MockSalesProvider::anchored_at(anchor()),
            FailureCache::new(Duration::minutes(5)),
            fallback_enabled,
        );
        (provider, calls)
    }

    fn one_sale() -> Result<Vec<SalesRecord>, SalesProviderError> {
        Ok(vec![SalesRecord::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "SKU", 2, 20.0)])
    }

    fn timeout() -> Result<Vec<SalesRecord>, SalesProviderError> {
        Err(SalesProviderError::Timeout)
    }

    fn nothing() -> Result<Vec<SalesRecord>, SalesProviderError> {
        Ok(Vec::new())
    }

    #[tokio::test]
    async fn test_upstream_data_is_passed_through() {
        let (provider, _) = provider(one_sale, true);
        let batch = provider.fetch_batch("SKU").await.unwrap();
        assert_eq!(batch.source, DataSource::Upstream);
        assert_eq!(batch.records.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_is_remembered() {
        let (provider, calls) = provider(timeout, true);

        let first = provider.fetch_batch("SKU").await.unwrap();
        assert_eq!(first.source, DataSource::Mock);
        assert!(!first.records.is_empty());

        // Second request is served from mock without touching upstream
        let second = provider.fetch_batch("SKU").await.unwrap();
        assert_eq!(second.source, DataSource::Mock);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.records, second.records);
    }

    #[tokio::test]
    async fn test_empty_upstream_falls_back() {
        let (provider, _) = provider(nothing, true);
        let batch = provider.fetch_batch("SKU").await.unwrap();
        assert_eq!(batch.source, DataSource::Mock);
    }

    #[tokio::test]
    async fn test_disabled_fallback_surfaces_errors() {
        let (provider, _) = provider(timeout, false);
        let result = provider.fetch_batch("SKU").await;
        assert!(matches!(result, Err(SalesProviderError::Timeout)));
    }

    #[tokio::test]
    async fn test_feed_passes_upstream_rows_through() {
        let (provider, _) = provider(one_sale, true);
        let feed = provider.fetch_feed().await.unwrap();
        assert_eq!(feed.source, DataSource::Upstream);
        assert_eq!(feed.records.len(), 1);
    }

    #[tokio::test]
    async fn test_feed_falls_back_to_catalog_sales() {
        let failing: [fn() -> Result<Vec<SalesRecord>, SalesProviderError>; 2] = [timeout, nothing];
        for result in failing {
            let (fallback, calls) = provider(result, true);
            let feed = fallback.fetch_feed().await.unwrap();

            assert_eq!(feed.source, DataSource::Mock);
            assert!(feed.records.iter().any(|r| r.product_id.contains("JKT")));
            assert!(feed.records.iter().any(|r| r.product_id.contains("SHR")));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_feed_without_fallback() {
        let (failing, _) = provider(timeout, false);
        assert!(matches!(failing.fetch_feed().await, Err(SalesProviderError::Timeout)));

        let (empty, _) = provider(nothing, false);
        let feed = empty.fetch_feed().await.unwrap();
        assert_eq!(feed.source, DataSource::Upstream);
        assert!(feed.records.is_empty());
    }

    #[tokio::test]
    async fn test_sku_listing_falls_back_to_catalog() {
        let (provider, _) = provider(one_sale, true);
        let skus = provider.list_skus().await.unwrap();
        assert_eq!(skus.len(), 3);
    }
}
