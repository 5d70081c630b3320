use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::external::sales_provider::SalesProviderError;

/// Information about a failed upstream fetch for a SKU
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
    pub ttl: Duration,
}

impl FailureInfo {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.failed_at + self.ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureType {
    Unreachable, // Network error or timeout
    BadResponse, // Non-2xx or unparseable body
    Empty,       // Answered, but with no rows
}

impl From<&SalesProviderError> for FailureType {
    fn from(err: &SalesProviderError) -> Self {
        match err {
            SalesProviderError::Network(_) | SalesProviderError::Timeout => FailureType::Unreachable,
            SalesProviderError::BadResponse(_) | SalesProviderError::Parse(_) => FailureType::BadResponse,
        }
    }
}

/// Thread-safe memory of SKUs whose upstream fetch recently failed,
/// so repeated requests can skip the slow upstream round trip.
#[derive(Clone)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
    base_ttl: Duration,
}

impl FailureCache {
    pub fn new(base_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            base_ttl,
        }
    }

    /// Check if a SKU is in the failure cache and the failure is still valid
    pub fn is_failed(&self, sku_id: &str) -> Option<FailureInfo> {
        let now = Utc::now();
        let info = self.cache.get(sku_id)?.value().clone();
        if !info.is_expired(now) {
            return Some(info);
        }

        self.evict_if_expired(sku_id, now);
        None
    }

    /// Re-checks under the write lock, so a failure recorded after `now` stays.
    fn evict_if_expired(&self, sku_id: &str, now: DateTime<Utc>) {
        self.cache.remove_if(sku_id, |_, current| current.is_expired(now));
    }

    pub fn record_failure(&self, sku_id: &str, error_type: FailureType) {
        let ttl = match error_type {
            FailureType::Unreachable => self.base_ttl,
            FailureType::BadResponse => self.base_ttl * 2,
            FailureType::Empty => self.base_ttl,
        };

        let info = FailureInfo {
            failed_at: Utc::now(),
            error_type,
            ttl,
        };

        self.cache.insert(sku_id.to_string(), info);
    }

    /// Forget a SKU (e.g., after a successful fetch)
    pub fn clear(&self, sku_id: &str) {
        self.cache.remove(sku_id);
    }

    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.cache.retain(|_, info| !info.is_expired(now));
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
