use std::sync::Arc;

use crate::external::sales_provider::SalesProvider;
use crate::services::failure_cache::FailureCache;

#[derive(Clone)]
pub struct AppState {
    pub sales_provider: Arc<dyn SalesProvider>,
    pub failure_cache: FailureCache,
}
