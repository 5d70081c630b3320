pub mod fallback_provider;
pub mod graphql;
pub mod mock;
pub mod pos_api;
pub mod sales_provider;
