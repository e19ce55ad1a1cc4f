//! Cache types for API responses.

use std::sync::Arc;

use lapak_core::Product;

/// Cache key for catalog data.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
}
