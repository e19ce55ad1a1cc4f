//! Product browsing and admin product management.

use lapak_core::{Product, ProductDraft, ProductDraftError, ProductId};
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError};

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with this ID.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The draft failed validation; nothing was sent.
    #[error("invalid product: {0}")]
    InvalidDraft(#[from] ProductDraftError),

    /// The API request failed.
    #[error(transparent)]
    Api(ApiError),
}

/// Catalog backed by the store API.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    /// Catalog using `api`.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Products in `category`, or all products for `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn products(&self, category: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        let products = self.api.list_products().await.map_err(CatalogError::Api)?;
        Ok(filter_by_category(products, category))
    }

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this ID.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.api
            .list_products()
            .await
            .map_err(CatalogError::Api)?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Validate and create a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidDraft`] before any request if required
    /// fields are missing.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let draft = draft.validated()?;
        let product = self
            .api
            .create_product(&draft)
            .await
            .map_err(CatalogError::Api)?;
        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Validate and replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidDraft`] before any request if required
    /// fields are missing, or [`CatalogError::NotFound`] if the product is gone.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update(&self, id: &ProductId, draft: ProductDraft) -> Result<Product, CatalogError> {
        let draft = draft.validated()?;
        let product = self
            .api
            .update_product(id, &draft)
            .await
            .map_err(|e| not_found_or(e, id))?;
        info!("Product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product is gone.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        self.api
            .delete_product(id)
            .await
            .map_err(|e| not_found_or(e, id))?;
        info!("Product deleted");
        Ok(())
    }
}

fn not_found_or(error: ApiError, id: &ProductId) -> CatalogError {
    match error {
        ApiError::NotFound(_) => CatalogError::NotFound(id.clone()),
        other => CatalogError::Api(other),
    }
}

/// Keep the products in `category`, preserving order. `None` keeps all.
#[must_use]
pub fn filter_by_category(products: Vec<Product>, category: Option<&str>) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.in_category(category))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lapak_core::Price;
    use url::Url;

    use super::*;
    use crate::config::ApiConfig;

    fn product(id: &str, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Produk {id}"),
            price: Price::new(10000),
            image: "https://example.com/p.jpg".to_string(),
            description: String::new(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_filter_by_category() {
        let products = vec![
            product("1", "Minuman"),
            product("2", "Makanan"),
            product("3", "Minuman"),
        ];

        let all = filter_by_category(products.clone(), None);
        assert_eq!(all.len(), 3);

        let drinks: Vec<_> = filter_by_category(products.clone(), Some("Minuman"))
            .into_iter()
            .map(|p| p.id.into_inner())
            .collect();
        assert_eq!(drinks, ["1", "3"]);

        assert!(filter_by_category(products, Some("minuman")).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_is_rejected_before_request() {
        // Nothing listens here; reaching the network would yield an Api error.
        let api = ApiClient::new(&ApiConfig::new(Url::parse("http://127.0.0.1:9").unwrap())).unwrap();
        let catalog = Catalog::new(api);

        let err = catalog.create(ProductDraft::default()).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidDraft(ProductDraftError::MissingName)
        ));
    }

    #[test]
    fn test_not_found_maps_to_product_id() {
        let err = not_found_or(ApiError::NotFound("gone".to_string()), &ProductId::new("7"));
        assert!(matches!(err, CatalogError::NotFound(ref id) if id.as_str() == "7"));

        let err = not_found_or(ApiError::RateLimited(1), &ProductId::new("7"));
        assert!(matches!(err, CatalogError::Api(ApiError::RateLimited(1))));
    }
}
