//! Catalog product types.

use serde::{Deserialize, Serialize};

use super::id::{MissingIdError, resolve_id};
use super::{Price, ProductId};

/// Product categories offered by the store, in display order.
pub const CATEGORIES: [&str; 4] = ["Makanan", "Minuman", "Bumbu", "Kerajinan"];

/// Description used when a product is saved without one.
pub const DEFAULT_DESCRIPTION: &str = "Deskripsi standar UMKM";

/// A catalog product.
///
/// Owned by the catalog; the cart copies it into a [`CartLine`](crate::CartLine)
/// and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    /// Stable identifier. The API may send it as `_id`, `id` or both.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URI (remote URL or local `file://` path).
    pub image: String,
    /// Free-form description.
    pub description: String,
    /// One of [`CATEGORIES`], though unknown values are kept as-is.
    pub category: String,
}

#[derive(Deserialize)]
struct ProductRecord {
    #[serde(rename = "_id")]
    underscore_id: Option<ProductId>,
    id: Option<ProductId>,
    name: String,
    price: Price,
    image: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
}

impl TryFrom<ProductRecord> for Product {
    type Error = MissingIdError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: resolve_id(record.underscore_id, record.id)?,
            name: record.name,
            price: record.price,
            image: record.image,
            description: record.description,
            category: record.category,
        })
    }
}

impl Product {
    /// Whether this product belongs to `category`.
    ///
    /// `None` stands for the "all products" tab and matches everything.
    #[must_use]
    pub fn in_category(&self, category: Option<&str>) -> bool {
        category.is_none_or(|c| self.category == c)
    }
}

/// Errors from validating a [`ProductDraft`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductDraftError {
    /// Name is empty.
    #[error("product name is required")]
    MissingName,
    /// Price is zero.
    #[error("product price is required")]
    MissingPrice,
    /// Image is empty.
    #[error("product image is required")]
    MissingImage,
}

/// Product fields as entered on the manage-product screen.
///
/// This is also the request body for creating and updating products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URI.
    pub image: String,
    /// Description; blank falls back to [`DEFAULT_DESCRIPTION`].
    #[serde(default)]
    pub description: String,
    /// Category; blank falls back to the first of [`CATEGORIES`].
    #[serde(default)]
    pub category: String,
}

impl ProductDraft {
    /// Validate required fields and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the name, price or image is missing.
    pub fn validated(mut self) -> Result<Self, ProductDraftError> {
        self.name = self.name.trim().to_owned();
        self.image = self.image.trim().to_owned();

        if self.name.is_empty() {
            return Err(ProductDraftError::MissingName);
        }
        if self.price.is_zero() {
            return Err(ProductDraftError::MissingPrice);
        }
        if self.image.is_empty() {
            return Err(ProductDraftError::MissingImage);
        }

        if self.description.trim().is_empty() {
            DEFAULT_DESCRIPTION.clone_into(&mut self.description);
        }
        if self.category.trim().is_empty() {
            CATEGORIES[0].clone_into(&mut self.category);
        }

        Ok(self)
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Pisang Nugget".to_string(),
            price: Price::new(20000),
            image: "file:///tmp/nugget.jpg".to_string(),
            description: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn test_validated_fills_defaults() {
        let draft = draft().validated().unwrap();
        assert_eq!(draft.description, DEFAULT_DESCRIPTION);
        assert_eq!(draft.category, "Makanan");
    }

    #[test]
    fn test_validated_keeps_given_values() {
        let draft = ProductDraft {
            description: "Renyah".to_string(),
            category: "Bumbu".to_string(),
            ..draft()
        }
        .validated()
        .unwrap();
        assert_eq!(draft.description, "Renyah");
        assert_eq!(draft.category, "Bumbu");
    }

    #[test]
    fn test_validated_rejects_missing_fields() {
        let no_name = ProductDraft {
            name: "  ".to_string(),
            ..draft()
        };
        assert_eq!(no_name.validated(), Err(ProductDraftError::MissingName));

        let no_price = ProductDraft {
            price: Price::ZERO,
            ..draft()
        };
        assert_eq!(no_price.validated(), Err(ProductDraftError::MissingPrice));

        let no_image = ProductDraft {
            image: String::new(),
            ..draft()
        };
        assert_eq!(no_image.validated(), Err(ProductDraftError::MissingImage));
    }

    #[test]
    fn test_product_accepts_underscore_id() {
        let json = r#"{"_id":"p1","name":"Kopi","price":75000,"image":"x"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.description, "");
        assert_eq!(product.category, "");
    }

    #[test]
    fn test_product_with_both_id_keys() {
        let json = r#"{"_id":"p1","id":"p1","name":"Kopi","price":75000,"image":"x"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.category, "");
    }

    #[test]
    fn test_in_category() {
        let product = Product {
            id: ProductId::new("1"),
            name: "Kopi".to_string(),
            price: Price::new(75000),
            image: String::new(),
            description: String::new(),
            category: "Minuman".to_string(),
        };
        assert!(product.in_category(None));
        assert!(product.in_category(Some("Minuman")));
        assert!(!product.in_category(Some("minuman")));
        assert!(!product.in_category(Some("Makanan")));
    }
}
