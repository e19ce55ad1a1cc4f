//! Admin commands: product management, the order queue, catalog seeding.
//!
//! Every command here refuses to run unless the session role is admin.
//!
//! # Usage
//!
//! ```bash
//! lapak role switch
//! lapak admin product add --name "Sambal Roa Botol" --price 35000 --image https://... --category Bumbu
//! lapak admin order status 665f1c2abc123ef99 proses
//! lapak admin seed crates/cli/seed/products.yaml
//! ```

use std::path::Path;

use lapak_core::{OrderId, OrderStatus, Price, ProductDraft, ProductId};
use lapak_storefront::error::{AppError, Result};
use serde::Deserialize;
use tracing::{error, info};

use crate::app::App;
use crate::output;

/// Product fields given on the command line. Unset fields keep their current
/// value when editing.
#[derive(Debug, Default)]
pub struct ProductFields {
    pub name: Option<String>,
    pub price: Option<u64>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ProductFields {
    fn apply(self, draft: &mut ProductDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(price) = self.price {
            draft.price = Price::new(price);
        }
        if let Some(image) = self.image {
            draft.image = image;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
    }
}

/// Create a product.
pub async fn add_product(app: &App, fields: ProductFields) -> Result<()> {
    app.require_admin("tambah produk")?;
    let mut draft = ProductDraft::default();
    fields.apply(&mut draft);

    let product = app.catalog.create(draft).await?;
    output::line(format_args!("Produk {} dibuat ({}).", product.name, product.id));
    Ok(())
}

/// Edit a product; unset fields keep their current value.
pub async fn edit_product(app: &App, id: &str, fields: ProductFields) -> Result<()> {
    app.require_admin("ubah produk")?;
    let id = ProductId::new(id);
    let current = app.catalog.product(&id).await?;
    let mut draft = ProductDraft::from(&current);
    fields.apply(&mut draft);

    let product = app.catalog.update(&id, draft).await?;
    output::line(format_args!("Produk {} diperbarui.", product.name));
    Ok(())
}

/// Delete a product.
pub async fn delete_product(app: &App, id: &str) -> Result<()> {
    app.require_admin("hapus produk")?;
    app.catalog.delete(&ProductId::new(id)).await?;
    output::line(format_args!("Produk {id} dihapus."));
    Ok(())
}

/// Move an order to a new status (`baru`, `proses`, `selesai`).
pub async fn set_order_status(app: &App, id: &str, status: &str) -> Result<()> {
    app.require_admin("ubah status pesanan")?;
    let status: OrderStatus = status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Status tidak dikenal: {status}")))?;

    let order = app.orders.set_status(&OrderId::new(id), status).await?;
    output::line(format_args!(
        "Pesanan #{} sekarang {}.",
        order.short_reference(),
        order.status
    ));
    Ok(())
}

// =============================================================================
// Seeding
// =============================================================================

/// YAML seed file: a list of product drafts.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<ProductDraft>,
}

/// Outcome of a seeding run.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub created: usize,
    pub errors: Vec<(String, String)>,
}

/// Parse and validate a seed file. Every draft must pass validation before
/// anything is created.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] listing every invalid entry.
pub fn parse_seed(content: &str) -> Result<Vec<ProductDraft>> {
    let file: SeedFile = serde_yaml::from_str(content)
        .map_err(|e| AppError::BadRequest(format!("Berkas seed tidak valid: {e}")))?;

    let mut drafts = Vec::with_capacity(file.products.len());
    let mut errors = Vec::new();
    for (index, draft) in file.products.into_iter().enumerate() {
        let label = if draft.name.trim().is_empty() {
            format!("#{}", index + 1)
        } else {
            draft.name.clone()
        };
        match draft.validated() {
            Ok(draft) => drafts.push(draft),
            Err(e) => errors.push(format!("{label}: {e}")),
        }
    }

    if errors.is_empty() {
        Ok(drafts)
    } else {
        for err in &errors {
            error!("  - {err}");
        }
        Err(AppError::BadRequest(format!(
            "{} produk tidak valid: {}",
            errors.len(),
            errors.join("; ")
        )))
    }
}

/// Bulk-create products from a YAML file.
pub async fn seed(app: &App, path: &Path) -> Result<()> {
    app.require_admin("seed katalog")?;

    info!(path = %path.display(), "Loading products from file");
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::BadRequest(format!("Tidak dapat membaca {}: {e}", path.display()))
    })?;
    let drafts = parse_seed(&content)?;
    info!(products = drafts.len(), "Seed file validated");

    let mut result = SeedResult::default();
    for draft in drafts {
        let name = draft.name.clone();
        match app.catalog.create(draft).await {
            Ok(_) => result.created += 1,
            Err(e) => result.errors.push((name, e.to_string())),
        }
    }

    info!(created = result.created, failed = result.errors.len(), "Seeding complete");
    output::line(format_args!("{} produk dibuat.", result.created));
    for (name, err) in &result.errors {
        error!(product = %name, error = %err, "Failed to create product");
    }
    if result.errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "{} produk gagal dibuat",
            result.errors.len()
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use lapak_core::{CATEGORIES, DEFAULT_DESCRIPTION};

    use super::*;

    #[test]
    fn test_bundled_seed_file_is_valid() {
        let content = include_str!("../../seed/products.yaml");
        let drafts = parse_seed(content).unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].name, "Kopi Arabika Gayo");
        assert_eq!(drafts[0].price, Price::new(75000));
        assert_eq!(drafts[2].category, "Bumbu");
    }

    #[test]
    fn test_seed_fills_defaults() {
        let drafts = parse_seed(
            "products:\n  - name: Pisang Nugget\n    price: 20000\n    image: https://example.com/n.jpg\n",
        )
        .unwrap();
        assert_eq!(drafts[0].description, DEFAULT_DESCRIPTION);
        assert_eq!(drafts[0].category, CATEGORIES[0]);
    }

    #[test]
    fn test_seed_reports_every_invalid_entry() {
        let content = "products:\n  \
             - name: Tanpa Harga\n    price: 0\n    image: x\n  \
             - name: ''\n    price: 1000\n    image: x\n";
        let err = parse_seed(content).unwrap_err();
        let AppError::BadRequest(message) = err else {
            panic!("expected BadRequest");
        };
        assert!(message.starts_with("2 produk tidak valid"));
        assert!(message.contains("Tanpa Harga"));
        assert!(message.contains("#2"));
    }

    #[test]
    fn test_seed_rejects_malformed_yaml() {
        assert!(matches!(
            parse_seed("products: [unclosed"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_fields_apply_only_set_values() {
        let mut draft = ProductDraft {
            name: "Kopi".to_string(),
            price: Price::new(75000),
            image: "a.jpg".to_string(),
            description: "lama".to_string(),
            category: "Minuman".to_string(),
        };
        ProductFields {
            price: Some(80000),
            ..ProductFields::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.name, "Kopi");
        assert_eq!(draft.price, Price::new(80000));
        assert_eq!(draft.description, "lama");
    }
}
