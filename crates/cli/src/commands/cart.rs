//! Cart commands.

use lapak_core::ProductId;
use lapak_storefront::error::{AppError, Result, add_breadcrumb};

use crate::app::App;
use crate::output;

/// Show cart lines and the total.
pub fn show(app: &App) {
    output::cart(app.cart.lines(), app.cart.total());
}

/// Add one unit of a catalog product.
pub async fn add(app: &mut App, id: &str) -> Result<()> {
    let product = app.catalog.product(&ProductId::new(id)).await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id)]));

    let quantity = app.cart.add_line(&product)?;
    output::line(format_args!(
        "{} ditambahkan ke keranjang (x{quantity}). Total: {}",
        product.name,
        app.cart.total()
    ));
    Ok(())
}

/// Remove a whole line.
pub fn remove(app: &mut App, id: &str) -> Result<()> {
    if !app.cart.remove_line(&ProductId::new(id))? {
        return Err(AppError::BadRequest(format!("Produk {id} tidak ada di keranjang")));
    }
    add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id)]));
    output::line(format_args!("Dihapus. Total: {}", app.cart.total()));
    Ok(())
}

/// Empty the cart.
pub fn clear(app: &mut App) -> Result<()> {
    app.cart.clear()?;
    output::line("Keranjang dikosongkan.");
    Ok(())
}
