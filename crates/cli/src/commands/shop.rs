//! Catalog browsing, order history and checkout.

use lapak_core::ProductId;
use lapak_storefront::checkout::CustomerInfo;
use lapak_storefront::error::{Result, add_breadcrumb, warning_notice};
use tracing::info;

use crate::app::App;
use crate::output;

/// List products, optionally in one category.
pub async fn products(app: &App, category: Option<&str>) -> Result<()> {
    let products = app.catalog.products(category).await?;
    output::products(&products);
    Ok(())
}

/// Show one product.
pub async fn product(app: &App, id: &str) -> Result<()> {
    let product = app.catalog.product(&ProductId::new(id)).await?;
    output::product(&product);
    Ok(())
}

/// List orders, newest first.
pub async fn orders(app: &App) -> Result<()> {
    let orders = app.orders.list().await?;
    output::orders(&orders);
    Ok(())
}

/// Submit the cart and open the merchant chat.
///
/// The name on the order is the logged-in profile name, else `--name`.
pub async fn checkout(app: &mut App, name: Option<&str>) -> Result<()> {
    add_breadcrumb("checkout", "Checkout started", None);

    let customer = CustomerInfo::new(app.session.session().customer_name_or(name.unwrap_or("")));
    let receipt = app.checkout.run(&mut app.cart, &customer).await?;

    info!(order_id = %receipt.order.id, "Checkout complete");
    output::line(format_args!(
        "Pesanan #{} tercatat ({}).",
        receipt.reference, receipt.order.total_price
    ));
    for warning in &receipt.warnings {
        output::notice(&warning_notice(warning));
    }
    if !receipt.handed_off() {
        output::line("\nKirim pesan berikut ke penjual:\n");
        output::line(&receipt.summary);
    }
    Ok(())
}
