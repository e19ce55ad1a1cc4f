//! Terminal rendering.
//!
//! Everything the user reads goes through here; logs go to stderr via
//! `tracing`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, BufRead};

use lapak_core::{CartLine, Order, Price, Product};
use lapak_storefront::error::{Notice, NoticeLevel};
use secrecy::SecretString;

/// Print a notification to stderr with a level prefix.
pub fn notice(notice: &Notice) {
    let prefix = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "peringatan",
        NoticeLevel::Error => "gagal",
    };
    eprintln!("{prefix}: {}", notice.message);
}

/// Print a plain line.
pub fn line(text: impl std::fmt::Display) {
    println!("{text}");
}

/// One product per line: `id  name  price  [category]`.
pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("Belum ada produk.");
        return;
    }
    for p in products {
        println!("{:<12} {:<32} {:>14}  [{}]", p.id, p.name, p.price.to_string(), p.category);
    }
}

/// Product detail view.
pub fn product(product: &Product) {
    println!("{}", product.name);
    println!("  ID:        {}", product.id);
    println!("  Harga:     {}", product.price);
    println!("  Kategori:  {}", product.category);
    println!("  Gambar:    {}", product.image);
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
}

/// Cart lines with subtotals and the grand total.
pub fn cart(lines: &[CartLine], total: Price) {
    if lines.is_empty() {
        println!("Keranjang masih kosong.");
        return;
    }
    for line in lines {
        println!(
            "{:<12} {:<32} x{:<3} {:>14}",
            line.id,
            line.name,
            line.quantity,
            line.subtotal().to_string()
        );
    }
    println!("\nTotal: {total}");
}

/// Orders with reference, status, customer and total.
pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("Belum ada pesanan.");
        return;
    }
    for order in orders {
        let date = order
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "#{:<6} {:<8} {:<16} {:>3} item {:>14}  {date}  ({})",
            order.short_reference(),
            order.status,
            order.customer_name,
            order.item_count(),
            order.total_price.to_string(),
            order.id,
        );
    }
}

/// Read a password from stdin without echoing it anywhere else.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub fn read_password(prompt: &str) -> io::Result<SecretString> {
    eprint!("{prompt}: ");
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(SecretString::from(input.trim_end_matches(['\r', '\n']).to_string()))
}
