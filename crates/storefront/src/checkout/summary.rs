//! Plain-text order summary for the messaging hand-off.

use std::fmt::Write;

use lapak_core::{OrderItem, Price};

const GREETING: &str = "Halo Admin, saya ingin memesan:";
const CLOSING: &str = "Mohon diproses, Terima kasih.";

/// Format the message pre-filled in the merchant chat.
///
/// ```text
/// Halo Admin, saya ingin memesan:
///
/// 1. Kopi Arabika Gayo x1 - Rp 75.000
/// 2. Keripik Pisang Coklat x2 - Rp 30.000
///
/// *Total: Rp 105.000*
/// Kode pesanan: #3EF99
///
/// Mohon diproses, Terima kasih.
/// ```
#[must_use]
pub fn format_summary(items: &[OrderItem], total: Price, reference: &str) -> String {
    let mut text = format!("{GREETING}\n\n");
    for (index, item) in items.iter().enumerate() {
        // Writing to a String cannot fail
        let _ = writeln!(
            text,
            "{}. {} x{} - {}",
            index + 1,
            item.name,
            item.qty,
            item.subtotal()
        );
    }
    let _ = write!(
        text,
        "\n*Total: {total}*\nKode pesanan: #{reference}\n\n{CLOSING}"
    );
    text
}
