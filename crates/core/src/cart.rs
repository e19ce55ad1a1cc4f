//! The cart model.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLine`]s with these
//! invariants:
//!
//! - no two lines share a product ID
//! - every line has `quantity >= 1`
//! - [`Cart::total`] is always `sum(price * quantity)` over the current lines
//!
//! Every constructor and mutator maintains them, including
//! [`Cart::from_json`], which normalizes whatever it reads.
//!
//! The serialized form is a bare JSON array of lines:
//!
//! ```json
//! [{"id":"1","name":"Kopi Arabika Gayo","price":75000,"image":"...","description":"...","category":"Minuman","quantity":1}]
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{OrderItem, Price, Product, ProductId};

/// A product in the cart with its aggregated quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product identifier; unique within a cart.
    pub id: ProductId,
    /// Product name when it was added.
    pub name: String,
    /// Unit price when it was added.
    pub price: Price,
    /// Product image URI.
    #[serde(default)]
    pub image: String,
    /// Product description.
    #[serde(default)]
    pub description: String,
    /// Product category.
    #[serde(default)]
    pub category: String,
    /// Units of this product, at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// A new line holding one unit of `product`.
    #[must_use]
    pub fn new(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Snapshot of this line for an order submission.
    #[must_use]
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            name: self.name.clone(),
            qty: self.quantity,
            price: self.price,
        }
    }
}

/// An insertion-ordered set of cart lines keyed by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from arbitrary lines, restoring the invariants.
    ///
    /// Lines with quantity 0 are dropped. Lines sharing an ID are merged into
    /// the first occurrence by summing quantities.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut merged: Vec<CartLine> = Vec::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match merged.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => merged.push(line),
            }
        }
        Self { lines: merged }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of `price * quantity` over the current lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line or appends a new one. Returns the line's
    /// new quantity.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.lines.push(CartLine::new(product));
        1
    }

    /// Remove the whole line for `id`, whatever its quantity.
    ///
    /// Returns `false` if no such line existed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.id != id);
        self.lines.len() != before
    }

    /// Remove every line. Returns `false` if the cart was already empty.
    pub fn clear(&mut self) -> bool {
        let had_lines = !self.lines.is_empty();
        self.lines.clear();
        had_lines
    }

    /// Snapshot of every line for an order submission.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.lines.iter().map(CartLine::to_order_item).collect()
    }

    /// Serialize to the persisted form (a JSON array of lines).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Parse the persisted form, normalizing as [`Cart::from_lines`] does.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an array of cart lines.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let lines: Vec<CartLine> = serde_json::from_str(json)?;
        Ok(Self::from_lines(lines))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: &str, price: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Produk {id}"),
            price: Price::new(price),
            image: "https://via.placeholder.com/300".to_string(),
            description: String::new(),
            category: "Makanan".to_string(),
        }
    }

    #[test]
    fn test_repeated_add_aggregates_into_one_line() {
        let mut cart = Cart::new();
        let kopi = product("1", 75000);
        for expected in 1..=5 {
            assert_eq!(cart.add(&kopi), expected);
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&product("b", 1));
        cart.add(&product("a", 1));
        cart.add(&product("b", 1));
        let ids: Vec<_> = cart.lines().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), Price::ZERO);

        cart.add(&product("1", 75000));
        cart.add(&product("2", 15000));
        cart.add(&product("2", 15000));
        assert_eq!(cart.total(), Price::new(105_000));
        assert_eq!(cart.item_count(), 3);

        cart.remove(&ProductId::new("1"));
        assert_eq!(cart.total(), Price::new(30000));

        cart.clear();
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_remove_deletes_whole_line() {
        let mut cart = Cart::new();
        let keripik = product("2", 15000);
        cart.add(&keripik);
        cart.add(&keripik);
        cart.add(&keripik);

        assert!(cart.remove(&keripik.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product("1", 75000));
        let before = cart.clone();

        assert!(!cart.remove(&ProductId::new("missing")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        assert!(!cart.clear());
        assert!(cart.is_empty());

        cart.add(&product("1", 75000));
        assert!(cart.clear());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_json_roundtrip_preserves_lines_and_order() {
        let mut cart = Cart::new();
        cart.add(&product("1", 75000));
        cart.add(&product("2", 15000));
        cart.add(&product("2", 15000));

        let json = cart.to_json().unwrap();
        let restored = Cart::from_json(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_persisted_form_is_array_of_lines() {
        let mut cart = Cart::new();
        cart.add(&product("1", 75000));

        let value: serde_json::Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();
        let lines = value.as_array().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["id"], "1");
        assert_eq!(lines[0]["price"], 75000);
        assert_eq!(lines[0]["quantity"], 1);
    }

    #[test]
    fn test_from_json_normalizes_broken_state() {
        let json = r#"[
            {"id":"1","name":"Kopi","price":75000,"quantity":1},
            {"id":"2","name":"Keripik","price":15000,"quantity":0},
            {"id":"1","name":"Kopi","price":75000,"quantity":2}
        ]"#;

        let cart = Cart::from_json(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.total(), Price::new(225_000));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Cart::from_json("{\"items\": []}").is_err());
        assert!(Cart::from_json("not json").is_err());
    }

    #[test]
    fn test_order_items_snapshot() {
        let mut cart = Cart::new();
        cart.add(&product("1", 75000));
        cart.add(&product("2", 15000));
        cart.add(&product("2", 15000));

        let items = cart.order_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "Produk 2");
        assert_eq!(items[1].qty, 2);
        assert_eq!(items[1].price, Price::new(15000));
    }
}
