//! Core types for Lapak.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;
pub mod status;

pub use id::*;
pub use order::{NewOrder, Order, OrderItem};
pub use phone::{PhoneError, PhoneNumber};
pub use price::Price;
pub use product::{CATEGORIES, DEFAULT_DESCRIPTION, Product, ProductDraft, ProductDraftError};
pub use status::*;
