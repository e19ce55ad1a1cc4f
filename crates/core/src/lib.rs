//! Lapak Core - Shared types and the cart model.
//!
//! This crate provides the types used across all Lapak components:
//! - `storefront` - Cart container, API client, checkout orchestration
//! - `cli` - Command-line front end (the "screens")
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. Persisting and submitting a [`Cart`] is the job
//! of the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, phone numbers, statuses,
//!   products and orders
//! - [`cart`] - The cart model and its serialized form

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartLine};
pub use types::*;
