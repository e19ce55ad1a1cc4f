//! Command implementations, one module per screen of the app.

pub mod account;
pub mod admin;
pub mod cart;
pub mod shop;
