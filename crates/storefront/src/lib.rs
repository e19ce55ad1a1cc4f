//! Lapak storefront client library.
//!
//! This crate provides the client-side state and orchestration of the
//! storefront as a library, so the CLI and the integration tests share it:
//!
//! - [`cart`] - the persisted cart container
//! - [`checkout`] - order submission and the messaging hand-off
//! - [`catalog`], [`orders`], [`session`] - API-backed browsing, admin
//!   management and login
//! - [`api`], [`storage`] - the remote API client and durable key-value storage

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod session;
pub mod storage;
