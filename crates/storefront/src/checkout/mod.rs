//! Checkout orchestration.
//!
//! Turns the current cart into a persisted order, then hands the customer off
//! to the merchant's chat with a pre-filled summary.
//!
//! # Flow
//!
//! ```text
//! Idle ──(empty cart)──────────────────────────────▶ Idle, EmptyCart
//!   │
//!   └─▶ Submitting ──(API error)────────────────────▶ Idle, cart intact
//!          │
//!          ├─(accepted, reply unreadable)─▶ cart cleared ─▶ Idle, OrderUnconfirmed
//!          │
//!          └─▶ Submitted ─▶ hand-off (best effort) ─▶ cart cleared ─▶ Idle
//! ```
//!
//! The order is recorded before the hand-off is attempted. Once recorded, a
//! failed hand-off or a failed cart write is reported as a warning on the
//! [`CheckoutReceipt`], never as an error: the order exists and must not be
//! submitted twice. A success status whose body cannot be read means the
//! order was most likely recorded, so the cart is cleared there too.

mod handoff;
mod summary;

use std::future::Future;

use lapak_core::{Cart, NewOrder, Order, OrderStatus, PhoneNumber};
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::cart::{CartStore, PersistenceError};
use crate::config::MessagingConfig;
use crate::storage::KeyValueStore;

pub use handoff::{CommandMessenger, HandoffError, Messenger, deep_link};
pub use summary::format_summary;

/// Customer name recorded when the shopper is not logged in.
pub const GUEST_NAME: &str = "Tamu";

/// Checkout did not produce a receipt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out. No request was made.
    #[error("cart is empty")]
    EmptyCart,

    /// The API did not accept the order. The cart is unchanged.
    #[error("order submission failed: {0}")]
    OrderSubmission(#[source] ApiError),

    /// The API answered with a success status but its reply could not be
    /// read. The order is probably recorded, so the cart was cleared and the
    /// customer must not simply retry.
    #[error("order sent, but the confirmation could not be read: {0}")]
    OrderUnconfirmed(#[source] ApiError),
}

/// A problem after the order was recorded.
#[derive(Debug, Error)]
pub enum CheckoutWarning {
    /// The chat app could not be opened. The order still exists.
    #[error("order placed, but the chat app could not be opened: {0}")]
    HandoffUnavailable(#[source] HandoffError),

    /// The cart was cleared in memory but the empty cart was not saved.
    #[error("order placed, but the cart could not be saved: {0}")]
    Persistence(#[source] PersistenceError),
}

/// Who is checking out.
#[derive(Debug, Clone, Default)]
pub struct CustomerInfo {
    /// Display name recorded on the order. Blank means guest.
    pub name: String,
}

impl CustomerInfo {
    /// Customer with the given display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Outcome of a successful checkout.
#[derive(Debug)]
pub struct CheckoutReceipt {
    /// The order as recorded by the API.
    pub order: Order,
    /// Short reference shown to the customer and the merchant.
    pub reference: String,
    /// Message sent through the hand-off.
    pub summary: String,
    /// The deep link, if it could be built.
    pub link: Option<Url>,
    /// Non-fatal problems after the order was recorded.
    pub warnings: Vec<CheckoutWarning>,
}

impl CheckoutReceipt {
    /// Whether the chat app was opened.
    #[must_use]
    pub fn handed_off(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, CheckoutWarning::HandoffUnavailable(_)))
    }
}

/// Something that records orders.
pub trait OrderGateway {
    /// Record `order` and return it with its server-assigned ID.
    fn submit_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}

impl<G: OrderGateway + ?Sized> OrderGateway for &G {
    fn submit_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send {
        (**self).submit_order(order)
    }
}

impl OrderGateway for ApiClient {
    async fn submit_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.create_order(order).await
    }
}

/// Runs the checkout sequence against an order gateway and a messenger.
#[derive(Debug, Clone)]
pub struct Checkout<G, M> {
    gateway: G,
    messenger: M,
    scheme: String,
    merchant_phone: PhoneNumber,
}

impl<G: OrderGateway, M: Messenger> Checkout<G, M> {
    /// Checkout wired to `gateway` and `messenger`, handing off per `messaging`.
    #[must_use]
    pub fn new(gateway: G, messenger: M, messaging: &MessagingConfig) -> Self {
        Self {
            gateway,
            messenger,
            scheme: messaging.scheme.clone(),
            merchant_phone: messaging.merchant_phone.clone(),
        }
    }

    /// Submit the cart as an order and hand off to the merchant chat.
    ///
    /// Holding `&mut CartStore` for the whole call keeps the cart from
    /// changing mid-checkout and rules out a second concurrent checkout.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] without contacting the API if the
    /// cart is empty, or [`CheckoutError::OrderSubmission`] if the API rejects
    /// the order. In both cases the cart is left as it was. Returns
    /// [`CheckoutError::OrderUnconfirmed`], with the cart cleared, if the API
    /// accepted the order but sent an unreadable reply.
    #[instrument(skip_all, fields(lines = cart.lines().len(), total = %cart.total()))]
    pub async fn run<S: KeyValueStore>(
        &self,
        cart: &mut CartStore<S>,
        customer: &CustomerInfo,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let payload = build_order(cart.cart(), customer);
        let order = match self.gateway.submit_order(&payload).await {
            Ok(order) => order,
            Err(e @ ApiError::Parse(_)) => {
                warn!(error = %e, "Order accepted but reply unreadable, clearing cart");
                if let Err(clear) = cart.clear() {
                    warn!(error = %clear, "Cart not saved after unconfirmed order");
                }
                return Err(CheckoutError::OrderUnconfirmed(e));
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed, cart kept");
                return Err(CheckoutError::OrderSubmission(e));
            }
        };

        let reference = order.short_reference();
        info!(order_id = %order.id, reference = %reference, "Order recorded");

        let summary = format_summary(&payload.items, payload.total_price, &reference);
        let mut warnings = Vec::new();

        let link = match deep_link(&self.scheme, &summary, &self.merchant_phone) {
            Ok(link) => Some(link),
            Err(e) => {
                warnings.push(CheckoutWarning::HandoffUnavailable(e));
                None
            }
        };
        if let Some(link) = &link
            && let Err(e) = self.messenger.open(link)
        {
            warn!(error = %e, "Hand-off failed");
            warnings.push(CheckoutWarning::HandoffUnavailable(e));
        }

        if let Err(e) = cart.clear() {
            warnings.push(CheckoutWarning::Persistence(e));
        }

        Ok(CheckoutReceipt {
            order,
            reference,
            summary,
            link,
            warnings,
        })
    }
}

/// Snapshot `cart` into an order payload with status [`OrderStatus::New`].
#[must_use]
pub fn build_order(cart: &Cart, customer: &CustomerInfo) -> NewOrder {
    let name = customer.name.trim();
    NewOrder {
        customer_name: if name.is_empty() { GUEST_NAME } else { name }.to_string(),
        items: cart.order_items(),
        total_price: cart.total(),
        status: OrderStatus::New,
    }
}
