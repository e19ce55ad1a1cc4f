//! Order history and the admin status queue.

use lapak_core::{Order, OrderId, OrderStatus};
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError};

/// Errors from order management.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order with this ID.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The order cannot move from its current status to the requested one.
    #[error("cannot move order {id} from {from} to {to}")]
    InvalidTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The API request failed.
    #[error(transparent)]
    Api(ApiError),
}

/// Order operations backed by the store API.
#[derive(Debug, Clone)]
pub struct Orders {
    api: ApiClient,
}

impl Orders {
    /// Order operations using `api`.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the orders cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.api.list_orders().await.map_err(OrderError::Api)?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    /// Move an order to `status`.
    ///
    /// The current status is fetched first and the transition checked
    /// locally, so finished orders are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for an unknown ID and
    /// [`OrderError::InvalidTransition`] if the move is not allowed.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn set_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let mut order = self
            .api
            .list_orders()
            .await
            .map_err(OrderError::Api)?
            .into_iter()
            .find(|o| &o.id == id)
            .ok_or_else(|| OrderError::NotFound(id.clone()))?;

        check_transition(&order, status)?;

        self.api
            .update_order_status(id, status)
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => OrderError::NotFound(id.clone()),
                other => OrderError::Api(other),
            })?;

        info!(from = %order.status, "Order status changed");
        order.status = status;
        Ok(order)
    }
}

/// Check that `order` may move to `next`.
///
/// # Errors
///
/// Returns [`OrderError::InvalidTransition`] for same-status requests,
/// backward moves, and anything out of `Done`.
pub fn check_transition(order: &Order, next: OrderStatus) -> Result<(), OrderError> {
    if order.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition {
            id: order.id.clone(),
            from: order.status,
            to: next,
        })
    }
}

/// Sort by creation time, newest first. Orders without a timestamp go last,
/// in their original relative order.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
