//! Cart state container.
//!
//! [`CartStore`] owns the single mutable [`Cart`] of the app. It hydrates
//! from a [`KeyValueStore`] when opened and writes the whole cart back after
//! every mutation that changed it, before returning to the caller.
//!
//! Persistence failures are non-fatal: the in-memory cart is already updated
//! when a [`PersistenceError`] is returned, so the UI can keep going and
//! report the problem.
//!
//! # Example
//!
//! ```rust,ignore
//! use lapak_storefront::cart::CartStore;
//! use lapak_storefront::storage::FileStore;
//!
//! let (mut cart, load_problem) = CartStore::open(FileStore::new(".lapak"));
//! if let Some(e) = load_problem {
//!     tracing::warn!("starting with an empty cart: {e}");
//! }
//!
//! cart.add_line(&product)?;
//! println!("total: {}", cart.total());
//! ```

use lapak_core::{Cart, CartLine, Price, Product, ProductId};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::storage::{KeyValueStore, StorageError, keys};

/// The cart could not be loaded from or saved to storage.
///
/// When returned from a mutation, the in-memory cart already reflects the
/// change.
#[derive(Debug, Error)]
#[error("cart not persisted: {0}")]
pub struct PersistenceError(#[from] pub StorageError);

/// In-memory cart with load-on-open, save-after-mutation persistence.
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
    updates: watch::Sender<Cart>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Hydrate the cart from `storage`.
    ///
    /// A missing value yields an empty cart with no error. An unreadable or
    /// corrupt value also yields an empty cart, and the problem is returned
    /// alongside so the caller can report it.
    #[instrument(skip(storage))]
    pub fn open(storage: S) -> (Self, Option<PersistenceError>) {
        let (cart, problem) = match load(&storage) {
            Ok(Some(cart)) => {
                debug!(lines = cart.len(), "Cart hydrated");
                (cart, None)
            }
            Ok(None) => {
                debug!("No stored cart, starting empty");
                (Cart::new(), None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to hydrate cart, starting empty");
                (Cart::new(), Some(e))
            }
        };

        let (updates, _) = watch::channel(cart.clone());
        (
            Self {
                storage,
                cart,
                updates,
            },
            problem,
        )
    }

    /// Add one unit of `product`, merging with an existing line.
    ///
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the updated cart could not be saved.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_line(&mut self, product: &Product) -> Result<u32, PersistenceError> {
        let quantity = self.cart.add(product);
        debug!(quantity, "Line added");
        self.commit()?;
        Ok(quantity)
    }

    /// Remove the entire line for `id`, regardless of its quantity.
    ///
    /// Unknown IDs leave the cart untouched and write nothing. Returns whether
    /// a line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the updated cart could not be saved.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn remove_line(&mut self, id: &ProductId) -> Result<bool, PersistenceError> {
        if !self.cart.remove(id) {
            return Ok(false);
        }
        debug!("Line removed");
        self.commit()?;
        Ok(true)
    }

    /// Empty the cart. Clearing an empty cart writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the emptied cart could not be saved.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        if !self.cart.clear() {
            return Ok(());
        }
        debug!("Cart cleared");
        self.commit()
    }

    /// Sum of `price * quantity`, recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Observe the cart. The receiver always holds the latest state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.updates.subscribe()
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Notify subscribers, then persist.
    fn commit(&mut self) -> Result<(), PersistenceError> {
        self.updates.send_replace(self.cart.clone());
        save(&self.storage, &self.cart).inspect_err(|e| {
            warn!(error = %e, "Failed to persist cart");
        })
    }
}

fn load<S: KeyValueStore>(storage: &S) -> Result<Option<Cart>, PersistenceError> {
    let Some(json) = storage.get(keys::CART)? else {
        return Ok(None);
    };
    let cart = Cart::from_json(&json).map_err(|source| StorageError::Corrupt {
        key: keys::CART.to_string(),
        source,
    })?;
    Ok(Some(cart))
}

fn save<S: KeyValueStore>(storage: &S, cart: &Cart) -> Result<(), PersistenceError> {
    let json = cart.to_json().map_err(|source| StorageError::Encode {
        key: keys::CART.to_string(),
        source,
    })?;
    storage.set(keys::CART, &json)?;
    Ok(())
}
