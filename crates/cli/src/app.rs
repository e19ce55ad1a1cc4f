//! Composition root: wires configuration, storage and API into the state
//! containers the commands operate on.

use std::sync::Arc;

use lapak_storefront::api::ApiClient;
use lapak_storefront::cart::CartStore;
use lapak_storefront::catalog::Catalog;
use lapak_storefront::checkout::{Checkout, CommandMessenger};
use lapak_storefront::config::StorefrontConfig;
use lapak_storefront::error::{AppError, Result};
use lapak_storefront::orders::Orders;
use lapak_storefront::session::{AuthError, SessionStore};
use lapak_storefront::storage::FileStore;

/// Shared state for one CLI invocation.
pub struct App {
    pub api: ApiClient,
    pub cart: CartStore<Arc<FileStore>>,
    pub session: SessionStore<Arc<FileStore>>,
    pub catalog: Catalog,
    pub orders: Orders,
    pub checkout: Checkout<ApiClient, CommandMessenger>,
}

impl App {
    /// Build the app and hydrate persisted state.
    ///
    /// Problems reading stored state are returned alongside the app; the
    /// affected container starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn open(config: &StorefrontConfig) -> Result<(Self, Vec<AppError>)> {
        let api = ApiClient::new(&config.api)?;
        let storage = Arc::new(FileStore::new(&config.state_dir));
        let mut problems = Vec::new();

        let (cart, cart_problem) = CartStore::open(Arc::clone(&storage));
        problems.extend(cart_problem.map(AppError::from));

        let (session, session_problem) = SessionStore::open(storage);
        problems.extend(session_problem.map(|e| AppError::from(AuthError::Persistence(e))));

        if let Some(token) = session.session().token() {
            api.set_token(Some(token.clone()));
        }

        let messenger = CommandMessenger::new(&config.messaging.open_command);

        Ok((
            Self {
                catalog: Catalog::new(api.clone()),
                orders: Orders::new(api.clone()),
                checkout: Checkout::new(api.clone(), messenger, &config.messaging),
                api,
                cart,
                session,
            },
            problems,
        ))
    }

    /// Fail unless the session is in the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for customers.
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.session.role().is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(action.to_string()))
        }
    }
}
