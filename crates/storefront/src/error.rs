//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the presentation layer. Every error
//! surfaces as a [`Notice`]: a level plus a user-facing message that never
//! exposes internal detail. Server-class errors are captured to Sentry first.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::PersistenceError;
use crate::catalog::CatalogError;
use crate::checkout::{CheckoutError, CheckoutWarning, HandoffError};
use crate::config::ConfigError;
use crate::orders::OrderError;
use crate::session::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local state could not be saved or loaded.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Store API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout failed before an order was recorded.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Order management failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Login, registration or session storage failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// The command requires the admin role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// How prominently to show a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something went wrong but the action (partly) succeeded.
    Warning,
    /// The action failed.
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message in the app's language.
    pub message: String,
}

impl Notice {
    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

impl AppError {
    /// Whether the error should be reported to Sentry.
    #[must_use]
    pub fn is_server_side(&self) -> bool {
        match self {
            Self::Api(e)
            | Self::Checkout(CheckoutError::OrderSubmission(e) | CheckoutError::OrderUnconfirmed(e))
            | Self::Catalog(CatalogError::Api(e))
            | Self::Order(OrderError::Api(e))
            | Self::Auth(AuthError::Api(e)) => e.is_server_side(),
            Self::Persistence(_) | Self::Auth(AuthError::Persistence(_)) => true,
            _ => false,
        }
    }

    /// Capture to Sentry if server-side, then map to a notification.
    #[must_use]
    pub fn report(&self) -> Notice {
        if self.is_server_side() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        }
        self.notice()
    }

    /// Map to a user-facing notification without internal detail.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Config(e) => Notice::error(format!("Konfigurasi tidak valid: {e}")),
            Self::Persistence(_) => {
                Notice::warning("Perubahan tidak tersimpan di perangkat")
            }
            Self::Api(e) => api_notice(e),
            Self::Checkout(CheckoutError::EmptyCart) => Notice::error("Keranjang masih kosong"),
            Self::Checkout(CheckoutError::OrderSubmission(_)) => {
                Notice::error("Gagal mengirim pesanan. Keranjang Anda tetap tersimpan")
            }
            Self::Checkout(CheckoutError::OrderUnconfirmed(_)) => Notice::warning(
                "Pesanan terkirim tetapi konfirmasi tidak terbaca. Cek riwayat pesanan sebelum memesan ulang",
            ),
            Self::Catalog(CatalogError::NotFound(id)) => {
                Notice::error(format!("Produk {id} tidak ditemukan"))
            }
            Self::Catalog(CatalogError::InvalidDraft(e)) => {
                Notice::error(format!("Data produk tidak lengkap: {e}"))
            }
            Self::Catalog(CatalogError::Api(e)) | Self::Order(OrderError::Api(e)) => api_notice(e),
            Self::Order(OrderError::NotFound(id)) => {
                Notice::error(format!("Pesanan {id} tidak ditemukan"))
            }
            Self::Order(OrderError::InvalidTransition { from, to, .. }) => Notice::error(format!(
                "Status pesanan tidak bisa diubah dari {from} ke {to}"
            )),
            Self::Auth(e) => auth_notice(e),
            Self::Forbidden(_) => Notice::error("Hanya admin yang dapat melakukan ini"),
            Self::BadRequest(msg) => Notice::error(msg.clone()),
        }
    }
}

fn api_notice(error: &ApiError) -> Notice {
    match error {
        ApiError::Http(_) => Notice::error("Tidak dapat terhubung ke server"),
        ApiError::RateLimited(secs) => {
            Notice::error(format!("Terlalu banyak permintaan, coba lagi dalam {secs} detik"))
        }
        ApiError::NotFound(_) => Notice::error("Data tidak ditemukan"),
        ApiError::Unauthorized(_) => Notice::error("Silakan login terlebih dahulu"),
        ApiError::Status { .. } | ApiError::Parse(_) | ApiError::InvalidUrl(_) => {
            Notice::error("Terjadi kesalahan pada server")
        }
    }
}

fn auth_notice(error: &AuthError) -> Notice {
    match error {
        AuthError::InvalidCredentials => Notice::error("Nomor HP atau kata sandi salah"),
        AuthError::AccountExists => Notice::error("Nomor HP sudah terdaftar"),
        AuthError::MissingName => Notice::error("Nama wajib diisi"),
        AuthError::InvalidProfile(_) => Notice::error("Profil dari server tidak valid"),
        AuthError::Api(e) => api_notice(e),
        AuthError::Persistence(_) => Notice::warning("Sesi tidak tersimpan di perangkat"),
    }
}

/// Map a post-order checkout problem to a notification.
#[must_use]
pub fn warning_notice(warning: &CheckoutWarning) -> Notice {
    match warning {
        CheckoutWarning::HandoffUnavailable(HandoffError::Unavailable { .. }) => Notice::warning(
            "Pesanan tercatat, tetapi aplikasi chat tidak dapat dibuka",
        ),
        CheckoutWarning::HandoffUnavailable(HandoffError::InvalidLink(_)) => {
            Notice::warning("Pesanan tercatat, tetapi tautan chat tidak valid")
        }
        CheckoutWarning::Persistence(_) => {
            Notice::warning("Pesanan tercatat, tetapi keranjang tidak tersimpan")
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful login to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use lapak_core::{OrderId, OrderStatus, ProductDraftError, ProductId};

    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }

    #[test]
    fn test_notice_levels() {
        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.notice().level, NoticeLevel::Error);

        let err = AppError::from(PersistenceError(StorageError::Unavailable("disk".to_string())));
        assert_eq!(err.notice().level, NoticeLevel::Warning);
    }

    #[test]
    fn test_notice_hides_internal_detail() {
        let err = AppError::from(CheckoutError::OrderSubmission(ApiError::Status {
            status: 500,
            message: "stack trace at db.js:42".to_string(),
        }));
        let notice = err.notice();
        assert!(!notice.message.contains("db.js"));
        assert!(notice.message.contains("Keranjang"));
    }

    #[test]
    fn test_unconfirmed_order_does_not_invite_retry() {
        let parse = serde_json::from_str::<lapak_core::Order>("not json").unwrap_err();
        let err = AppError::from(CheckoutError::OrderUnconfirmed(ApiError::Parse(parse)));
        let notice = err.notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(!notice.message.contains("tetap tersimpan"));
        assert!(notice.message.contains("riwayat pesanan"));
        assert!(err.is_server_side());
    }

    #[test]
    fn test_notice_names_the_subject() {
        let err = AppError::from(CatalogError::NotFound(ProductId::new("p-9")));
        assert!(err.notice().message.contains("p-9"));

        let err = AppError::from(OrderError::InvalidTransition {
            id: OrderId::new("o-1"),
            from: OrderStatus::Done,
            to: OrderStatus::New,
        });
        assert!(err.notice().message.contains("Selesai"));

        let err = AppError::from(CatalogError::InvalidDraft(ProductDraftError::MissingImage));
        assert!(err.notice().message.contains("image"));
    }

    #[test]
    fn test_server_side_classification() {
        assert!(!AppError::from(CheckoutError::EmptyCart).is_server_side());
        assert!(!AppError::Forbidden("admin".to_string()).is_server_side());
        assert!(
            AppError::from(CheckoutError::OrderSubmission(ApiError::Status {
                status: 503,
                message: String::new(),
            }))
            .is_server_side()
        );
        assert!(!AppError::from(AuthError::InvalidCredentials).is_server_side());
    }

    #[test]
    fn test_warning_notices() {
        let warning = CheckoutWarning::HandoffUnavailable(HandoffError::Unavailable {
            scheme: "whatsapp".to_string(),
            reason: "missing".to_string(),
        });
        let notice = warning_notice(&warning);
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.starts_with("Pesanan tercatat"));
    }
}
