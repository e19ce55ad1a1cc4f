//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs are opaque
//! strings: the remote API assigns them (e.g. `"65f0c2a9e1b3abc123ef99"`) and
//! locally created products may use any stable string.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use lapak_core::define_id;
/// define_id!(CustomerId);
/// define_id!(InvoiceId);
///
/// let customer_id = CustomerId::new("c-1");
/// let invoice_id = InvoiceId::new("c-1");
///
/// // These are different types, so this won't compile:
/// // let _: CustomerId = invoice_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);

impl OrderId {
    /// Number of trailing characters kept in a short reference.
    pub const SHORT_REFERENCE_LEN: usize = 5;

    /// Short, human-friendly reference for this order.
    ///
    /// The last five characters of the server-assigned ID, uppercased. IDs
    /// shorter than five characters are used whole.
    ///
    /// ```
    /// use lapak_core::OrderId;
    ///
    /// assert_eq!(OrderId::new("abc123ef99").short_reference(), "3EF99");
    /// assert_eq!(OrderId::new("ab1").short_reference(), "AB1");
    /// ```
    #[must_use]
    pub fn short_reference(&self) -> String {
        let count = self.0.chars().count();
        self.0
            .chars()
            .skip(count.saturating_sub(Self::SHORT_REFERENCE_LEN))
            .collect::<String>()
            .to_uppercase()
    }
}

/// A record from the API carried neither `_id` nor `id`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("record has neither `_id` nor `id`")]
pub struct MissingIdError;

/// Pick the identifier of an API record that may carry `_id`, `id` or both.
///
/// `_id` wins when both are present.
pub(crate) fn resolve_id<T>(underscore: Option<T>, plain: Option<T>) -> Result<T, MissingIdError> {
    underscore.or(plain).ok_or(MissingIdError)
}
