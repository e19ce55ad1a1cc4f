//! Status and role enums.

use serde::{Deserialize, Serialize};

/// Order processing status.
///
/// The remote API stores the Indonesian labels (`Baru`, `Proses`, `Selesai`);
/// the English names are accepted when reading. Any other label reads as
/// [`OrderStatus::Unknown`] so one odd record does not break a whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String")]
pub enum OrderStatus {
    /// Freshly submitted from a checkout.
    #[default]
    #[serde(rename = "Baru")]
    New,
    /// Accepted by the merchant and being prepared.
    #[serde(rename = "Proses")]
    Processing,
    /// Finished. No further transitions.
    #[serde(rename = "Selesai")]
    Done,
    /// A label this client does not know. Never written by the client.
    #[serde(rename = "Tidak diketahui")]
    Unknown,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 3] = [Self::New, Self::Processing, Self::Done];

    /// Label used on the wire and in the UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "Baru",
            Self::Processing => "Proses",
            Self::Done => "Selesai",
            Self::Unknown => "Tidak diketahui",
        }
    }

    /// Whether an order in this status may move to `next`.
    ///
    /// Orders only move forward; `Done` is terminal. An order with an
    /// unrecognised status may be moved to `Processing` or `Done`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::New | Self::Unknown, Self::Processing | Self::Done)
                | (Self::Processing, Self::Done)
        )
    }

    /// Whether the order is finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baru" | "new" => Ok(Self::New),
            "proses" | "processing" => Ok(Self::Processing),
            "selesai" | "done" => Ok(Self::Done),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }
}

/// Who is using the app. Drives which screens are available; the cart and
/// checkout never look at it.
///
/// Only `admin` grants admin screens; any other label (`user`, `guest`, ...)
/// reads as [`Role::Customer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Role {
    /// Store owner: manages products and order statuses.
    Admin,
    /// Shopper.
    #[default]
    Customer,
}

impl Role {
    /// The other role (the profile screen's switch).
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Admin => Self::Customer,
            Self::Customer => Self::Admin,
        }
    }

    /// Whether this role may manage products and orders.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" | "user" => Ok(Self::Customer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        if s == "admin" { Self::Admin } else { Self::Customer }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_labels() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::New).unwrap(),
            "\"Baru\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"Proses\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Done).unwrap(),
            "\"Selesai\""
        );
    }

    #[test]
    fn test_status_accepts_english_names() {
        let status: OrderStatus = serde_json::from_str("\"Processing\"").unwrap();
        assert_eq!(status, OrderStatus::Processing);
        let status: OrderStatus = serde_json::from_str("\"Selesai\"").unwrap();
        assert_eq!(status, OrderStatus::Done);
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::{Done, New, Processing};

        assert!(New.can_transition_to(Processing));
        assert!(New.can_transition_to(Done));
        assert!(Processing.can_transition_to(Done));

        assert!(!New.can_transition_to(New));
        assert!(!Processing.can_transition_to(New));
        assert!(!Processing.can_transition_to(Processing));
        for next in OrderStatus::ALL {
            assert!(!Done.can_transition_to(next));
        }
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("proses".parse::<OrderStatus>().unwrap(), OrderStatus::Processing);
        assert_eq!("Done".parse::<OrderStatus>().unwrap(), OrderStatus::Done);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_role_toggle() {
        assert_eq!(Role::Admin.toggled(), Role::Customer);
        assert_eq!(Role::Customer.toggled(), Role::Admin);
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn test_role_accepts_user_alias() {
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::Customer);
        assert_eq!("user".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_unrecognised_labels_do_not_fail_parsing() {
        let status: OrderStatus = serde_json::from_str("\"Dikirim\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        assert!(status.can_transition_to(OrderStatus::Done));
        assert!(!OrderStatus::New.can_transition_to(OrderStatus::Unknown));
        assert!("tidak diketahui".parse::<OrderStatus>().is_err());

        let role: Role = serde_json::from_str("\"guest\"").unwrap();
        assert_eq!(role, Role::Customer);
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
