//! Order delivery lifecycle state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Delivery status of an order.
///
/// The transition table is fixed:
///
/// | from       | allowed targets                          |
/// |------------|------------------------------------------|
/// | PENDING    | PROCESSING, SHIPPED, DELIVERED, CANCELLED |
/// | PROCESSING | SHIPPED, DELIVERED, CANCELLED            |
/// | SHIPPED    | DELIVERED, CANCELLED                     |
/// | DELIVERED  | CANCELLED                                |
/// | CANCELLED  | RETURNED                                 |
/// | RETURNED   | (terminal)                               |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl StateMachine for DeliveryStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, target),
            (Pending, Processing)
                | (Pending, Shipped)
                | (Pending, Delivered)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Delivered)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Shipped, Cancelled)
                | (Delivered, Cancelled)
                | (Cancelled, Returned)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DeliveryStatus::*;
        match self {
            Pending => vec![Processing, Shipped, Delivered, Cancelled],
            Processing => vec![Shipped, Delivered, Cancelled],
            Shipped => vec![Delivered, Cancelled],
            Delivered => vec![Cancelled],
            Cancelled => vec![Returned],
            Returned => vec![],
        }
    }
}

impl DeliveryStatus {
    /// Returns the wire string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Processing => "PROCESSING",
            DeliveryStatus::Shipped => "SHIPPED",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Cancelled => "CANCELLED",
            DeliveryStatus::Returned => "RETURNED",
        }
    }

    /// All statuses, in lifecycle order.
    pub fn all() -> [DeliveryStatus; 6] {
        [
            DeliveryStatus::Pending,
            DeliveryStatus::Processing,
            DeliveryStatus::Shipped,
            DeliveryStatus::Delivered,
            DeliveryStatus::Cancelled,
            DeliveryStatus::Returned,
        ]
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PENDING" => Ok(DeliveryStatus::Pending),
            "PROCESSING" => Ok(DeliveryStatus::Processing),
            "SHIPPED" => Ok(DeliveryStatus::Shipped),
            "DELIVERED" => Ok(DeliveryStatus::Delivered),
            "CANCELLED" => Ok(DeliveryStatus::Cancelled),
            "RETURNED" => Ok(DeliveryStatus::Returned),
            other => Err(ValidationError::invalid_format(
                "delivery_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pending_allows_skipping_straight_to_delivered() {
        assert!(DeliveryStatus::Pending.can_transition_to(&DeliveryStatus::Delivered));
    }

    #[test]
    fn delivered_only_allows_cancellation() {
        assert_eq!(
            DeliveryStatus::Delivered.valid_transitions(),
            vec![DeliveryStatus::Cancelled]
        );
    }

    #[test]
    fn returned_is_terminal() {
        assert!(DeliveryStatus::Returned.is_terminal());
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in DeliveryStatus::all() {
            assert!(!status.can_transition_to(&status));
        }
    }

    #[test]
    fn backward_transitions_are_rejected() {
        assert!(!DeliveryStatus::Shipped.can_transition_to(&DeliveryStatus::Pending));
        assert!(!DeliveryStatus::Delivered.can_transition_to(&DeliveryStatus::Shipped));
        assert!(!DeliveryStatus::Returned.can_transition_to(&DeliveryStatus::Cancelled));
    }

    #[test]
    fn returned_is_only_reachable_from_cancelled() {
        for status in DeliveryStatus::all() {
            let allowed = status == DeliveryStatus::Cancelled;
            assert_eq!(
                status.can_transition_to(&DeliveryStatus::Returned),
                allowed,
                "{:?} -> RETURNED",
                status
            );
        }
    }

    #[test]
    fn wire_string_roundtrips() {
        for status in DeliveryStatus::all() {
            assert_eq!(status.as_str().parse::<DeliveryStatus>().unwrap(), status);
        }
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert!("LOST_IN_TRANSIT".parse::<DeliveryStatus>().is_err());
    }

    fn any_status() -> impl Strategy<Value = DeliveryStatus> {
        prop::sample::select(DeliveryStatus::all().to_vec())
    }

    proptest! {
        // can_transition_to and valid_transitions must agree pairwise.
        #[test]
        fn transition_table_is_self_consistent(from in any_status(), to in any_status()) {
            let listed = from.valid_transitions().contains(&to);
            prop_assert_eq!(from.can_transition_to(&to), listed);
        }

        // transition_to succeeds exactly on the legal pairs.
        #[test]
        fn transition_to_matches_table(from in any_status(), to in any_status()) {
            let result = from.transition_to(to);
            if from.can_transition_to(&to) {
                prop_assert_eq!(result.unwrap(), to);
            } else {
                prop_assert!(result.is_err());
            }
        }
    }
}
