use rand::Rng;
use rand::rngs::OsRng;

use crate::domain::order::{Order, OrderStatus};

string_enum! {
    /// Which physical handover a code confirms.
    pub enum CodeKind as "code kind" {
        /// Agent collects the goods from the seller or pickup site.
        Pickup => "pickup",
        /// Buyer receives the goods from the agent.
        Delivery => "delivery",
    }
}

impl CodeKind {
    /// Order statuses in which this code may be submitted.
    pub fn accepted_in(&self) -> &'static [OrderStatus] {
        match self {
            CodeKind::Pickup => &[OrderStatus::Assigned],
            CodeKind::Delivery => &[OrderStatus::PickedUp, OrderStatus::EnRoute],
        }
    }

    /// Status the order moves to once the code is accepted.
    pub fn next_status(&self) -> OrderStatus {
        match self {
            CodeKind::Pickup => OrderStatus::PickedUp,
            CodeKind::Delivery => OrderStatus::Delivered,
        }
    }
}

/// Why a submitted code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// Code did not match; `remaining` attempts are left before lockout.
    Mismatch { remaining: i32 },
    /// Too many failed attempts; the code must be regenerated.
    Locked,
    /// The code was already consumed by an earlier call.
    AlreadyUsed,
}

/// Result of submitting a handover code for an order.
#[derive(Debug, Clone, PartialEq)]
pub enum HandoverOutcome {
    /// The code matched; carries the order after the status change.
    Verified(Order),
    /// The code was refused.
    Refused(CodeCheck),
    /// The order is not at the handover step; carries its current status.
    Stale(OrderStatus),
}

/// Generate a numeric code of `length` digits from the OS RNG.
pub fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Compare codes without short-circuiting on the first differing digit.
pub fn codes_match(expected: &str, submitted: &str) -> bool {
    let expected = expected.as_bytes();
    let submitted = submitted.trim().as_bytes();
    if expected.len() != submitted.len() {
        return false;
    }
    expected
        .iter()
        .zip(submitted)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
