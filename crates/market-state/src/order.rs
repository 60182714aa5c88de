//! # Order Lifecycle Engine
//!
//! Decides whether an order may move from one status to another, and if
//! not, why. Every money-bearing or irreversible operation in the
//! marketplace consults this module before it writes anything.
//!
//! ## States
//!
//! ```text
//! Draft ──▶ AwaitingPayment ──▶ InEscrow ──▶ InProgress ──▶ Delivered ──▶ Completed
//!                 │                            │    ▲          │   │
//!                 ▼                            │    └── RevisionRequested
//!             Cancelled ◀──────────────────────┤               │
//!                                              └──▶ Disputed ◀─┘
//!                                                      │
//!                        ResolvedRefund | ResolvedPartial | ResolvedUpheld
//! ```
//!
//! ## Guards
//!
//! Structural admissibility is checked first. Two targets carry extra
//! preconditions:
//!
//! - `InEscrow` needs payment proof, then escrow proof.
//! - `Completed` needs a delivery timestamp or an auto-complete policy.
//!
//! The engine is pure: no I/O, no shared mutable state, no clock reads.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use market_core::{MarketError, Timestamp};

// ─── Order Status ────────────────────────────────────────────────────

/// The lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, not yet submitted for payment.
    Draft,
    /// Checkout complete, waiting for the buyer's payment.
    AwaitingPayment,
    /// Payment captured and held in escrow.
    InEscrow,
    /// Seller is working on the order.
    InProgress,
    /// Seller submitted a delivery; waiting on the buyer.
    Delivered,
    /// Buyer asked for changes to the last delivery.
    RevisionRequested,
    /// Buyer accepted the delivery (terminal).
    Completed,
    /// Order was cancelled (terminal).
    Cancelled,
    /// A buyer or seller escalated the order.
    Disputed,
    /// Dispute resolved with a full refund to the buyer (terminal).
    ResolvedRefund,
    /// Dispute resolved with a partial refund (terminal).
    ResolvedPartial,
    /// Dispute resolved in the seller's favour (terminal).
    ResolvedUpheld,
}

/// Every status, in declaration order.
pub const ALL_STATUSES: [OrderStatus; 12] = [
    OrderStatus::Draft,
    OrderStatus::AwaitingPayment,
    OrderStatus::InEscrow,
    OrderStatus::InProgress,
    OrderStatus::Delivered,
    OrderStatus::RevisionRequested,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
    OrderStatus::Disputed,
    OrderStatus::ResolvedRefund,
    OrderStatus::ResolvedPartial,
    OrderStatus::ResolvedUpheld,
];

/// The three outcomes a dispute can be resolved into.
pub const DISPUTE_RESOLUTIONS: [OrderStatus; 3] = [
    OrderStatus::ResolvedRefund,
    OrderStatus::ResolvedPartial,
    OrderStatus::ResolvedUpheld,
];

impl OrderStatus {
    /// The canonical snake_case name (e.g., `"awaiting_payment"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::AwaitingPayment => "awaiting_payment",
            Self::InEscrow => "in_escrow",
            Self::InProgress => "in_progress",
            Self::Delivered => "delivered",
            Self::RevisionRequested => "revision_requested",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
            Self::ResolvedRefund => "resolved_refund",
            Self::ResolvedPartial => "resolved_partial",
            Self::ResolvedUpheld => "resolved_upheld",
        }
    }

    /// Whether this status is terminal (no outgoing transitions).
    pub fn is_terminal(&self) -> bool {
        next_statuses(*self).is_empty()
    }

    /// Whether this status is one of the dispute outcomes.
    pub fn is_dispute_resolution(&self) -> bool {
        DISPUTE_RESOLUTIONS.contains(self)
    }

    /// Look up a status by its canonical name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_STATUSES.iter().copied().find(|s| s.as_str() == name)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| MarketError::UnknownStatus(s.to_string()))
    }
}

// ─── Adjacency Table ─────────────────────────────────────────────────

/// The admissible targets from `current`, in display order.
///
/// The order is part of the contract: UIs render available actions in
/// exactly this sequence.
pub fn next_statuses(current: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match current {
        Draft => &[AwaitingPayment],
        AwaitingPayment => &[InEscrow, Cancelled],
        InEscrow => &[InProgress],
        InProgress => &[Delivered, Cancelled, Disputed],
        Delivered => &[Completed, RevisionRequested, Disputed],
        RevisionRequested => &[InProgress],
        Disputed => &[ResolvedRefund, ResolvedPartial, ResolvedUpheld],
        Completed | Cancelled | ResolvedRefund | ResolvedPartial | ResolvedUpheld => &[],
    }
}

/// Whether `to` is structurally reachable from `from` in one step.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    next_statuses(from).contains(&to)
}

/// [`next_statuses`] keyed by status name. Unknown names have no transitions.
pub fn next_statuses_by_name(current: &str) -> &'static [OrderStatus] {
    OrderStatus::from_name(current)
        .map(next_statuses)
        .unwrap_or(&[])
}

/// [`can_transition`] keyed by status names. Unknown names fail closed.
pub fn can_transition_by_name(from: &str, to: &str) -> bool {
    match (OrderStatus::from_name(from), OrderStatus::from_name(to)) {
        (Some(from), Some(to)) => can_transition(from, to),
        _ => false,
    }
}

// ─── Transition Context ──────────────────────────────────────────────

/// Facts the caller supplies so the engine can evaluate transition guards.
///
/// Every field defaults to absent/false, so an omitted context is the
/// same as `TransitionContext::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransitionContext {
    /// A payment confirmation exists for the order.
    pub has_payment: bool,
    /// Funds are held in escrow for the order.
    pub has_escrow: bool,
    /// When the latest delivery was submitted.
    pub delivered_at: Option<Timestamp>,
    /// Set only for system-triggered completion after a grace period.
    /// The caller has already checked that the period elapsed.
    pub auto_complete_days: Option<u32>,
}

impl TransitionContext {
    /// Context carrying payment and escrow proof.
    pub fn funded(has_payment: bool, has_escrow: bool) -> Self {
        Self {
            has_payment,
            has_escrow,
            ..Self::default()
        }
    }

    /// Context carrying a delivery timestamp.
    pub fn delivered(delivered_at: Option<Timestamp>) -> Self {
        Self {
            delivered_at,
            ..Self::default()
        }
    }

    /// Context for an auto-complete after `days` of buyer inaction.
    pub fn auto_complete(days: u32) -> Self {
        Self {
            auto_complete_days: Some(days),
            ..Self::default()
        }
    }
}

// ─── Rejections ──────────────────────────────────────────────────────

/// Why a transition was refused.
///
/// The `Display` text is user-facing; each variant names a distinct cause
/// so a client can tell "wrong stage" from "missing payment".
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionRejection {
    /// `to` is not in the adjacency list for `from`.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Entering escrow without a payment confirmation.
    #[error("Payment required to enter escrow")]
    PaymentRequired,

    /// Entering escrow without escrowed funds.
    #[error("Escrow required to enter escrow state")]
    EscrowRequired,

    /// Completing an order that has neither a delivery nor an auto-complete policy.
    #[error("Order must be delivered before completion")]
    NotDelivered,
}

// ─── Validation ──────────────────────────────────────────────────────

/// Check structural admissibility, then the target's guards.
///
/// `context: None` is evaluated as the default (empty) context.
pub fn check_transition(
    from: OrderStatus,
    to: OrderStatus,
    context: Option<&TransitionContext>,
) -> Result<(), TransitionRejection> {
    if !can_transition(from, to) {
        return Err(TransitionRejection::InvalidTransition { from, to });
    }

    let ctx = context.copied().unwrap_or_default();
    match to {
        OrderStatus::InEscrow => {
            if !ctx.has_payment {
                return Err(TransitionRejection::PaymentRequired);
            }
            if !ctx.has_escrow {
                return Err(TransitionRejection::EscrowRequired);
            }
        }
        OrderStatus::Completed => {
            // Only presence is checked: `Some(0)` is valid proof.
            if ctx.delivered_at.is_none() && ctx.auto_complete_days.is_none() {
                return Err(TransitionRejection::NotDelivered);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Outcome of [`validate_transition`], shaped as `{ valid, error? }` on the wire.
///
/// Validity is derived from the rejection, so a verdict cannot claim to be
/// valid while carrying one, or invalid without one. Deserializing rebuilds
/// the typed rejection from its message; a rejected verdict whose message
/// is not recognised fails to deserialize rather than reading as valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "VerdictWire", try_from = "VerdictWire")]
pub struct TransitionVerdict {
    rejection: Option<TransitionRejection>,
}

impl TransitionVerdict {
    /// An accepting verdict.
    pub fn accepted() -> Self {
        Self { rejection: None }
    }

    /// A rejecting verdict.
    pub fn rejected(rejection: TransitionRejection) -> Self {
        Self {
            rejection: Some(rejection),
        }
    }

    /// Whether the transition may be applied.
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }

    /// User-facing reason, present only when the verdict is a rejection.
    pub fn error(&self) -> Option<String> {
        self.rejection.as_ref().map(ToString::to_string)
    }

    /// The typed rejection, if any.
    pub fn rejection(&self) -> Option<&TransitionRejection> {
        self.rejection.as_ref()
    }

    /// Convert into a `Result`, for `?` propagation.
    pub fn into_result(self) -> Result<(), TransitionRejection> {
        match self.rejection {
            Some(rejection) => Err(rejection),
            None => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct VerdictWire {
    valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<TransitionVerdict> for VerdictWire {
    fn from(verdict: TransitionVerdict) -> Self {
        Self {
            valid: verdict.is_valid(),
            error: verdict.error(),
        }
    }
}

impl TryFrom<VerdictWire> for TransitionVerdict {
    type Error = String;

    fn try_from(wire: VerdictWire) -> Result<Self, Self::Error> {
        match (wire.valid, wire.error) {
            (true, None) => Ok(Self::accepted()),
            (true, Some(error)) => Err(format!("valid verdict carries an error: {error:?}")),
            (false, None) => Err("rejected verdict is missing its error".to_string()),
            (false, Some(error)) => TransitionRejection::from_message(&error)
                .map(Self::rejected)
                .ok_or_else(|| format!("unrecognised rejection: {error:?}")),
        }
    }
}

impl TransitionRejection {
    /// Recover a rejection from its `Display` text.
    pub fn from_message(message: &str) -> Option<Self> {
        match message {
            "Payment required to enter escrow" => Some(Self::PaymentRequired),
            "Escrow required to enter escrow state" => Some(Self::EscrowRequired),
            "Order must be delivered before completion" => Some(Self::NotDelivered),
            _ => {
                let (from, to) = message
                    .strip_prefix("Invalid transition from ")?
                    .split_once(" to ")?;
                Some(Self::InvalidTransition {
                    from: OrderStatus::from_name(from)?,
                    to: OrderStatus::from_name(to)?,
                })
            }
        }
    }
}

impl From<Result<(), TransitionRejection>> for TransitionVerdict {
    fn from(result: Result<(), TransitionRejection>) -> Self {
        match result {
            Ok(()) => Self::accepted(),
            Err(rejection) => Self::rejected(rejection),
        }
    }
}

/// Validate a transition and report the verdict as a value.
///
/// Pure and deterministic; safe to call speculatively, e.g. to decide
/// which action buttons a UI should enable.
pub fn validate_transition(
    from: OrderStatus,
    to: OrderStatus,
    context: Option<&TransitionContext>,
) -> TransitionVerdict {
    check_transition(from, to, context).into()
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        proptest::sample::select(ALL_STATUSES.to_vec())
    }

    fn any_context() -> impl Strategy<Value = TransitionContext> {
        (
            any::<bool>(),
            any::<bool>(),
            proptest::option::of(0u32..40_000),
            proptest::option::of(any::<u32>()),
        )
            .prop_map(|(has_payment, has_escrow, offset, days)| TransitionContext {
                has_payment,
                has_escrow,
                delivered_at: offset.and_then(|d| {
                    Timestamp::parse("2000-01-01T00:00:00Z").ok()?.plus_days(d)
                }),
                auto_complete_days: days,
            })
    }

    proptest! {
        /// Terminal statuses never admit any transition.
        #[test]
        fn terminal_states_have_no_exits(from in any_status(), to in any_status()) {
            if from.is_terminal() {
                prop_assert!(!can_transition(from, to));
            }
        }

        /// `can_transition` agrees exactly with membership in `next_statuses`.
        #[test]
        fn can_transition_matches_next_statuses(from in any_status(), to in any_status()) {
            prop_assert_eq!(can_transition(from, to), next_statuses(from).contains(&to));
        }

        /// No context can rescue a structurally invalid transition.
        #[test]
        fn structural_violation_always_invalid(
            from in any_status(),
            to in any_status(),
            ctx in any_context(),
        ) {
            if !can_transition(from, to) {
                let v = validate_transition(from, to, Some(&ctx));
                prop_assert!(!v.is_valid());
                prop_assert_eq!(
                    v.rejection().cloned(),
                    Some(TransitionRejection::InvalidTransition { from, to })
                );
            }
        }

        /// Validation has no hidden state: identical inputs, identical verdicts.
        #[test]
        fn validation_is_deterministic(
            from in any_status(),
            to in any_status(),
            ctx in proptest::option::of(any_context()),
        ) {
            let a = validate_transition(from, to, ctx.as_ref());
            let b = validate_transition(from, to, ctx.as_ref());
            prop_assert_eq!(a, b);
        }

        /// `valid` and `error` are mutually exclusive.
        #[test]
        fn verdict_is_well_formed(
            from in any_status(),
            to in any_status(),
            ctx in any_context(),
        ) {
            let v = validate_transition(from, to, Some(&ctx));
            prop_assert_eq!(v.is_valid(), v.error().is_none());
            prop_assert_eq!(v.is_valid(), v.rejection().is_none());
        }

        /// Omitting the context is the same as passing the default context.
        #[test]
        fn missing_context_equals_default(from in any_status(), to in any_status()) {
            prop_assert_eq!(
                validate_transition(from, to, None),
                validate_transition(from, to, Some(&TransitionContext::default()))
            );
        }
    }
}
