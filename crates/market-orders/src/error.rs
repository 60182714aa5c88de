//! # Order Action Errors
//!
//! Every failed order operation reports one of these. None of them leave
//! a partial write behind. [`OrderActionError::status_code()`] and
//! [`OrderActionError::code()`] give the HTTP layer what it needs without
//! this crate depending on a web framework.

use thiserror::Error;

use market_core::OrderId;
use market_state::TransitionRejection;

/// Errors returned by [`crate::OrderService`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderActionError {
    /// The order (or the dispute being resolved) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The actor may not perform this action on this order.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The request itself is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The lifecycle engine refused the transition.
    #[error("{0}")]
    Rejected(#[from] TransitionRejection),

    /// The order changed underneath the caller.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl OrderActionError {
    pub(crate) fn order_not_found(id: &OrderId) -> Self {
        Self::NotFound(format!("order {id} not found"))
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Forbidden(_) => 403,
            Self::Validation(_) => 422,
            Self::Rejected(_) => 400,
            Self::Conflict(_) => 409,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Rejected(TransitionRejection::InvalidTransition { .. }) => "INVALID_TRANSITION",
            Self::Rejected(TransitionRejection::PaymentRequired) => "PAYMENT_REQUIRED",
            Self::Rejected(TransitionRejection::EscrowRequired) => "ESCROW_REQUIRED",
            Self::Rejected(TransitionRejection::NotDelivered) => "NOT_DELIVERED",
            Self::Conflict(_) => "CONFLICT",
        }
    }

    /// The engine's rejection, if that is what this error is.
    pub fn rejection(&self) -> Option<&TransitionRejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_state::OrderStatus;

    #[test]
    fn rejected_displays_engine_message_verbatim() {
        let err: OrderActionError = TransitionRejection::PaymentRequired.into();
        assert_eq!(err.to_string(), "Payment required to enter escrow");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "PAYMENT_REQUIRED");
    }

    #[test]
    fn invalid_transition_code() {
        let err: OrderActionError = TransitionRejection::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Disputed,
        }
        .into();
        assert_eq!(err.code(), "INVALID_TRANSITION");
        assert_eq!(
            err.to_string(),
            "Invalid transition from completed to disputed"
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(OrderActionError::NotFound("x".into()).status_code(), 404);
        assert_eq!(OrderActionError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(OrderActionError::Validation("x".into()).status_code(), 422);
        assert_eq!(OrderActionError::Conflict("x".into()).status_code(), 409);
    }

    #[test]
    fn rejection_accessor() {
        let err: OrderActionError = TransitionRejection::NotDelivered.into();
        assert_eq!(err.rejection(), Some(&TransitionRejection::NotDelivered));
        assert!(OrderActionError::Forbidden("x".into()).rejection().is_none());
    }
}
