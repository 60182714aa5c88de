//! # Order Lifecycle Record
//!
//! Couples an order's current status with an append-only log of the
//! transitions that produced it. Every mutation goes through
//! [`OrderLifecycle::apply()`], which consults the engine first; a
//! rejected transition leaves both the status and the log untouched.

use serde::{Deserialize, Serialize};

use market_core::Timestamp;

use crate::order::{
    check_transition, next_statuses, OrderStatus, TransitionContext, TransitionRejection,
};

/// Record of a single status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTransitionRecord {
    /// Status before the transition.
    pub from_status: OrderStatus,
    /// Status after the transition.
    pub to_status: OrderStatus,
    /// When the transition was applied.
    pub timestamp: Timestamp,
    /// Why the transition happened (free text, e.g. the action name).
    pub reason: String,
}

/// Current status plus the ordered history of how the order got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLifecycle {
    status: OrderStatus,
    transitions: Vec<OrderTransitionRecord>,
}

impl OrderLifecycle {
    /// A fresh lifecycle in `draft`.
    pub fn new() -> Self {
        Self::with_status(OrderStatus::Draft)
    }

    /// Restore a lifecycle from a persisted status. The log starts empty.
    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status,
            transitions: Vec::new(),
        }
    }

    /// The current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Whether the order can never change status again.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The transition log, oldest first.
    pub fn transitions(&self) -> &[OrderTransitionRecord] {
        &self.transitions
    }

    /// Statuses reachable from the current one, in display order.
    pub fn available_transitions(&self) -> &'static [OrderStatus] {
        next_statuses(self.status)
    }

    /// Validate and apply a transition, stamping it with the current time.
    pub fn apply(
        &mut self,
        to: OrderStatus,
        context: Option<&TransitionContext>,
        reason: &str,
    ) -> Result<(), TransitionRejection> {
        self.apply_at(to, context, reason, Timestamp::now())
    }

    /// Validate and apply a transition with an explicit timestamp.
    pub fn apply_at(
        &mut self,
        to: OrderStatus,
        context: Option<&TransitionContext>,
        reason: &str,
        at: Timestamp,
    ) -> Result<(), TransitionRejection> {
        check_transition(self.status, to, context)?;
        self.transitions.push(OrderTransitionRecord {
            from_status: self.status,
            to_status: to,
            timestamp: at,
            reason: reason.to_string(),
        });
        self.status = to;
        Ok(())
    }
}

impl Default for OrderLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    fn funded() -> TransitionContext {
        TransitionContext::funded(true, true)
    }

    fn delivered_lifecycle() -> OrderLifecycle {
        let mut lc = OrderLifecycle::new();
        lc.apply(AwaitingPayment, None, "checkout").unwrap();
        lc.apply(InEscrow, Some(&funded()), "pay").unwrap();
        lc.apply(InProgress, None, "start").unwrap();
        lc.apply(Delivered, None, "deliver").unwrap();
        lc
    }

    #[test]
    fn test_new_starts_in_draft() {
        let lc = OrderLifecycle::new();
        assert_eq!(lc.status(), Draft);
        assert!(lc.transitions().is_empty());
        assert_eq!(lc.available_transitions(), &[AwaitingPayment]);
    }

    #[test]
    fn test_full_lifecycle_logs_every_step() {
        let mut lc = delivered_lifecycle();
        let ctx = TransitionContext::delivered(Some(Timestamp::now()));
        lc.apply(Completed, Some(&ctx), "accept").unwrap();

        assert!(lc.is_terminal());
        assert_eq!(lc.transitions().len(), 5);
        let last = lc.transitions().last().unwrap();
        assert_eq!(last.from_status, Delivered);
        assert_eq!(last.to_status, Completed);
        assert_eq!(last.reason, "accept");
    }

    #[test]
    fn test_revision_loop() {
        let mut lc = delivered_lifecycle();
        lc.apply(RevisionRequested, None, "changes").unwrap();
        assert!(lc.apply(Delivered, None, "redeliver").is_err());
        lc.apply(InProgress, None, "resume").unwrap();
        lc.apply(Delivered, None, "redeliver").unwrap();
        assert_eq!(lc.status(), Delivered);
    }

    #[test]
    fn test_rejection_leaves_state_untouched() {
        let mut lc = OrderLifecycle::with_status(AwaitingPayment);
        let err = lc
            .apply(InEscrow, Some(&TransitionContext::funded(true, false)), "pay")
            .unwrap_err();
        assert_eq!(err, TransitionRejection::EscrowRequired);
        assert_eq!(lc.status(), AwaitingPayment);
        assert!(lc.transitions().is_empty());
    }

    #[test]
    fn test_terminal_lifecycle_refuses_everything() {
        let mut lc = OrderLifecycle::with_status(Cancelled);
        assert!(lc.is_terminal());
        assert!(lc.available_transitions().is_empty());
        let err = lc.apply(InProgress, None, "reopen").unwrap_err();
        assert_eq!(
            err,
            TransitionRejection::InvalidTransition {
                from: Cancelled,
                to: InProgress
            }
        );
    }

    #[test]
    fn test_dispute_resolution_is_final() {
        let mut lc = OrderLifecycle::with_status(InProgress);
        lc.apply(Disputed, None, "dispute").unwrap();
        lc.apply(ResolvedPartial, None, "split").unwrap();
        assert!(lc.is_terminal());
        assert!(lc.apply(Disputed, None, "again").is_err());
    }

    #[test]
    fn test_apply_at_uses_given_timestamp() {
        let at = Timestamp::parse("2026-04-01T08:00:00Z").unwrap();
        let mut lc = OrderLifecycle::new();
        lc.apply_at(AwaitingPayment, None, "checkout", at).unwrap();
        assert_eq!(lc.transitions()[0].timestamp, at);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let lc = delivered_lifecycle();
        let json = serde_json::to_string(&lc).unwrap();
        let parsed: OrderLifecycle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, lc);
        assert!(json.contains("\"status\":\"delivered\""));
    }
}
