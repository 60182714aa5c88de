//! # Order Service
//!
//! Applies buyer, seller, admin, and scheduler actions to stored orders.
//!
//! Each action runs inside a single [`Store::try_update()`] call:
//! authorize the actor, assemble the [`TransitionContext`] from stored and
//! requested proof, let the engine decide, then write the side data. Any
//! failure returns before the first write, so a rejected action never
//! leaves a half-updated order behind.

use tracing::{debug, info, warn};

use market_core::{DeliveryId, DisputeId, OrderId, Timestamp, UserId};
use market_state::{can_transition, OrderStatus, TransitionContext};

use crate::config::LifecycleConfig;
use crate::error::OrderActionError;
use crate::model::{
    Actor, Delivery, DeliveryStatus, Dispute, DisputeResolution, OrderRecord,
};
use crate::requests::{
    CancelRequest, CompleteRequest, DeliverRequest, DisputeRequest, PayRequest,
    ResolveRequest, RevisionRequest,
};
use crate::store::Store;

const NO_ACCESS: &str = "You don't have access to this order";

// ─── Actions ─────────────────────────────────────────────────────────

/// An operation that moves an order to a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderAction {
    /// `awaiting_payment → in_escrow`
    Pay,
    /// `in_escrow → in_progress`
    Start,
    /// `in_progress → delivered`
    Deliver,
    /// `delivered → revision_requested`
    RequestRevision,
    /// `revision_requested → in_progress`
    Resume,
    /// `delivered → completed`, on explicit acceptance.
    Complete,
    /// `delivered → completed`, after the grace period.
    AutoComplete,
    /// `awaiting_payment | in_progress → cancelled`
    Cancel,
    /// `in_progress | delivered → disputed`
    OpenDispute,
    /// `disputed → resolved_*`
    ResolveDispute,
}

impl OrderAction {
    /// Stable name, also recorded as the transition reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pay => "pay",
            Self::Start => "start",
            Self::Deliver => "deliver",
            Self::RequestRevision => "request_revision",
            Self::Resume => "resume",
            Self::Complete => "complete",
            Self::AutoComplete => "auto_complete",
            Self::Cancel => "cancel",
            Self::OpenDispute => "open_dispute",
            Self::ResolveDispute => "resolve_dispute",
        }
    }

    /// Check that `actor` may perform this action on `order`.
    ///
    /// Non-participants are refused before the action-specific rule is
    /// consulted. The scheduler is a participant only for auto-completion.
    pub fn authorize(&self, order: &OrderRecord, actor: &Actor) -> Result<(), OrderActionError> {
        let buyer = order.is_buyer(actor);
        let seller = order.is_seller(actor);
        let admin = actor.is_admin();
        let system = actor.is_system() && *self == Self::AutoComplete;

        if !(buyer || seller || admin || system) {
            return Err(OrderActionError::Forbidden(NO_ACCESS.into()));
        }

        let (allowed, denial) = match self {
            Self::Pay => (buyer || admin, "Only buyer can pay for order"),
            Self::Start => (seller || admin, "Only seller can start order"),
            Self::Deliver => (seller || admin, "Only seller can deliver order"),
            Self::RequestRevision => (buyer || admin, "Only buyer can request revision"),
            Self::Resume => (seller || admin, "Only seller can resume order after revision"),
            Self::Complete => (buyer || admin, "Only buyer can complete order"),
            Self::AutoComplete => (buyer || admin || system, "Only buyer can complete order"),
            Self::Cancel | Self::OpenDispute => (buyer || seller || admin, NO_ACCESS),
            Self::ResolveDispute => (admin, "Only an admin can resolve disputes"),
        };
        if allowed {
            Ok(())
        } else {
            Err(OrderActionError::Forbidden(denial.into()))
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested status change.
struct Step {
    action: OrderAction,
    to: OrderStatus,
    at: Timestamp,
}

// ─── Service ─────────────────────────────────────────────────────────

/// Order workflow over an in-memory store. Clones share the same orders.
#[derive(Debug, Clone, Default)]
pub struct OrderService {
    orders: Store<OrderId, OrderRecord>,
    config: LifecycleConfig,
}

impl OrderService {
    /// An empty service with the given policy.
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            orders: Store::new(),
            config,
        }
    }

    /// The active policy.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Open a new order at checkout. It starts in `awaiting_payment`, with
    /// the `draft → awaiting_payment` step in its log.
    pub fn create_order(
        &self,
        buyer_id: UserId,
        seller_id: UserId,
    ) -> Result<OrderRecord, OrderActionError> {
        let mut order = OrderRecord::new(buyer_id, seller_id);
        order
            .lifecycle
            .apply_at(OrderStatus::AwaitingPayment, None, "checkout", order.created_at)?;
        self.orders.insert(order.id, order.clone());
        info!(order_id = %order.id, buyer = %buyer_id, seller = %seller_id, "order created");
        Ok(order)
    }

    /// Current snapshot of an order.
    pub fn get(&self, id: &OrderId) -> Result<OrderRecord, OrderActionError> {
        self.orders
            .get(id)
            .ok_or_else(|| OrderActionError::order_not_found(id))
    }

    /// Buyer pays; funds enter escrow.
    pub fn pay(
        &self,
        id: &OrderId,
        actor: &Actor,
        req: PayRequest,
    ) -> Result<OrderRecord, OrderActionError> {
        let context = TransitionContext::funded(req.has_payment(), req.has_escrow());
        self.transition(
            id,
            actor,
            Step {
                action: OrderAction::Pay,
                to: OrderStatus::InEscrow,
                at: Timestamp::now(),
            },
            |_| Ok(Some(context)),
            move |order, at| {
                order.payment_intent_id = Some(req.payment_intent_id);
                order.escrow_id = Some(req.escrow_id);
                order.paid_at = Some(at);
            },
        )
    }

    /// Seller starts work on a funded order.
    pub fn start(&self, id: &OrderId, actor: &Actor) -> Result<OrderRecord, OrderActionError> {
        self.simple(id, actor, OrderAction::Start, OrderStatus::InProgress)
    }

    /// Seller submits work.
    pub fn deliver(
        &self,
        id: &OrderId,
        actor: &Actor,
        req: DeliverRequest,
    ) -> Result<OrderRecord, OrderActionError> {
        req.validate()?;
        self.transition(
            id,
            actor,
            Step {
                action: OrderAction::Deliver,
                to: OrderStatus::Delivered,
                at: Timestamp::now(),
            },
            |_| Ok(None),
            move |order, at| {
                order.deliveries.push(Delivery {
                    id: DeliveryId::new(),
                    message: req.message,
                    files: req.files,
                    status: DeliveryStatus::Submitted,
                    delivered_at: at,
                });
                order.delivered_at = Some(at);
            },
        )
    }

    /// Buyer asks for changes to the latest delivery.
    pub fn request_revision(
        &self,
        id: &OrderId,
        actor: &Actor,
        req: RevisionRequest,
    ) -> Result<OrderRecord, OrderActionError> {
        req.validate()?;
        debug!(order_id = %id, reason = %req.reason, "revision requested");
        self.transition(
            id,
            actor,
            Step {
                action: OrderAction::RequestRevision,
                to: OrderStatus::RevisionRequested,
                at: Timestamp::now(),
            },
            |_| Ok(None),
            |order, _| {
                if let Some(delivery) = order.latest_delivery_mut() {
                    delivery.status = DeliveryStatus::RevisionRequested;
                }
            },
        )
    }

    /// Seller resumes work after a revision request.
    pub fn resume(&self, id: &OrderId, actor: &Actor) -> Result<OrderRecord, OrderActionError> {
        self.simple(id, actor, OrderAction::Resume, OrderStatus::InProgress)
    }

    /// Buyer accepts the delivery, or completes under the auto-complete
    /// policy when `req.auto_complete` is set.
    pub fn complete(
        &self,
        id: &OrderId,
        actor: &Actor,
        req: CompleteRequest,
    ) -> Result<OrderRecord, OrderActionError> {
        self.complete_at(id, actor, req, Timestamp::now())
    }

    fn complete_at(
        &self,
        id: &OrderId,
        actor: &Actor,
        req: CompleteRequest,
        now: Timestamp,
    ) -> Result<OrderRecord, OrderActionError> {
        let days = self.config.auto_complete_days;
        let action = if req.auto_complete {
            OrderAction::AutoComplete
        } else {
            OrderAction::Complete
        };
        self.transition(
            id,
            actor,
            Step {
                action,
                to: OrderStatus::Completed,
                at: now,
            },
            |order| {
                let mut context = TransitionContext::delivered(order.delivered_at);
                if req.auto_complete {
                    // Structural refusals are left to the engine.
                    if can_transition(order.status(), OrderStatus::Completed) {
                        let elapsed = order
                            .delivered_at
                            .is_some_and(|at| at.days_elapsed_since(now, days));
                        if !elapsed {
                            return Err(OrderActionError::Validation(
                                "auto-complete window has not elapsed".into(),
                            ));
                        }
                    }
                    context.auto_complete_days = Some(days);
                }
                Ok(Some(context))
            },
            |order, at| {
                if let Some(delivery) = order.latest_delivery_mut() {
                    delivery.status = DeliveryStatus::Accepted;
                }
                order.completed_at = Some(at);
            },
        )
    }

    /// Buyer or seller cancels an unpaid or in-progress order.
    pub fn cancel(
        &self,
        id: &OrderId,
        actor: &Actor,
        req: CancelRequest,
    ) -> Result<OrderRecord, OrderActionError> {
        self.transition(
            id,
            actor,
            Step {
                action: OrderAction::Cancel,
                to: OrderStatus::Cancelled,
                at: Timestamp::now(),
            },
            |_| Ok(None),
            move |order, at| {
                order.cancelled_at = Some(at);
                order.cancellation_reason = req.reason;
            },
        )
    }

    /// Buyer or seller escalates to a dispute.
    pub fn open_dispute(
        &self,
        id: &OrderId,
        actor: &Actor,
        req: DisputeRequest,
    ) -> Result<OrderRecord, OrderActionError> {
        req.validate()?;
        let opened_by = actor.user_id;
        self.transition(
            id,
            actor,
            Step {
                action: OrderAction::OpenDispute,
                to: OrderStatus::Disputed,
                at: Timestamp::now(),
            },
            |_| Ok(None),
            move |order, at| {
                order.dispute = Some(Dispute {
                    id: DisputeId::new(),
                    opened_by,
                    reason: req.reason,
                    notes: req.notes,
                    opened_at: at,
                    resolution: None,
                });
            },
        )
    }

    /// Admin settles the dispute identified by `dispute_id`, moving its
    /// order to the chosen `resolved_*` status.
    pub fn resolve_dispute(
        &self,
        dispute_id: &DisputeId,
        actor: &Actor,
        req: ResolveRequest,
    ) -> Result<OrderRecord, OrderActionError> {
        req.validate()?;
        let order_id = self
            .orders
            .find_keys(|o| o.dispute.as_ref().is_some_and(|d| d.id == *dispute_id))
            .into_iter()
            .next()
            .ok_or_else(|| OrderActionError::NotFound(format!("dispute {dispute_id} not found")))?;

        let resolved_by = actor.user_id;
        let outcome = req.resolution;
        self.transition(
            &order_id,
            actor,
            Step {
                action: OrderAction::ResolveDispute,
                to: outcome,
                at: Timestamp::now(),
            },
            |order| match &order.dispute {
                Some(d) if d.is_open() => Ok(None),
                _ => Err(OrderActionError::Conflict(format!(
                    "dispute {dispute_id} is already resolved"
                ))),
            },
            move |order, at| {
                if let Some(dispute) = order.dispute.as_mut() {
                    dispute.resolution = Some(DisputeResolution {
                        outcome,
                        amount_minor: req.amount_minor,
                        notes: req.notes,
                        resolved_by,
                        resolved_at: at,
                    });
                }
            },
        )
    }

    /// Complete every delivered order whose grace period has elapsed by
    /// `now`, acting as the scheduler. Returns the orders completed.
    ///
    /// An order that moved on between the scan and its update is skipped.
    pub fn auto_complete_due(&self, now: Timestamp) -> Vec<OrderId> {
        let days = self.config.auto_complete_days;
        let due = self.orders.find_keys(|o| {
            o.status() == OrderStatus::Delivered
                && o.delivered_at.is_some_and(|at| at.days_elapsed_since(now, days))
        });
        debug!(candidates = due.len(), days, "auto-complete sweep");

        let system = Actor::system();
        let request = CompleteRequest {
            auto_complete: true,
        };
        due.into_iter()
            .filter(|id| match self.complete_at(id, &system, request, now) {
                Ok(_) => true,
                Err(e) => {
                    warn!(order_id = %id, error = %e, "skipping auto-completion");
                    false
                }
            })
            .collect()
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn simple(
        &self,
        id: &OrderId,
        actor: &Actor,
        action: OrderAction,
        to: OrderStatus,
    ) -> Result<OrderRecord, OrderActionError> {
        self.transition(
            id,
            actor,
            Step {
                action,
                to,
                at: Timestamp::now(),
            },
            |_| Ok(None),
            |_, _| {},
        )
    }

    /// Run one status change under the store's write lock.
    ///
    /// `guard` inspects the current record and yields the engine context;
    /// `write` records the side data once the engine accepted the change.
    fn transition(
        &self,
        id: &OrderId,
        actor: &Actor,
        step: Step,
        guard: impl FnOnce(&OrderRecord) -> Result<Option<TransitionContext>, OrderActionError>,
        write: impl FnOnce(&mut OrderRecord, Timestamp),
    ) -> Result<OrderRecord, OrderActionError> {
        let result = self
            .orders
            .try_update(id, |order| commit(order, actor, &step, guard, write));

        match result {
            Some(Ok((from, order))) => {
                info!(
                    order_id = %id,
                    from = %from,
                    to = %step.to,
                    action = %step.action,
                    actor = %actor.user_id,
                    version = order.version,
                    "order status changed"
                );
                Ok(order)
            }
            Some(Err(e)) => {
                warn!(
                    order_id = %id,
                    action = %step.action,
                    actor = %actor.user_id,
                    code = e.code(),
                    error = %e,
                    "order action rejected"
                );
                Err(e)
            }
            None => Err(OrderActionError::order_not_found(id)),
        }
    }
}

fn commit(
    order: &mut OrderRecord,
    actor: &Actor,
    step: &Step,
    guard: impl FnOnce(&OrderRecord) -> Result<Option<TransitionContext>, OrderActionError>,
    write: impl FnOnce(&mut OrderRecord, Timestamp),
) -> Result<(OrderStatus, OrderRecord), OrderActionError> {
    step.action.authorize(order, actor)?;
    let context = guard(order)?;
    let from = order.status();
    order
        .lifecycle
        .apply_at(step.to, context.as_ref(), step.action.as_str(), step.at)?;
    write(order, step.at);
    order.version += 1;
    Ok((from, order.clone()))
}
