//! # Order Records
//!
//! The workflow layer's view of an order: who the parties are, what proof
//! has been collected (payment, escrow, deliveries), and the lifecycle the
//! engine guards. Side data is only written after the engine accepted the
//! status change it belongs to.

use serde::{Deserialize, Serialize};

use market_core::{DeliveryId, DisputeId, OrderId, Timestamp, UserId};
use market_state::{OrderLifecycle, OrderStatus};

// ─── Actors ──────────────────────────────────────────────────────────

/// Platform-level role of the caller. Buyer and seller are not roles:
/// they are derived per order from the order's party ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// A regular marketplace user.
    Member,
    /// Platform operator; may act on any order.
    Admin,
    /// The scheduler identity used for auto-completion.
    System,
}

/// The authenticated caller of an order operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Who is acting.
    pub user_id: UserId,
    /// Their platform role.
    pub role: ActorRole,
}

impl Actor {
    /// A regular user.
    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            role: ActorRole::Member,
        }
    }

    /// A platform admin.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: ActorRole::Admin,
        }
    }

    /// The auto-complete scheduler.
    pub fn system() -> Self {
        Self {
            user_id: UserId(uuid::Uuid::nil()),
            role: ActorRole::System,
        }
    }

    /// Whether this actor is a platform admin.
    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    /// Whether this actor is the scheduler.
    pub fn is_system(&self) -> bool {
        self.role == ActorRole::System
    }
}

// ─── Deliveries ──────────────────────────────────────────────────────

/// Review state of a single delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Waiting on the buyer.
    Submitted,
    /// Buyer asked for changes.
    RevisionRequested,
    /// Buyer (or auto-complete) accepted it.
    Accepted,
}

/// Work submitted by the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Delivery identifier.
    pub id: DeliveryId,
    /// Optional note from the seller.
    pub message: Option<String>,
    /// URLs of delivered files.
    pub files: Vec<String>,
    /// Review state.
    pub status: DeliveryStatus,
    /// When it was submitted.
    pub delivered_at: Timestamp,
}

// ─── Disputes ────────────────────────────────────────────────────────

/// Outcome recorded when an admin resolves a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeResolution {
    /// One of the `resolved_*` statuses.
    pub outcome: OrderStatus,
    /// Refund amount in minor currency units, if any.
    pub amount_minor: Option<u64>,
    /// Admin notes.
    pub notes: Option<String>,
    /// The admin who resolved it.
    pub resolved_by: UserId,
    /// When it was resolved.
    pub resolved_at: Timestamp,
}

/// An escalation raised by the buyer or seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Dispute identifier.
    pub id: DisputeId,
    /// Who opened it.
    pub opened_by: UserId,
    /// Why it was opened.
    pub reason: String,
    /// Additional context.
    pub notes: Option<String>,
    /// When it was opened.
    pub opened_at: Timestamp,
    /// Present once an admin resolved the dispute.
    pub resolution: Option<DisputeResolution>,
}

impl Dispute {
    /// Whether the dispute is still awaiting resolution.
    pub fn is_open(&self) -> bool {
        self.resolution.is_none()
    }
}

// ─── Order ───────────────────────────────────────────────────────────

/// A marketplace order as held by the workflow layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order identifier.
    pub id: OrderId,
    /// Purchasing party.
    pub buyer_id: UserId,
    /// Selling party.
    pub seller_id: UserId,
    /// Status and transition history.
    pub lifecycle: OrderLifecycle,
    /// Payment provider reference, set on payment.
    pub payment_intent_id: Option<String>,
    /// Escrow reference, set on payment.
    pub escrow_id: Option<String>,
    /// When funds entered escrow.
    pub paid_at: Option<Timestamp>,
    /// When the latest delivery was submitted.
    pub delivered_at: Option<Timestamp>,
    /// When the order completed.
    pub completed_at: Option<Timestamp>,
    /// When the order was cancelled.
    pub cancelled_at: Option<Timestamp>,
    /// Reason given on cancellation.
    pub cancellation_reason: Option<String>,
    /// Deliveries, oldest first.
    pub deliveries: Vec<Delivery>,
    /// The order's dispute, if one was opened.
    pub dispute: Option<Dispute>,
    /// When the record was created.
    pub created_at: Timestamp,
    /// Incremented on every committed transition.
    pub version: u64,
}

impl OrderRecord {
    /// A new order between `buyer_id` and `seller_id`, in `draft`.
    pub fn new(buyer_id: UserId, seller_id: UserId) -> Self {
        Self {
            id: OrderId::new(),
            buyer_id,
            seller_id,
            lifecycle: OrderLifecycle::new(),
            payment_intent_id: None,
            escrow_id: None,
            paid_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            deliveries: Vec::new(),
            dispute: None,
            created_at: Timestamp::now(),
            version: 0,
        }
    }

    /// The current status.
    pub fn status(&self) -> OrderStatus {
        self.lifecycle.status()
    }

    /// Whether `actor` is the buyer of this order.
    pub fn is_buyer(&self, actor: &Actor) -> bool {
        actor.user_id == self.buyer_id
    }

    /// Whether `actor` is the seller of this order.
    pub fn is_seller(&self, actor: &Actor) -> bool {
        actor.user_id == self.seller_id
    }

    /// The most recent delivery.
    pub fn latest_delivery(&self) -> Option<&Delivery> {
        self.deliveries.last()
    }

    pub(crate) fn latest_delivery_mut(&mut self) -> Option<&mut Delivery> {
        self.deliveries.last_mut()
    }
}
