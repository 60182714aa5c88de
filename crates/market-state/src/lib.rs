//! # market-state — Order Lifecycle Engine
//!
//! The referee for every order-mutating operation in the marketplace.
//! Given a current status, a target status, and optional proof, it answers
//! whether the move is allowed and, if not, exactly why.
//!
//! ## Modules
//!
//! - **Engine** (`order.rs`): the closed `OrderStatus` set, the ordered
//!   adjacency table, and the guard checks on entering `in_escrow` and
//!   `completed`. Pure functions over `'static` data.
//!
//! - **Lifecycle** (`lifecycle.rs`): an order's current status with an
//!   append-only transition log. Every mutation is validated by the engine.
//!
//! ## Design
//!
//! Terminal statuses (`completed`, `cancelled`, `resolved_*`) have empty
//! adjacency lists, so no order can be un-completed or un-cancelled. The
//! table is an exhaustive `match`: adding a status is a compile error until
//! its outgoing edges are declared.
//!
//! Rejections are values, not panics. A stale "complete" click after the
//! order was cancelled is an ordinary, expected outcome.

pub mod lifecycle;
pub mod order;

pub use lifecycle::{OrderLifecycle, OrderTransitionRecord};
pub use order::{
    can_transition, can_transition_by_name, check_transition, next_statuses,
    next_statuses_by_name, validate_transition, OrderStatus, TransitionContext,
    TransitionRejection, TransitionVerdict, ALL_STATUSES, DISPUTE_RESOLUTIONS,
};
