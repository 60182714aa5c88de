//! # market-orders — Order Workflow
//!
//! Turns buyer, seller, admin, and scheduler requests into lifecycle
//! transitions. The lifecycle engine in `market-state` decides whether a
//! status change is legal; this crate decides who may ask for it, gathers
//! the proof the engine needs, and records what happened.
//!
//! ## Modules
//!
//! - **Service** (`service.rs`): [`OrderService`] with one method per
//!   action plus the auto-complete sweep.
//! - **Model** (`model.rs`): order records, deliveries, disputes, actors.
//! - **Requests** (`requests.rs`): action payloads and their shape checks.
//! - **Store** (`store.rs`): shared map with atomic check-then-set.
//! - **Config** (`config.rs`): workflow policy from YAML and environment.
//! - **Error** (`error.rs`): [`OrderActionError`] with HTTP status mapping.
//!
//! ## Crate Policy
//!
//! - No web framework dependency. Callers map [`OrderActionError`] to
//!   responses through `status_code()` and `code()`.
//! - A failed action leaves the stored order exactly as it was.
//! - No `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod model;
pub mod requests;
pub mod service;
pub mod store;

pub use config::{ConfigError, LifecycleConfig};
pub use error::OrderActionError;
pub use model::{
    Actor, ActorRole, Delivery, DeliveryStatus, Dispute, DisputeResolution, OrderRecord,
};
pub use requests::{
    CancelRequest, CompleteRequest, DeliverRequest, DisputeRequest, PayRequest, ResolveRequest,
    RevisionRequest,
};
pub use service::{OrderAction, OrderService};
pub use store::Store;
