//! # market-core — Foundational Types for the Service Marketplace
//!
//! Every other crate in the workspace depends on `market-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `OrderId`, `UserId`,
//!    `DeliveryId`, `DisputeId` are distinct types. A buyer id cannot be
//!    passed where an order id is expected.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision
//!    and renders as `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `market-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::MarketError;
pub use identity::{DeliveryId, DisputeId, OrderId, UserId};
pub use temporal::Timestamp;
