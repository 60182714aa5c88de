//! # Error Types
//!
//! Errors shared across the marketplace crates. Domain crates define their
//! own narrower enums (transition rejections, workflow errors) and convert
//! into these at crate boundaries where a single type is convenient.

use thiserror::Error;

/// Top-level error type for the marketplace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// A status name did not match any declared order status.
    #[error("unknown order status: {0:?}")]
    UnknownStatus(String),

    /// A timestamp string was malformed or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An identifier string was not a valid UUID.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
