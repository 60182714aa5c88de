//! # market-cli — Order Lifecycle CLI
//!
//! Provides the `market` command-line interface over the lifecycle engine.
//!
//! ## Subcommands
//!
//! - `market next <status>` — statuses reachable from `status`.
//! - `market check <from> <to>` — verdict JSON; exit code 2 when rejected.
//! - `market table` — the full adjacency table.
//! - `market config` — effective workflow policy.
//!
//! ```bash
//! market next delivered
//! market check awaiting_payment in_escrow --has-payment --has-escrow
//! market check delivered completed --auto-complete --config market.yaml
//! ```

pub mod config;
pub mod lifecycle;
