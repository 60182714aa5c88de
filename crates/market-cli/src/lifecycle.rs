//! # Lifecycle Subcommands
//!
//! Read-only views of the order lifecycle engine.
//!
//! - `next` — statuses reachable from a status, in display order.
//! - `check` — verdict for one transition given the supplied proof.
//! - `table` — the full adjacency table.
//!
//! Rendering is split from printing so the output can be tested directly.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use market_core::Timestamp;
use market_orders::LifecycleConfig;
use market_state::{
    next_statuses, next_statuses_by_name, validate_transition, OrderStatus, TransitionContext,
    TransitionVerdict, ALL_STATUSES,
};

/// Exit code when `check` finds the transition invalid.
pub const EXIT_REJECTED: u8 = 2;

// ─── next ────────────────────────────────────────────────────────────

/// Arguments for `market next`.
#[derive(Args, Debug)]
pub struct NextArgs {
    /// Current status (snake_case, e.g. `in_progress`).
    pub status: String,

    /// Print a JSON array instead of one status per line.
    #[arg(long)]
    pub json: bool,
}

/// Render the next statuses. Unknown names render as an empty list.
pub fn render_next(args: &NextArgs) -> Result<String> {
    let next = next_statuses_by_name(&args.status);
    if next.is_empty() && OrderStatus::from_name(&args.status).is_none() {
        tracing::debug!(status = %args.status, "unknown status name");
    }
    if args.json {
        return serde_json::to_string(next).context("serializing next statuses");
    }
    Ok(next.iter().map(|s| format!("{s}\n")).collect())
}

/// Execute `market next`.
pub fn run_next(args: &NextArgs) -> Result<u8> {
    let out = render_next(args)?;
    if args.json {
        println!("{out}");
    } else {
        print!("{out}");
    }
    Ok(0)
}

// ─── check ───────────────────────────────────────────────────────────

/// Arguments for `market check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Current status.
    pub from: String,

    /// Requested status.
    pub to: String,

    /// A payment confirmation exists.
    #[arg(long)]
    pub has_payment: bool,

    /// Funds are held in escrow.
    #[arg(long)]
    pub has_escrow: bool,

    /// When the latest delivery was submitted (RFC 3339, `Z` suffix).
    #[arg(long)]
    pub delivered_at: Option<String>,

    /// Treat the completion as auto-complete after this many days.
    #[arg(long, conflicts_with = "auto_complete")]
    pub auto_complete_days: Option<u32>,

    /// Treat the completion as auto-complete using the configured window.
    #[arg(long)]
    pub auto_complete: bool,
}

impl CheckArgs {
    fn context(&self, config: &LifecycleConfig) -> Result<TransitionContext> {
        let delivered_at = self
            .delivered_at
            .as_deref()
            .map(Timestamp::parse)
            .transpose()
            .context("invalid --delivered-at")?;
        let auto_complete_days = match (self.auto_complete_days, self.auto_complete) {
            (Some(days), _) => Some(days),
            (None, true) => Some(config.auto_complete_days),
            (None, false) => None,
        };
        Ok(TransitionContext {
            has_payment: self.has_payment,
            has_escrow: self.has_escrow,
            delivered_at,
            auto_complete_days,
        })
    }
}

/// Evaluate the transition described by `args`.
pub fn evaluate_check(args: &CheckArgs, config: &LifecycleConfig) -> Result<TransitionVerdict> {
    let from: OrderStatus = args.from.parse().context("invalid <FROM> status")?;
    let to: OrderStatus = args.to.parse().context("invalid <TO> status")?;
    let context = args.context(config)?;
    tracing::debug!(%from, %to, ?context, "checking transition");
    Ok(validate_transition(from, to, Some(&context)))
}

/// Execute `market check`. Exits 0 when valid, [`EXIT_REJECTED`] otherwise.
pub fn run_check(args: &CheckArgs, config: &LifecycleConfig) -> Result<u8> {
    let verdict = evaluate_check(args, config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&verdict).context("serializing verdict")?
    );
    if verdict.is_valid() {
        Ok(0)
    } else {
        tracing::info!(error = %verdict.error().unwrap_or_default(), "transition rejected");
        Ok(EXIT_REJECTED)
    }
}

// ─── table ───────────────────────────────────────────────────────────

/// Arguments for `market table`.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Print JSON instead of aligned text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TableRow {
    status: OrderStatus,
    terminal: bool,
    next: &'static [OrderStatus],
}

/// Render the adjacency table in declaration order.
pub fn render_table(args: &TableArgs) -> Result<String> {
    let rows: Vec<TableRow> = ALL_STATUSES
        .iter()
        .map(|&status| TableRow {
            status,
            terminal: status.is_terminal(),
            next: next_statuses(status),
        })
        .collect();

    if args.json {
        return serde_json::to_string_pretty(&rows).context("serializing table");
    }

    let width = ALL_STATUSES
        .iter()
        .map(|s| s.as_str().len())
        .max()
        .unwrap_or_default();
    let mut out = String::new();
    for row in &rows {
        let next = if row.terminal {
            "(terminal)".to_string()
        } else {
            row.next
                .iter()
                .map(OrderStatus::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!("{:<width$}  -> {next}\n", row.status.as_str()));
    }
    Ok(out)
}

/// Execute `market table`.
pub fn run_table(args: &TableArgs) -> Result<u8> {
    print!("{}", render_table(args)?);
    if args.json {
        println!();
    }
    Ok(0)
}
