//! # Action Requests
//!
//! Payloads for each order operation. `validate()` checks shape only
//! (non-blank reasons, well-formed URLs, a real resolution outcome).
//! Whether the order may actually move is the engine's call.

use serde::{Deserialize, Serialize};
use url::Url;

use market_state::OrderStatus;

use crate::error::OrderActionError;

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn require_reason(reason: &str) -> Result<(), OrderActionError> {
    if is_blank(reason) {
        return Err(OrderActionError::Validation("reason must not be empty".into()));
    }
    Ok(())
}

/// Buyer pays: `awaiting_payment → in_escrow`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRequest {
    /// Payment provider confirmation.
    pub payment_intent_id: String,
    /// Escrow hold reference.
    pub escrow_id: String,
}

impl PayRequest {
    /// Whether a payment confirmation was supplied.
    pub fn has_payment(&self) -> bool {
        !is_blank(&self.payment_intent_id)
    }

    /// Whether an escrow reference was supplied.
    pub fn has_escrow(&self) -> bool {
        !is_blank(&self.escrow_id)
    }
}

/// Seller submits work: `in_progress → delivered`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverRequest {
    /// Optional note to the buyer.
    #[serde(default)]
    pub message: Option<String>,
    /// Delivered file URLs.
    #[serde(default)]
    pub files: Vec<String>,
}

impl DeliverRequest {
    /// Every file must be an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<(), OrderActionError> {
        for file in &self.files {
            let url = Url::parse(file).map_err(|e| {
                OrderActionError::Validation(format!("invalid file URL {file:?}: {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(OrderActionError::Validation(format!(
                    "file URL must use http or https: {file:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Buyer asks for changes: `delivered → revision_requested`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRequest {
    /// What needs to change.
    pub reason: String,
    /// Additional detail.
    #[serde(default)]
    pub notes: Option<String>,
}

impl RevisionRequest {
    /// The reason must not be blank.
    pub fn validate(&self) -> Result<(), OrderActionError> {
        require_reason(&self.reason)
    }
}

/// Buyer accepts: `delivered → completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteRequest {
    /// Complete under the auto-complete policy instead of explicit acceptance.
    #[serde(default)]
    pub auto_complete: bool,
}

/// Buyer or seller cancels: `awaiting_payment | in_progress → cancelled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Optional explanation.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Buyer or seller escalates: `in_progress | delivered → disputed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeRequest {
    /// Why the dispute is being opened.
    pub reason: String,
    /// Additional detail.
    #[serde(default)]
    pub notes: Option<String>,
}

impl DisputeRequest {
    /// The reason must not be blank.
    pub fn validate(&self) -> Result<(), OrderActionError> {
        require_reason(&self.reason)
    }
}

/// Admin settles a dispute: `disputed → resolved_*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// One of `resolved_refund`, `resolved_partial`, `resolved_upheld`.
    pub resolution: OrderStatus,
    /// Refund amount in minor currency units.
    #[serde(default)]
    pub amount_minor: Option<u64>,
    /// Admin notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl ResolveRequest {
    /// The resolution must be a dispute outcome.
    pub fn validate(&self) -> Result<(), OrderActionError> {
        if !self.resolution.is_dispute_resolution() {
            return Err(OrderActionError::Validation(format!(
                "{} is not a dispute resolution",
                self.resolution
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pay_blank_fields_are_missing_proof() {
        let req = PayRequest {
            payment_intent_id: "  ".into(),
            escrow_id: "esc_1".into(),
        };
        assert!(!req.has_payment());
        assert!(req.has_escrow());
        assert!(!PayRequest::default().has_escrow());
    }

    #[test]
    fn deliver_accepts_https_files() {
        let req = DeliverRequest {
            message: Some("done".into()),
            files: vec![
                "https://cdn.example.com/a.zip".into(),
                "http://files.example.org/b.pdf".into(),
            ],
        };
        assert!(req.validate().is_ok());
        assert!(DeliverRequest::default().validate().is_ok());
    }

    #[test]
    fn deliver_rejects_bad_urls() {
        for bad in ["not a url", "/relative/path.zip", "ftp://example.com/a.zip"] {
            let req = DeliverRequest {
                message: None,
                files: vec![bad.into()],
            };
            assert!(
                matches!(req.validate(), Err(OrderActionError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn reasons_must_not_be_blank() {
        let rev = RevisionRequest {
            reason: " ".into(),
            notes: None,
        };
        assert!(rev.validate().is_err());
        let dispute = DisputeRequest {
            reason: "never delivered".into(),
            notes: None,
        };
        assert!(dispute.validate().is_ok());
    }

    #[test]
    fn resolve_requires_resolution_status() {
        let ok = ResolveRequest {
            resolution: OrderStatus::ResolvedRefund,
            amount_minor: Some(5_000),
            notes: None,
        };
        assert!(ok.validate().is_ok());

        let bad = ResolveRequest {
            resolution: OrderStatus::Cancelled,
            amount_minor: None,
            notes: None,
        };
        let err = bad.validate().unwrap_err();
        assert_eq!(
            err,
            OrderActionError::Validation("cancelled is not a dispute resolution".into())
        );
    }

    #[test]
    fn requests_deserialize_with_defaults() {
        let complete: CompleteRequest = serde_json::from_str("{}").unwrap();
        assert!(!complete.auto_complete);
        let deliver: DeliverRequest = serde_json::from_str("{}").unwrap();
        assert!(deliver.files.is_empty());
        let resolve: ResolveRequest =
            serde_json::from_str(r#"{ "resolution": "resolved_upheld" }"#).unwrap();
        assert_eq!(resolve.resolution, OrderStatus::ResolvedUpheld);
    }
}
