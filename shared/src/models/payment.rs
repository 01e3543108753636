//! Payment status types shared with the storefront UI

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Terminal status carried by the gateway's redirect callback
/// (`?status=COMPLETE|FAILED|PENDING`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallbackStatus {
    Complete,
    Failed,
    Pending,
}

impl FromStr for CallbackStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMPLETE" => Ok(Self::Complete),
            "FAILED" => Ok(Self::Failed),
            "PENDING" => Ok(Self::Pending),
            _ => Err(()),
        }
    }
}

/// Reconciliation state machine over a payment
///
/// `Success` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PaymentPhase {
    /// Status not yet checked
    Loading,
    /// Gateway still reports the transaction in flight
    Pending,
    /// Payment confirmed and the order marked completed
    Success,
    /// Terminal failure with the provider's reason
    Failed { reason: String },
}

impl PaymentPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_status_parse() {
        assert_eq!("COMPLETE".parse(), Ok(CallbackStatus::Complete));
        assert_eq!("FAILED".parse(), Ok(CallbackStatus::Failed));
        assert_eq!("PENDING".parse(), Ok(CallbackStatus::Pending));
        assert!("complete".parse::<CallbackStatus>().is_err());
        assert!("".parse::<CallbackStatus>().is_err());
    }

    #[test]
    fn test_phase_terminal() {
        assert!(!PaymentPhase::Loading.is_terminal());
        assert!(!PaymentPhase::Pending.is_terminal());
        assert!(PaymentPhase::Success.is_terminal());
        assert!(
            PaymentPhase::Failed {
                reason: "declined".into()
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_phase_serde_tagged() {
        let json = serde_json::to_string(&PaymentPhase::Failed {
            reason: "declined".into(),
        })
        .unwrap();
        assert!(json.contains("\"state\":\"failed\""));
        assert!(json.contains("\"reason\":\"declined\""));

        let json = serde_json::to_string(&PaymentPhase::Success).unwrap();
        assert_eq!(json, "{\"state\":\"success\"}");
    }
}
