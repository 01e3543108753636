//! Payment gateway integration via REST API (no SDK dependency)
//!
//! Three endpoints are consumed:
//! - `POST /getToken` — short-lived bearer token for one transaction
//! - `POST /initiatePayment` — start a mobile-money payment; returns a
//!   redirect link and/or an inline status
//! - `POST /checkPayment` — poll transaction state by order token

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

/// Provider response code meaning "still pending"
pub const RESPONSE_PENDING: i64 = 101;
/// Provider response code meaning "succeeded"
pub const RESPONSE_SUCCESS: i64 = 100;

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    description: &'a str,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct InitiateRequest<'a> {
    #[serde(rename = "phoneNumber")]
    phone_number: &'a str,
    order_id: i64,
}

/// Inline status block some initiations return instead of a redirect link
#[derive(Debug, Clone, Deserialize)]
pub struct InlineStatus {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InitiateResponse {
    #[serde(rename = "paymentLink")]
    pub payment_link: Option<String>,
    #[serde(rename = "paymentStatus")]
    pub payment_status: Option<InlineStatus>,
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    ordertoken: &'a str,
}

/// Provider status block: `responsecode` drives the state machine,
/// `responsemessage` is surfaced as the failure reason
#[derive(Debug, Clone, Deserialize)]
pub struct StatusBlock {
    pub responsecode: Option<i64>,
    pub responsemessage: Option<String>,
}

/// Transaction details echoed back by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub amount: Option<f64>,
    #[serde(rename = "paymentMethod")]
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckPaymentResponse {
    #[serde(rename = "paymentStatus")]
    pub payment_status: Option<StatusBlock>,
    #[allow(dead_code)]
    pub payload: Option<PaymentPayload>,
}

/// Interpreted result of one status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Provider still processing; check again later
    Pending,
    /// Payment went through
    Succeeded,
    /// Terminal failure with the provider's reason
    Failed(String),
}

impl CheckPaymentResponse {
    /// Map the provider's response code onto the state machine:
    /// 101 → pending, 100 → succeeded, anything else → failed.
    pub fn outcome(&self) -> CheckOutcome {
        let status = self.payment_status.as_ref();
        match status.and_then(|s| s.responsecode) {
            Some(RESPONSE_PENDING) => CheckOutcome::Pending,
            Some(RESPONSE_SUCCESS) => CheckOutcome::Succeeded,
            _ => CheckOutcome::Failed(
                status
                    .and_then(|s| s.responsemessage.clone())
                    .unwrap_or_else(|| "Payment failed".to_string()),
            ),
        }
    }
}

/// Payment gateway client
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn gateway_err(context: &str, err: impl std::fmt::Display) -> AppError {
        tracing::error!(error = %err, "Payment gateway {context} failed");
        AppError::with_message(
            ErrorCode::PaymentGatewayError,
            format!("Payment gateway {context} failed"),
        )
    }

    /// Request a short-lived transaction token
    pub async fn get_token(&self, description: &str, amount: f64) -> Result<String, AppError> {
        let resp: TokenResponse = self
            .http
            .post(format!("{}/getToken", self.base_url))
            .json(&TokenRequest {
                description,
                amount,
            })
            .send()
            .await
            .map_err(|e| Self::gateway_err("token request", e))?
            .error_for_status()
            .map_err(|e| Self::gateway_err("token request", e))?
            .json()
            .await
            .map_err(|e| Self::gateway_err("token response", e))?;

        Ok(resp.token)
    }

    /// Initiate a mobile-money payment for an order
    pub async fn initiate_payment(
        &self,
        token: &str,
        phone_number: &str,
        order_id: i64,
    ) -> Result<InitiateResponse, AppError> {
        self.http
            .post(format!("{}/initiatePayment", self.base_url))
            .bearer_auth(token)
            .json(&InitiateRequest {
                phone_number,
                order_id,
            })
            .send()
            .await
            .map_err(|e| Self::gateway_err("initiation", e))?
            .error_for_status()
            .map_err(|e| Self::gateway_err("initiation", e))?
            .json()
            .await
            .map_err(|e| Self::gateway_err("initiation response", e))
    }

    /// Check the state of a transaction by its order token
    pub async fn check_payment(&self, order_token: &str) -> Result<CheckPaymentResponse, AppError> {
        self.http
            .post(format!("{}/checkPayment", self.base_url))
            .json(&CheckRequest {
                ordertoken: order_token,
            })
            .send()
            .await
            .map_err(|e| Self::gateway_err("status check", e))?
            .error_for_status()
            .map_err(|e| Self::gateway_err("status check", e))?
            .json()
            .await
            .map_err(|e| Self::gateway_err("status response", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_request_wire_field() {
        let json = serde_json::to_string(&CheckRequest { ordertoken: "tk-1" }).unwrap();
        assert_eq!(json, "{\"ordertoken\":\"tk-1\"}");
    }

    #[test]
    fn test_initiate_request_wire_fields() {
        let json = serde_json::to_string(&InitiateRequest {
            phone_number: "0977123456",
            order_id: 42,
        })
        .unwrap();
        assert!(json.contains("\"phoneNumber\":\"0977123456\""));
        assert!(json.contains("\"order_id\":42"));
    }

    #[test]
    fn test_outcome_pending() {
        let resp: CheckPaymentResponse = serde_json::from_str(
            r#"{"paymentStatus":{"responsecode":101,"responsemessage":"processing"}}"#,
        )
        .unwrap();
        assert_eq!(resp.outcome(), CheckOutcome::Pending);
    }

    #[test]
    fn test_outcome_success_with_payload() {
        let resp: CheckPaymentResponse = serde_json::from_str(
            r#"{
                "paymentStatus": {"responsecode": 100, "responsemessage": "OK"},
                "payload": {"amount": 250.0, "paymentMethod": "mobile-money"}
            }"#,
        )
        .unwrap();
        assert_eq!(resp.outcome(), CheckOutcome::Succeeded);
        let payload = resp.payload.unwrap();
        assert_eq!(payload.amount, Some(250.0));
        assert_eq!(payload.payment_method.as_deref(), Some("mobile-money"));
    }

    #[test]
    fn test_outcome_failed_surfaces_provider_message() {
        let resp: CheckPaymentResponse = serde_json::from_str(
            r#"{"paymentStatus":{"responsecode":305,"responsemessage":"Insufficient funds"}}"#,
        )
        .unwrap();
        assert_eq!(
            resp.outcome(),
            CheckOutcome::Failed("Insufficient funds".to_string())
        );
    }

    #[test]
    fn test_outcome_failed_without_status_block() {
        let resp: CheckPaymentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(
            resp.outcome(),
            CheckOutcome::Failed("Payment failed".to_string())
        );
    }

    #[test]
    fn test_initiate_response_link_flow() {
        let resp: InitiateResponse =
            serde_json::from_str(r#"{"paymentLink":"https://pay.example/abc"}"#).unwrap();
        assert_eq!(resp.payment_link.as_deref(), Some("https://pay.example/abc"));
        assert!(resp.payment_status.is_none());
    }

    #[test]
    fn test_initiate_response_inline_flow() {
        let resp: InitiateResponse =
            serde_json::from_str(r#"{"paymentStatus":{"status":"success"}}"#).unwrap();
        assert!(resp.payment_link.is_none());
        assert_eq!(
            resp.payment_status.unwrap().status.as_deref(),
            Some("success")
        );
    }
}
