//! Customer lookup and creation
//!
//! The storefront gates checkout on a phone number: a known (phone, business)
//! pair goes straight to the catalog, an unknown one gets the customer-info
//! form pre-filled with what we already know.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use shared::error::{AppError, ErrorCode};
use shared::models::customer::{Customer, CustomerCreate};

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;

/// Phone numbers are local mobile format: 10 digits starting with 0
/// (e.g. `0977123456`).
pub fn validate_phone(phone: &str) -> Result<(), AppError> {
    let valid = phone.len() == 10
        && phone.starts_with('0')
        && phone.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(
            AppError::with_message(ErrorCode::InvalidPhoneNumber, "Phone number format is invalid")
                .with_detail("phone", phone),
        )
    }
}

fn validate_create(data: &CustomerCreate) -> Result<(), AppError> {
    if data.name.trim().is_empty() {
        return Err(AppError::required_field("name"));
    }
    validate_phone(&data.phone)
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub phone: String,
    pub business_id: i64,
}

/// Pre-fill for the customer-info form when no customer matched
#[derive(Debug, Serialize, PartialEq)]
pub struct CustomerPrefill {
    pub phone: String,
    pub business_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefill: Option<CustomerPrefill>,
}

/// GET /api/customers/lookup?phone=&business_id=
///
/// Absence signals the new-customer path, not an error.
pub async fn lookup_customer(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, ServiceError> {
    validate_phone(&query.phone)?;

    let customer =
        db::customers::find_by_phone_and_business(&state.pool, &query.phone, query.business_id)
            .await?;

    Ok(Json(match customer {
        Some(customer) => LookupResponse {
            found: true,
            customer: Some(customer),
            prefill: None,
        },
        None => LookupResponse {
            found: false,
            customer: None,
            prefill: Some(CustomerPrefill {
                phone: query.phone,
                business_id: query.business_id,
            }),
        },
    }))
}

/// POST /api/customers — create a customer on first checkout
pub async fn create_customer(
    State(state): State<AppState>,
    Json(data): Json<CustomerCreate>,
) -> Result<Json<Customer>, ServiceError> {
    validate_create(&data)?;

    if db::businesses::get(&state.pool, data.business_id)
        .await?
        .is_none()
    {
        return Err(AppError::new(ErrorCode::BusinessNotFound).into());
    }

    let customer = db::customers::create(&state.pool, &data)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                ServiceError::App(AppError::new(ErrorCode::CustomerExists))
            } else {
                ServiceError::from(e)
            }
        })?;

    tracing::info!(
        customer_id = customer.id,
        business_id = customer.business_id,
        "Customer created"
    );

    Ok(Json(customer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_accepts_local_mobile() {
        assert!(validate_phone("0977123456").is_ok());
        assert!(validate_phone("0761234567").is_ok());
    }

    #[test]
    fn test_validate_phone_rejects_bad_formats() {
        assert!(validate_phone("").is_err());
        assert!(validate_phone("977123456").is_err()); // missing leading 0
        assert!(validate_phone("09771234567").is_err()); // too long
        assert!(validate_phone("097712345").is_err()); // too short
        assert!(validate_phone("0977-12345").is_err()); // non-digit
        assert!(validate_phone("+977123456").is_err());
    }

    #[test]
    fn test_validate_create_requires_name() {
        let data = CustomerCreate {
            business_id: 1,
            name: "  ".into(),
            email: None,
            phone: "0977123456".into(),
            location: None,
            gender: None,
        };
        let err = validate_create(&data).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_lookup_miss_prefills_form() {
        // The new-customer branch carries the phone and business forward
        let prefill = CustomerPrefill {
            phone: "0977123456".into(),
            business_id: 1,
        };
        assert_eq!(
            prefill,
            CustomerPrefill {
                phone: "0977123456".into(),
                business_id: 1
            }
        );
        let json = serde_json::to_string(&prefill).unwrap();
        assert!(json.contains("\"phone\":\"0977123456\""));
        assert!(json.contains("\"business_id\":1"));
    }
}
