//! Storefront business lookup

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use shared::error::{AppError, ErrorCode};
use shared::models::business::Business;

use crate::db;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::storage::business_logo_key;

#[derive(Debug, Serialize)]
pub struct BusinessInfo {
    #[serde(flatten)]
    pub business: Business,
    /// Resolved logo URL; None when the business has no stored logo
    pub logo_url: Option<String>,
}

/// GET /api/business/{alias} — resolve a storefront alias.
///
/// Not-found is a normal outcome for a new or mistyped alias; the UI shows
/// its own branch for it.
pub async fn resolve_business(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<Json<BusinessInfo>, ServiceError> {
    let business = db::businesses::find_by_alias(&state.pool, &alias)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::BusinessNotFound,
                format!("No storefront for alias '{alias}'"),
            )
        })?;

    let logo_url = match &business.logo_name {
        Some(name) => state
            .storage
            .public_url(&business_logo_key(business.id, name))
            .await?,
        None => None,
    };

    Ok(Json(BusinessInfo { business, logo_url }))
}
