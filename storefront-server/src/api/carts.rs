//! Cart session endpoints
//!
//! Every mutation responds with the refreshed cart view so the UI always
//! renders re-derived totals.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::error::{AppError, ErrorCode};
use shared::models::cart::CartView;
use shared::util::now_millis;

use crate::cart::{Attachment, ExtrasUpdate};
use crate::db;
use crate::error::ServiceError;
use crate::money::discounted_price;
use crate::state::AppState;
use crate::storage::validate_attachment;

fn cart_not_found() -> ServiceError {
    AppError::new(ErrorCode::CartNotFound).into()
}

fn item_not_found(product_id: i64) -> ServiceError {
    AppError::new(ErrorCode::CartItemNotFound)
        .with_detail("product_id", product_id)
        .into()
}

#[derive(Debug, Deserialize)]
pub struct CreateCartRequest {
    pub business_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateCartResponse {
    pub cart_id: Uuid,
}

/// POST /api/carts — open a cart session for a business
pub async fn create_cart(
    State(state): State<AppState>,
    Json(data): Json<CreateCartRequest>,
) -> Result<Json<CreateCartResponse>, ServiceError> {
    if db::businesses::get(&state.pool, data.business_id)
        .await?
        .is_none()
    {
        return Err(AppError::new(ErrorCode::BusinessNotFound).into());
    }

    let cart_id = state.carts.create(data.business_id);
    Ok(Json(CreateCartResponse { cart_id }))
}

/// GET /api/carts/{cart_id}
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> Result<Json<CartView>, ServiceError> {
    state
        .carts
        .with_cart(cart_id, |cart| cart.view(cart_id))
        .map(Json)
        .ok_or_else(cart_not_found)
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
}

/// POST /api/carts/{cart_id}/items — add a product
///
/// A product already in the cart gains quantity; a new one enters at
/// quantity 1 with its price snapshot fixed to the promotion-adjusted price
/// right now.
pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(data): Json<AddItemRequest>,
) -> Result<Json<CartView>, ServiceError> {
    let business_id = state
        .carts
        .with_cart(cart_id, |cart| cart.business_id)
        .ok_or_else(cart_not_found)?;

    let product = db::products::get(&state.pool, data.product_id)
        .await?
        .filter(|p| p.business_id == business_id)
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if !product.is_active {
        return Err(AppError::new(ErrorCode::ProductInactive).into());
    }

    let promotion =
        db::products::active_promotion(&state.pool, product.id, now_millis()).await?;
    let unit_price = match &promotion {
        Some(promo) => discounted_price(product.price, promo.discount),
        None => product.price,
    };

    state
        .carts
        .with_cart(cart_id, |cart| {
            cart.add_item(&product, unit_price);
            cart.view(cart_id)
        })
        .map(Json)
        .ok_or_else(cart_not_found)
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i32,
}

/// PUT /api/carts/{cart_id}/items/{product_id} — set quantity.
/// Anything below 1 removes the item.
pub async fn update_quantity(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(Uuid, i64)>,
    Json(data): Json<QuantityRequest>,
) -> Result<Json<CartView>, ServiceError> {
    let (updated, view) = state
        .carts
        .with_cart(cart_id, |cart| {
            let updated = cart.update_quantity(product_id, data.quantity);
            (updated, cart.view(cart_id))
        })
        .ok_or_else(cart_not_found)?;

    if !updated {
        return Err(item_not_found(product_id));
    }
    Ok(Json(view))
}

/// DELETE /api/carts/{cart_id}/items/{product_id}
pub async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(Uuid, i64)>,
) -> Result<Json<CartView>, ServiceError> {
    let (removed, view) = state
        .carts
        .with_cart(cart_id, |cart| {
            let removed = cart.remove_item(product_id);
            (removed, cart.view(cart_id))
        })
        .ok_or_else(cart_not_found)?;

    if !removed {
        return Err(item_not_found(product_id));
    }
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct ExtrasRequest {
    pub description: Option<String>,
    pub special_instructions: Option<String>,
}

/// PATCH /api/carts/{cart_id}/items/{product_id}/extras — partial update,
/// only provided fields change
pub async fn update_extras(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(Uuid, i64)>,
    Json(data): Json<ExtrasRequest>,
) -> Result<Json<CartView>, ServiceError> {
    let update = ExtrasUpdate {
        description: data.description,
        special_instructions: data.special_instructions,
    };

    let (updated, view) = state
        .carts
        .with_cart(cart_id, |cart| {
            let updated = cart.update_extras(product_id, update);
            (updated, cart.view(cart_id))
        })
        .ok_or_else(cart_not_found)?;

    if !updated {
        return Err(item_not_found(product_id));
    }
    Ok(Json(view))
}

/// Extract the uploaded file from a multipart body
async fn read_attachment(mut multipart: Multipart) -> Result<Attachment, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    })? {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
            let data = field
                .bytes()
                .await
                .map_err(|e| {
                    AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
                })?
                .to_vec();

            let content_type = validate_attachment(&file_name, &data)?;
            return Ok(Attachment {
                file_name,
                content_type,
                data,
            });
        }
    }
    Err(AppError::new(ErrorCode::NoFileProvided))
}

/// PUT /api/carts/{cart_id}/items/{product_id}/attachment — attach an image
/// to one item; it is uploaded to object storage at checkout
pub async fn upload_item_attachment(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(Uuid, i64)>,
    multipart: Multipart,
) -> Result<Json<CartView>, ServiceError> {
    let attachment = read_attachment(multipart).await?;

    let (attached, view) = state
        .carts
        .with_cart(cart_id, |cart| {
            let attached = cart.set_item_attachment(product_id, attachment);
            (attached, cart.view(cart_id))
        })
        .ok_or_else(cart_not_found)?;

    if !attached {
        return Err(item_not_found(product_id));
    }
    Ok(Json(view))
}

/// PUT /api/carts/{cart_id}/attachment — checkout-level image
pub async fn upload_cart_attachment(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<CartView>, ServiceError> {
    let attachment = read_attachment(multipart).await?;

    state
        .carts
        .with_cart(cart_id, |cart| {
            cart.attachment = Some(attachment);
            cart.view(cart_id)
        })
        .map(Json)
        .ok_or_else(cart_not_found)
}
