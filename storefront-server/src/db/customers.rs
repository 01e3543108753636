//! Customer database operations

use shared::models::customer::{Customer, CustomerCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::PgPool;

use super::BoxError;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    business_id: i64,
    name: String,
    email: Option<String>,
    phone: String,
    location: Option<String>,
    gender: Option<String>,
    created_at: i64,
}

impl From<CustomerRow> for Customer {
    fn from(r: CustomerRow) -> Self {
        Customer {
            id: r.id,
            business_id: r.business_id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            location: r.location,
            gender: r.gender,
            created_at: r.created_at,
        }
    }
}

const COLUMNS: &str = "id, business_id, name, email, phone, location, gender, created_at";

/// Look up a customer by (phone, business). At most one row matches; absence
/// drives the new-customer flow, not an error.
pub async fn find_by_phone_and_business(
    pool: &PgPool,
    phone: &str,
    business_id: i64,
) -> Result<Option<Customer>, BoxError> {
    let row: Option<CustomerRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM customers WHERE phone = $1 AND business_id = $2"
    ))
    .bind(phone)
    .bind(business_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Customer>, BoxError> {
    let row: Option<CustomerRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM customers WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Into::into))
}

/// Insert a new customer. A unique violation on (phone, business_id) is left
/// as a `sqlx::Error` for the caller to surface as a conflict.
pub async fn create(pool: &PgPool, data: &CustomerCreate) -> Result<Customer, sqlx::Error> {
    let id = snowflake_id();
    let now = now_millis();

    sqlx::query(
        r#"
        INSERT INTO customers (id, business_id, name, email, phone, location, gender, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(data.business_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.location)
    .bind(&data.gender)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Customer {
        id,
        business_id: data.business_id,
        name: data.name.clone(),
        email: data.email.clone(),
        phone: data.phone.clone(),
        location: data.location.clone(),
        gender: data.gender.clone(),
        created_at: now,
    })
}
