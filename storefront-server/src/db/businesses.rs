//! Business database operations

use shared::models::business::Business;
use sqlx::PgPool;

use super::BoxError;

#[derive(Debug, sqlx::FromRow)]
struct BusinessRow {
    id: i64,
    business_name: String,
    company_alias: String,
    logo_name: Option<String>,
    has_wallet: bool,
    created_at: i64,
}

impl From<BusinessRow> for Business {
    fn from(r: BusinessRow) -> Self {
        Business {
            id: r.id,
            business_name: r.business_name,
            company_alias: r.company_alias,
            logo_name: r.logo_name,
            has_wallet: r.has_wallet,
            created_at: r.created_at,
        }
    }
}

const COLUMNS: &str = "id, business_name, company_alias, logo_name, has_wallet, created_at";

/// Resolve a storefront alias: exact alias match first, then a
/// case-insensitive match on the business name.
pub async fn find_by_alias(pool: &PgPool, alias: &str) -> Result<Option<Business>, BoxError> {
    let row: Option<BusinessRow> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS}
        FROM businesses
        WHERE company_alias = $1 OR LOWER(business_name) = LOWER($1)
        ORDER BY (company_alias = $1) DESC
        LIMIT 1
        "#
    ))
    .bind(alias)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Business>, BoxError> {
    let row: Option<BusinessRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM businesses WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Into::into))
}
