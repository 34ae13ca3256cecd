use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::appointment::CustomerRepo,
    domain::entities::customer::Customer,
};

const CUSTOMER_COLS: &str = r#"
    id, shop_id, name, phone, loyalty_cuts, free_cuts_available,
    total_cuts_completed, total_spent_cents, visits, last_visit, version, created_at
"#;

fn row_to_customer(row: &sqlx::postgres::PgRow) -> Customer {
    Customer {
        id: row.get("id"),
        shop_id: row.get("shop_id"),
        name: row.get("name"),
        phone: row.get("phone"),
        loyalty_cuts: row.get("loyalty_cuts"),
        free_cuts_available: row.get("free_cuts_available"),
        total_cuts_completed: row.get("total_cuts_completed"),
        total_spent_cents: row.get("total_spent_cents"),
        visits: row.get("visits"),
        last_visit: row.get("last_visit"),
        version: row.get("version"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CustomerRepo for PostgresPersistence {
    async fn get_by_id(&self, shop_id: &str, customer_id: Uuid) -> AppResult<Option<Customer>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM customers WHERE id = $1 AND shop_id = $2",
            CUSTOMER_COLS
        ))
        .bind(customer_id)
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_customer))
    }
}
