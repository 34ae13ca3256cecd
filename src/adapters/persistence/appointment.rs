use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::appointment::AppointmentRepo,
    domain::entities::{appointment::Appointment, customer::Customer},
};

const SELECT_COLS: &str = r#"
    id, shop_id, customer_id, barber_id, service_id, date, time, status,
    price_cents, redeemed, created_at, updated_at
"#;

fn row_to_appointment(row: &sqlx::postgres::PgRow) -> Appointment {
    Appointment {
        id: row.get("id"),
        shop_id: row.get("shop_id"),
        customer_id: row.get("customer_id"),
        barber_id: row.get("barber_id"),
        service_id: row.get("service_id"),
        date: row.get("date"),
        time: row.get("time"),
        status: row.get("status"),
        price_cents: row.get("price_cents"),
        redeemed: row.get("redeemed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl AppointmentRepo for PostgresPersistence {
    async fn get_by_id(
        &self,
        shop_id: &str,
        appointment_id: Uuid,
    ) -> AppResult<Option<Appointment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM appointments WHERE id = $1 AND shop_id = $2",
            SELECT_COLS
        ))
        .bind(appointment_id)
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_appointment))
    }

    async fn list_by_shop_and_range(
        &self,
        shop_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<Appointment>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM appointments
               WHERE shop_id = $1 AND date BETWEEN $2 AND $3
               ORDER BY date, time"#,
            SELECT_COLS
        ))
        .bind(shop_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_appointment).collect())
    }

    async fn save_completion(
        &self,
        appointment: &Appointment,
        customer: &Customer,
        expected_customer_version: i32,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let customer_updated = sqlx::query(
            r#"UPDATE customers SET
                   loyalty_cuts = $3,
                   free_cuts_available = $4,
                   total_cuts_completed = $5,
                   total_spent_cents = $6,
                   visits = $7,
                   last_visit = $8,
                   version = version + 1
               WHERE id = $1 AND shop_id = $2 AND version = $9"#,
        )
        .bind(customer.id)
        .bind(&customer.shop_id)
        .bind(customer.loyalty_cuts)
        .bind(customer.free_cuts_available)
        .bind(customer.total_cuts_completed)
        .bind(customer.total_spent_cents)
        .bind(customer.visits)
        .bind(customer.last_visit)
        .bind(expected_customer_version)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        if customer_updated.rows_affected() == 0 {
            return Err(AppError::Conflict);
        }

        let appointment_updated = sqlx::query(
            r#"UPDATE appointments SET
                   status = $3,
                   redeemed = $4,
                   updated_at = NOW() AT TIME ZONE 'utc'
               WHERE id = $1 AND shop_id = $2
                 AND status NOT IN ('completed', 'cancelled')"#,
        )
        .bind(appointment.id)
        .bind(&appointment.shop_id)
        .bind(appointment.status)
        .bind(appointment.redeemed)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        // Finished by a concurrent request; dropping `tx` rolls back
        if appointment_updated.rows_affected() == 0 {
            return Err(AppError::Conflict);
        }

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }
}
