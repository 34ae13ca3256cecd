use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::shop::{NewShop, ShopProfileUpdate, ShopRepo},
    domain::entities::{
        shop::Shop,
        subscription::{Subscription, SubscriptionStatus, SubscriptionUpdate},
    },
};

const SELECT_COLS: &str = r#"
    id, name, owner_name, owner_email, owner_phone, owner_document, active,
    sub_status, due_date, paid_until, grace_days, external_customer_id,
    external_subscription_id, sub_updated_at, version, created_at, updated_at
"#;

fn row_to_shop(row: &sqlx::postgres::PgRow) -> Shop {
    // Shops created before billing have no subscription columns set
    let subscription = row
        .get::<Option<SubscriptionStatus>, _>("sub_status")
        .map(|status| Subscription {
            status,
            due_date: row.get("due_date"),
            paid_until: row.get("paid_until"),
            grace_days: row.get("grace_days"),
            external_customer_id: row.get("external_customer_id"),
            external_subscription_id: row.get("external_subscription_id"),
            updated_at: row.get("sub_updated_at"),
        });

    Shop {
        id: row.get("id"),
        name: row.get("name"),
        owner_name: row.get("owner_name"),
        owner_email: row.get("owner_email"),
        owner_phone: row.get("owner_phone"),
        owner_document: row.get("owner_document"),
        active: row.get("active"),
        subscription,
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PostgresPersistence {
    /// Distinguishes a stale version from a missing shop after a guarded
    /// UPDATE matched no row.
    async fn missed_update_error(&self, shop_id: &str) -> AppError {
        match sqlx::query("SELECT 1 FROM shops WHERE id = $1")
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(Some(_)) => AppError::Conflict,
            Ok(None) => AppError::NotFound,
            Err(e) => AppError::from(e),
        }
    }
}

#[async_trait]
impl ShopRepo for PostgresPersistence {
    async fn find_by_external_customer_id(
        &self,
        external_customer_id: &str,
    ) -> AppResult<Option<Shop>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM shops WHERE external_customer_id = $1",
            SELECT_COLS
        ))
        .bind(external_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_shop))
    }

    async fn get_by_id(&self, shop_id: &str) -> AppResult<Option<Shop>> {
        let row = sqlx::query(&format!("SELECT {} FROM shops WHERE id = $1", SELECT_COLS))
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_shop))
    }

    async fn create(&self, shop: &NewShop) -> AppResult<Shop> {
        let sub = &shop.subscription;
        let row = sqlx::query(&format!(
            r#"INSERT INTO shops (
                   id, name, owner_name, owner_email, owner_phone, owner_document,
                   sub_status, due_date, paid_until, grace_days,
                   external_customer_id, external_subscription_id, sub_updated_at
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                       NOW() AT TIME ZONE 'utc')
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(&shop.id)
        .bind(&shop.name)
        .bind(&shop.owner_name)
        .bind(&shop.owner_email)
        .bind(&shop.owner_phone)
        .bind(&shop.owner_document)
        .bind(sub.status)
        .bind(sub.due_date)
        .bind(sub.paid_until)
        .bind(sub.grace_days)
        .bind(&sub.external_customer_id)
        .bind(&sub.external_subscription_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_shop(&row))
    }

    async fn update_profile(
        &self,
        shop_id: &str,
        profile: &ShopProfileUpdate,
    ) -> AppResult<Shop> {
        let row = sqlx::query(&format!(
            r#"UPDATE shops SET
                   name = COALESCE($2, name),
                   owner_name = COALESCE($3, owner_name),
                   owner_email = COALESCE($4, owner_email),
                   owner_phone = COALESCE($5, owner_phone),
                   owner_document = CASE WHEN $6::TEXT IS NULL THEN owner_document
                                         ELSE NULLIF($6, '') END,
                   version = version + 1,
                   updated_at = NOW() AT TIME ZONE 'utc'
               WHERE id = $1
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(shop_id)
        .bind(&profile.name)
        .bind(&profile.owner_name)
        .bind(&profile.owner_email)
        .bind(&profile.owner_phone)
        .bind(&profile.owner_document)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::NotFound)?;
        Ok(row_to_shop(&row))
    }

    async fn update_subscription(
        &self,
        shop_id: &str,
        update: &SubscriptionUpdate,
        expected_version: i32,
        updated_at: NaiveDateTime,
    ) -> AppResult<Shop> {
        let row = sqlx::query(&format!(
            r#"UPDATE shops SET
                   sub_status = $2,
                   paid_until = COALESCE($3, paid_until),
                   due_date = COALESCE($4, due_date),
                   sub_updated_at = $5,
                   updated_at = $5,
                   version = version + 1
               WHERE id = $1 AND version = $6
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(shop_id)
        .bind(update.status)
        .bind(update.paid_until)
        .bind(update.due_date)
        .bind(updated_at)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        match row {
            Some(row) => Ok(row_to_shop(&row)),
            None => Err(self.missed_update_error(shop_id).await),
        }
    }

    async fn set_status_and_active(
        &self,
        shop_id: &str,
        status: SubscriptionStatus,
        active: bool,
        updated_at: NaiveDateTime,
    ) -> AppResult<Shop> {
        let row = sqlx::query(&format!(
            r#"UPDATE shops SET
                   sub_status = $2,
                   active = $3,
                   sub_updated_at = $4,
                   updated_at = $4,
                   version = version + 1
               WHERE id = $1
               RETURNING {}"#,
            SELECT_COLS
        ))
        .bind(shop_id)
        .bind(status)
        .bind(active)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::NotFound)?;
        Ok(row_to_shop(&row))
    }

    async fn delete(&self, shop_id: &str) -> AppResult<()> {
        // customers and appointments go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(shop_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
