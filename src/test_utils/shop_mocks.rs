//! In-memory mock implementation of the shop repository.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::shop::{NewShop, ShopProfileUpdate, ShopRepo},
    domain::entities::{
        shop::Shop,
        subscription::{DEFAULT_GRACE_DAYS, Subscription, SubscriptionStatus, SubscriptionUpdate},
    },
};

/// In-memory implementation of ShopRepo for testing.
///
/// Mirrors the optimistic-concurrency behavior of the Postgres adapter:
/// every write bumps `version`, and `update_subscription` refuses stale versions.
#[derive(Default)]
pub struct InMemoryShopRepo {
    pub shops: Mutex<HashMap<String, Shop>>,
    pending_conflicts: Mutex<u32>,
    unavailable: bool,
}

impl InMemoryShopRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial shops for testing.
    pub fn with_shops(shops: Vec<Shop>) -> Self {
        let map = shops.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self {
            shops: Mutex::new(map),
            ..Self::default()
        }
    }

    /// A repo whose every call fails like a lost database connection.
    pub fn failing() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// The next `count` subscription updates fail with `AppError::Conflict`.
    pub fn fail_next_updates_with_conflict(&self, count: u32) {
        *self.pending_conflicts.lock().unwrap() = count;
    }

    pub fn get(&self, shop_id: &str) -> Option<Shop> {
        self.shops.lock().unwrap().get(shop_id).cloned()
    }

    /// Get all shops (for test assertions).
    pub fn get_all(&self) -> Vec<Shop> {
        self.shops.lock().unwrap().values().cloned().collect()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::Database("connection refused".into()));
        }
        Ok(())
    }
}

fn subscription_mut(shop: &mut Shop) -> &mut Subscription {
    shop.subscription
        .get_or_insert_with(|| Subscription::pending(None, None, DEFAULT_GRACE_DAYS))
}

#[async_trait]
impl ShopRepo for InMemoryShopRepo {
    async fn find_by_external_customer_id(
        &self,
        external_customer_id: &str,
    ) -> AppResult<Option<Shop>> {
        self.check_available()?;
        Ok(self
            .shops
            .lock()
            .unwrap()
            .values()
            .find(|s| {
                s.subscription
                    .as_ref()
                    .and_then(|sub| sub.external_customer_id.as_deref())
                    == Some(external_customer_id)
            })
            .cloned())
    }

    async fn get_by_id(&self, shop_id: &str) -> AppResult<Option<Shop>> {
        self.check_available()?;
        Ok(self.get(shop_id))
    }

    async fn create(&self, new_shop: &NewShop) -> AppResult<Shop> {
        self.check_available()?;
        let mut shops = self.shops.lock().unwrap();

        if shops.contains_key(&new_shop.id) {
            return Err(AppError::InvalidInput("Shop already exists".into()));
        }

        let now = chrono::Utc::now().naive_utc();
        let shop = Shop {
            id: new_shop.id.clone(),
            name: new_shop.name.clone(),
            owner_name: new_shop.owner_name.clone(),
            owner_email: new_shop.owner_email.clone(),
            owner_phone: new_shop.owner_phone.clone(),
            owner_document: new_shop.owner_document.clone(),
            active: true,
            subscription: Some(Subscription {
                updated_at: Some(now),
                ..new_shop.subscription.clone()
            }),
            version: 0,
            created_at: Some(now),
            updated_at: Some(now),
        };

        shops.insert(shop.id.clone(), shop.clone());
        Ok(shop)
    }

    async fn update_profile(
        &self,
        shop_id: &str,
        profile: &ShopProfileUpdate,
    ) -> AppResult<Shop> {
        self.check_available()?;
        let mut shops = self.shops.lock().unwrap();
        let shop = shops.get_mut(shop_id).ok_or(AppError::NotFound)?;

        if let Some(name) = &profile.name {
            shop.name = name.clone();
        }
        if let Some(owner_name) = &profile.owner_name {
            shop.owner_name = owner_name.clone();
        }
        if let Some(owner_email) = &profile.owner_email {
            shop.owner_email = owner_email.clone();
        }
        if let Some(owner_phone) = &profile.owner_phone {
            shop.owner_phone = owner_phone.clone();
        }
        if let Some(document) = &profile.owner_document {
            shop.owner_document = Some(document.clone()).filter(|d| !d.is_empty());
        }
        shop.version += 1;
        shop.updated_at = Some(chrono::Utc::now().naive_utc());

        Ok(shop.clone())
    }

    async fn update_subscription(
        &self,
        shop_id: &str,
        update: &SubscriptionUpdate,
        expected_version: i32,
        updated_at: NaiveDateTime,
    ) -> AppResult<Shop> {
        self.check_available()?;
        {
            let mut pending = self.pending_conflicts.lock().unwrap();
            if *pending > 0 {
                *pending -= 1;
                return Err(AppError::Conflict);
            }
        }

        let mut shops = self.shops.lock().unwrap();
        let shop = shops.get_mut(shop_id).ok_or(AppError::NotFound)?;
        if shop.version != expected_version {
            return Err(AppError::Conflict);
        }

        subscription_mut(shop).apply(update, updated_at);
        shop.version += 1;
        shop.updated_at = Some(updated_at);

        Ok(shop.clone())
    }

    async fn set_status_and_active(
        &self,
        shop_id: &str,
        status: SubscriptionStatus,
        active: bool,
        updated_at: NaiveDateTime,
    ) -> AppResult<Shop> {
        self.check_available()?;
        let mut shops = self.shops.lock().unwrap();
        let shop = shops.get_mut(shop_id).ok_or(AppError::NotFound)?;

        let subscription = subscription_mut(shop);
        subscription.status = status;
        subscription.updated_at = Some(updated_at);
        shop.active = active;
        shop.version += 1;
        shop.updated_at = Some(updated_at);

        Ok(shop.clone())
    }

    async fn delete(&self, shop_id: &str) -> AppResult<()> {
        self.check_available()?;
        self.shops
            .lock()
            .unwrap()
            .remove(shop_id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}
