use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::billing_provider::{
            BillingProvider, CustomerId, CustomerInfo, NewSubscription, SubscriptionId,
        },
        use_cases::subscription_lifecycle::{ObservationErrorPolicy, resolve_blocking_status},
        validators::{is_valid_email, is_valid_name, is_valid_phone, is_valid_shop_slug},
    },
    domain::entities::{
        shop::Shop,
        subscription::{BlockingStatus, Subscription, SubscriptionStatus, SubscriptionUpdate},
    },
};

/// Days between provisioning and the first provider charge.
pub const FIRST_CHARGE_AFTER_DAYS: u64 = 30;

// ============================================================================
// Repository Trait
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewShop {
    pub id: String,
    pub name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub owner_document: Option<String>,
    pub subscription: Subscription,
}

/// Profile fields to change. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopProfileUpdate {
    pub name: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub owner_document: Option<String>,
}

impl ShopProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ShopProfileUpdate::default()
    }
}

#[async_trait]
pub trait ShopRepo: Send + Sync {
    async fn find_by_external_customer_id(
        &self,
        external_customer_id: &str,
    ) -> AppResult<Option<Shop>>;

    async fn get_by_id(&self, shop_id: &str) -> AppResult<Option<Shop>>;

    /// Fails with `InvalidInput` when the id is taken.
    async fn create(&self, shop: &NewShop) -> AppResult<Shop>;

    async fn update_profile(&self, shop_id: &str, profile: &ShopProfileUpdate)
    -> AppResult<Shop>;

    /// Writes only when the stored version still equals `expected_version`,
    /// otherwise `AppError::Conflict`.
    async fn update_subscription(
        &self,
        shop_id: &str,
        update: &SubscriptionUpdate,
        expected_version: i32,
        updated_at: NaiveDateTime,
    ) -> AppResult<Shop>;

    async fn set_status_and_active(
        &self,
        shop_id: &str,
        status: SubscriptionStatus,
        active: bool,
        updated_at: NaiveDateTime,
    ) -> AppResult<Shop>;

    /// Removes the shop together with its customers and appointments.
    async fn delete(&self, shop_id: &str) -> AppResult<()>;
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionShopInput {
    pub shop_name: String,
    pub shop_slug: String,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    #[serde(default, alias = "ownerCpfCnpj")]
    pub owner_document: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditShopInput {
    pub shop_name: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    #[serde(default, alias = "ownerCpfCnpj")]
    pub owner_document: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ShopSettings {
    pub monthly_price_cents: i64,
    pub default_grace_days: i32,
    pub observation_policy: ObservationErrorPolicy,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct ShopUseCases {
    shop_repo: Arc<dyn ShopRepo>,
    billing: Arc<dyn BillingProvider>,
    settings: ShopSettings,
}

impl ShopUseCases {
    pub fn new(
        shop_repo: Arc<dyn ShopRepo>,
        billing: Arc<dyn BillingProvider>,
        settings: ShopSettings,
    ) -> Self {
        Self {
            shop_repo,
            billing,
            settings,
        }
    }

    /// Creates the provider customer and monthly subscription, then stores
    /// the shop with a pending subscription.
    #[instrument(skip(self, input), fields(shop_id = %input.shop_slug))]
    pub async fn provision_shop(
        &self,
        input: ProvisionShopInput,
        today: NaiveDate,
    ) -> AppResult<Shop> {
        let shop_id = input.shop_slug.trim().to_lowercase();
        if !is_valid_shop_slug(&shop_id) {
            return Err(AppError::InvalidInput(
                "Shop slug must be 3-50 lowercase letters, digits or hyphens".into(),
            ));
        }
        if !is_valid_name(&input.shop_name) || !is_valid_name(&input.owner_name) {
            return Err(AppError::InvalidInput(
                "Shop and owner names need at least 3 characters".into(),
            ));
        }
        if !is_valid_email(&input.owner_email) {
            return Err(AppError::InvalidInput("Invalid owner email".into()));
        }
        if !is_valid_phone(&input.owner_phone) {
            return Err(AppError::InvalidInput("Invalid owner phone".into()));
        }
        if self.shop_repo.get_by_id(&shop_id).await?.is_some() {
            return Err(AppError::InvalidInput("Shop already exists".into()));
        }

        let owner_document = input
            .owner_document
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let customer_id = self
            .billing
            .create_customer(&CustomerInfo {
                name: Some(input.owner_name.trim().to_string()),
                email: Some(input.owner_email.trim().to_string()),
                phone: Some(input.owner_phone.trim().to_string()),
                document: owner_document.clone(),
            })
            .await?;
        tracing::info!(customer_id = %customer_id, "Provider customer created");

        let next_due_date = today
            .checked_add_days(Days::new(FIRST_CHARGE_AFTER_DAYS))
            .ok_or_else(|| AppError::InvalidDate(format!("{today} is out of range")))?;

        let subscription_id = match self
            .billing
            .create_subscription(&NewSubscription {
                customer_id: customer_id.clone(),
                value_cents: self.settings.monthly_price_cents,
                description: format!("Assinatura Mensal - {}", input.shop_name.trim()),
                next_due_date,
            })
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.discard_provider_records(None, Some(&customer_id)).await;
                return Err(e);
            }
        };
        tracing::info!(subscription_id = %subscription_id, %next_due_date, "Provider subscription created");

        let new_shop = NewShop {
            id: shop_id,
            name: input.shop_name.trim().to_string(),
            owner_name: input.owner_name.trim().to_string(),
            owner_email: input.owner_email.trim().to_string(),
            owner_phone: input.owner_phone.trim().to_string(),
            owner_document,
            subscription: Subscription::pending(
                Some(customer_id.to_string()),
                Some(subscription_id.to_string()),
                self.settings.default_grace_days,
            ),
        };

        match self.shop_repo.create(&new_shop).await {
            Ok(shop) => {
                tracing::info!(shop_id = %shop.id, "Shop provisioned");
                Ok(shop)
            }
            Err(e) => {
                self.discard_provider_records(Some(&subscription_id), Some(&customer_id))
                    .await;
                Err(e)
            }
        }
    }

    /// Updates profile fields and mirrors owner fields to the provider customer.
    #[instrument(skip(self, input))]
    pub async fn edit_shop(&self, shop_id: &str, input: EditShopInput) -> AppResult<Shop> {
        let non_blank = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let profile = ShopProfileUpdate {
            name: non_blank(input.shop_name),
            owner_name: non_blank(input.owner_name),
            owner_email: non_blank(input.owner_email),
            owner_phone: non_blank(input.owner_phone),
            owner_document: input.owner_document.map(|d| d.trim().to_string()),
        };

        if let Some(email) = &profile.owner_email
            && !is_valid_email(email)
        {
            return Err(AppError::InvalidInput("Invalid owner email".into()));
        }
        if let Some(phone) = &profile.owner_phone
            && !is_valid_phone(phone)
        {
            return Err(AppError::InvalidInput("Invalid owner phone".into()));
        }
        if profile.is_empty() {
            return Err(AppError::InvalidInput("Nothing to update".into()));
        }

        let shop = self.shop_repo.update_profile(shop_id, &profile).await?;

        let provider_customer = shop
            .subscription
            .as_ref()
            .and_then(|s| s.external_customer_id.clone());

        if let Some(customer_id) = provider_customer {
            let info = CustomerInfo {
                name: profile.owner_name.clone(),
                email: profile.owner_email.clone(),
                phone: profile.owner_phone.clone(),
                document: profile.owner_document.clone().filter(|d| !d.is_empty()),
            };
            if info.name.is_some()
                || info.email.is_some()
                || info.phone.is_some()
                || info.document.is_some()
            {
                self.billing
                    .update_customer(&CustomerId::new(customer_id), &info)
                    .await?;
            }
        }

        Ok(shop)
    }

    /// Cancels the provider subscription (best effort) and blocks the shop.
    #[instrument(skip(self))]
    pub async fn suspend_shop(&self, shop_id: &str, now: NaiveDateTime) -> AppResult<Shop> {
        let shop = self.require_shop(shop_id).await?;
        ensure_transition(&shop, SubscriptionStatus::Suspended)?;

        if let Some(subscription_id) = external_subscription_id(&shop)
            && let Err(e) = self.billing.cancel_subscription(&subscription_id).await
        {
            tracing::warn!(error = %e, subscription_id = %subscription_id, "Could not cancel provider subscription");
        }

        let shop = self
            .shop_repo
            .set_status_and_active(shop_id, SubscriptionStatus::Suspended, false, now)
            .await?;
        tracing::info!(shop_id = %shop_id, "Shop suspended");
        Ok(shop)
    }

    #[instrument(skip(self))]
    pub async fn activate_shop(&self, shop_id: &str, now: NaiveDateTime) -> AppResult<Shop> {
        let shop = self.require_shop(shop_id).await?;
        ensure_transition(&shop, SubscriptionStatus::Active)?;

        let shop = self
            .shop_repo
            .set_status_and_active(shop_id, SubscriptionStatus::Active, true, now)
            .await?;
        tracing::info!(shop_id = %shop_id, "Shop activated");
        Ok(shop)
    }

    /// Deletes the shop and everything under it. Provider cleanup failures
    /// are logged and do not stop the deletion.
    #[instrument(skip(self))]
    pub async fn delete_shop(&self, shop_id: &str) -> AppResult<()> {
        let shop = self.require_shop(shop_id).await?;

        let customer_id = shop
            .subscription
            .as_ref()
            .and_then(|s| s.external_customer_id.clone())
            .map(CustomerId::new);
        self.discard_provider_records(external_subscription_id(&shop).as_ref(), customer_id.as_ref())
            .await;

        self.shop_repo.delete(shop_id).await?;
        tracing::info!(shop_id = %shop_id, "Shop deleted");
        Ok(())
    }

    /// Blocking status as seen by protected features. Lookup failures go
    /// through the configured [`ObservationErrorPolicy`].
    #[instrument(skip(self))]
    pub async fn subscription_status(&self, shop_id: &str, now: NaiveDateTime) -> BlockingStatus {
        let observation = self
            .shop_repo
            .get_by_id(shop_id)
            .await
            .map(|shop| shop.and_then(|s| s.subscription));

        resolve_blocking_status(observation, now, self.settings.observation_policy)
    }

    // ========================================================================
    // Private Helpers
    // ========================================================================

    async fn require_shop(&self, shop_id: &str) -> AppResult<Shop> {
        self.shop_repo
            .get_by_id(shop_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn discard_provider_records(
        &self,
        subscription_id: Option<&SubscriptionId>,
        customer_id: Option<&CustomerId>,
    ) {
        if let Some(subscription_id) = subscription_id
            && let Err(e) = self.billing.cancel_subscription(subscription_id).await
        {
            tracing::warn!(error = %e, subscription_id = %subscription_id, "Could not cancel provider subscription");
        }
        if let Some(customer_id) = customer_id
            && let Err(e) = self.billing.delete_customer(customer_id).await
        {
            tracing::warn!(error = %e, customer_id = %customer_id, "Could not delete provider customer");
        }
    }
}

fn external_subscription_id(shop: &Shop) -> Option<SubscriptionId> {
    shop.subscription
        .as_ref()
        .and_then(|s| s.external_subscription_id.clone())
        .map(SubscriptionId::new)
}

/// Shops without subscription data are treated as pending.
fn ensure_transition(shop: &Shop, target: SubscriptionStatus) -> AppResult<()> {
    let current = shop
        .subscription
        .as_ref()
        .map(|s| s.status)
        .unwrap_or_default();

    if !current.can_transition_to(target) {
        return Err(AppError::InvalidInput(format!(
            "Cannot change subscription from {current} to {target}"
        )));
    }
    Ok(())
}
