use crate::{
    db_types::{Product, PromoGroup, UserRef},
    engine_api::errors::ShopError,
    traits::{ProductPurchase, PromoPurchase},
};

/// Limited-inventory acquisition.
///
/// Both acquisition methods follow the same protocol inside one transaction: lock the pool, claim exactly one available
/// unit, resolve who pays, check affordability, debit, and consume the unit. A buyer that loses the race for the last
/// unit sees [`ShopError::OutOfStock`] and is never charged.
#[allow(async_fn_in_trait)]
pub trait ShopManagement {
    /// Active promo groups, highest discount first.
    async fn fetch_active_promo_groups(&self) -> Result<Vec<PromoGroup>, ShopError>;

    async fn fetch_promo_group(&self, group_id: i64) -> Result<Option<PromoGroup>, ShopError>;

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, ShopError>;

    /// Issues one use of a promo code from the group. Promo codes can only be paid for by a family.
    async fn acquire_promo_code(&self, group_id: i64, buyer: UserRef) -> Result<PromoPurchase, ShopError>;

    /// Buys a single-use catalog product. Family members pay through their family, everyone else pays personally.
    async fn purchase_product(&self, product_id: i64, buyer: UserRef) -> Result<ProductPurchase, ShopError>;
}
