use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Product, PromoGroup, UserRef},
    engine_api::errors::ShopError,
    events::{EventProducers, PurchaseCompletedEvent, PurchasedItem},
    traits::{ProductPurchase, PromoPurchase, ShopManagement},
};

/// `ShopApi` sells limited inventory for points and announces each completed sale.
pub struct ShopApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ShopApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShopApi")
    }
}

impl<B> ShopApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ShopApi<B>
where B: ShopManagement
{
    pub async fn promo_groups(&self) -> Result<Vec<PromoGroup>, ShopError> {
        self.db.fetch_active_promo_groups().await
    }

    pub async fn product(&self, product_id: i64) -> Result<Product, ShopError> {
        self.db.fetch_product(product_id).await?.ok_or_else(|| ShopError::NotFound(format!("product #{product_id}")))
    }

    /// Buys one promo code from the group. Only family members can buy promo codes, and the family pays.
    pub async fn buy_promo_code(&self, group_id: i64, buyer: UserRef) -> Result<PromoPurchase, ShopError> {
        let purchase = self.db.acquire_promo_code(group_id, buyer).await.map_err(|e| {
            debug!("🛒️ Promo code purchase from group #{group_id} by {buyer} failed: {e}");
            e
        })?;
        trace!("🛒️ Promo purchase wrote {} ledger entries", purchase.entries.len());
        let event = PurchaseCompletedEvent {
            buyer_id: purchase.buyer_id,
            payer: purchase.payer,
            item: PurchasedItem::PromoCode { group: purchase.group.name.clone(), code: purchase.code.code.clone() },
            price: purchase.group.price,
        };
        self.producers.publish_purchase_completed(event).await;
        Ok(purchase)
    }

    /// Buys a catalog product. Family members pay through their family.
    pub async fn buy_product(&self, product_id: i64, buyer: UserRef) -> Result<ProductPurchase, ShopError> {
        let purchase = self.db.purchase_product(product_id, buyer).await.map_err(|e| {
            debug!("🛒️ Purchase of product #{product_id} by {buyer} failed: {e}");
            e
        })?;
        let event = PurchaseCompletedEvent {
            buyer_id: purchase.order.user_id,
            payer: purchase.payer,
            item: PurchasedItem::Product { title: purchase.product.title.clone(), order_id: purchase.order.id },
            price: purchase.product.price,
        };
        self.producers.publish_purchase_completed(event).await;
        Ok(purchase)
    }
}
