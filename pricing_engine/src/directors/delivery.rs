use pricing_common::CurrencyCode;

use crate::{
    adapters::PricingDomain,
    directors::PricingDirector,
    entity_types::{DeliveryProvider, Order, User},
    row_types::DeliveryCategory,
};

/// Marker for the delivery pricing domain.
pub struct DeliveryPricing;

impl PricingDomain for DeliveryPricing {
    type Category = DeliveryCategory;
    type Context = DeliveryPricingContext;

    const NAME: &'static str = "delivery";

    fn currency(context: &Self::Context) -> &CurrencyCode {
        &context.currency
    }
}

pub type DeliveryPricingDirector = PricingDirector<DeliveryPricing>;

//-------------------------------------- DeliveryPricingContext -------------------------------------------------------

/// The calculation context for pricing the delivery of one order. Delivery adapters typically activate on the
/// provider's `adapter_key`.
#[derive(Debug, Clone)]
pub struct DeliveryPricingContext {
    pub order: Order,
    pub provider: DeliveryProvider,
    pub user: Option<User>,
    pub currency: CurrencyCode,
}

impl DeliveryPricingContext {
    pub fn new(order: &Order, provider: DeliveryProvider, user: Option<User>) -> Self {
        Self { currency: order.currency.clone(), order: order.clone(), provider, user }
    }

    /// Build the context from the order's own delivery reference. `None` when the order has no delivery yet.
    pub fn for_order(order: &Order, user: Option<User>) -> Option<Self> {
        let provider = order.delivery.as_ref().map(|delivery| delivery.provider.clone())?;
        Some(Self::new(order, provider, user))
    }
}
