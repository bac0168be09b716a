use pricing_common::CurrencyCode;

use crate::{
    adapters::PricingDomain,
    directors::PricingDirector,
    entity_types::{Order, PaymentProvider, User},
    row_types::PaymentCategory,
};

/// Marker for the payment pricing domain.
pub struct PaymentPricing;

impl PricingDomain for PaymentPricing {
    type Category = PaymentCategory;
    type Context = PaymentPricingContext;

    const NAME: &'static str = "payment";

    fn currency(context: &Self::Context) -> &CurrencyCode {
        &context.currency
    }
}

pub type PaymentPricingDirector = PricingDirector<PaymentPricing>;

//-------------------------------------- PaymentPricingContext --------------------------------------------------------

/// The calculation context for pricing the payment of one order. Payment adapters typically activate on the
/// provider's `adapter_key`.
#[derive(Debug, Clone)]
pub struct PaymentPricingContext {
    pub order: Order,
    pub provider: PaymentProvider,
    pub user: Option<User>,
    pub currency: CurrencyCode,
}

impl PaymentPricingContext {
    pub fn new(order: &Order, provider: PaymentProvider, user: Option<User>) -> Self {
        Self { currency: order.currency.clone(), order: order.clone(), provider, user }
    }

    /// Build the context from the order's own payment reference. `None` when the order has no payment yet.
    pub fn for_order(order: &Order, user: Option<User>) -> Option<Self> {
        let provider = order.payment.as_ref().map(|payment| payment.provider.clone())?;
        Some(Self::new(order, provider, user))
    }
}
