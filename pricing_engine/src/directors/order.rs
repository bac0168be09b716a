use pricing_common::CurrencyCode;

use crate::{
    adapters::PricingDomain,
    directors::PricingDirector,
    discounts::Discount,
    entity_types::{Order, OrderDelivery, OrderItem, OrderPayment, User},
    row_types::OrderCategory,
};

/// Marker for the order pricing domain.
pub struct OrderPricing;

impl PricingDomain for OrderPricing {
    type Category = OrderCategory;
    type Context = OrderPricingContext;

    const NAME: &'static str = "order";

    fn currency(context: &Self::Context) -> &CurrencyCode {
        &context.currency
    }

    fn discounts(context: &Self::Context) -> &[Discount] {
        &context.discounts
    }
}

pub type OrderPricingDirector = PricingDirector<OrderPricing>;

//--------------------------------------  OrderPricingContext ---------------------------------------------------------

/// The calculation context for one order pricing pass. Built fresh per pass from the order's own references; never
/// mutated by adapters.
#[derive(Debug, Clone)]
pub struct OrderPricingContext {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub user: Option<User>,
    pub delivery: Option<OrderDelivery>,
    pub payment: Option<OrderPayment>,
    pub discounts: Vec<Discount>,
    pub currency: CurrencyCode,
}

impl OrderPricingContext {
    pub fn for_order(order: &Order, user: Option<User>) -> Self {
        Self {
            items: order.items.clone(),
            delivery: order.delivery.clone(),
            payment: order.payment.clone(),
            discounts: order.discounts.clone(),
            currency: order.currency.clone(),
            user,
            order: order.clone(),
        }
    }
}
