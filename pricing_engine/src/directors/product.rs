use pricing_common::CurrencyCode;

use crate::{
    adapters::PricingDomain,
    directors::PricingDirector,
    discounts::Discount,
    entity_types::{Order, Product, User},
    row_types::ProductCategory,
};

/// Marker for the product pricing domain.
pub struct ProductPricing;

impl PricingDomain for ProductPricing {
    type Category = ProductCategory;
    type Context = ProductPricingContext;

    const NAME: &'static str = "product";

    fn currency(context: &Self::Context) -> &CurrencyCode {
        &context.currency
    }

    fn quantity(context: &Self::Context) -> Option<u64> {
        Some(context.quantity)
    }

    fn discounts(context: &Self::Context) -> &[Discount] {
        &context.discounts
    }
}

pub type ProductPricingDirector = PricingDirector<ProductPricing>;

//-------------------------------------- ProductPricingContext --------------------------------------------------------

/// The calculation context for pricing one product position: the product itself, the quantity being priced, and the
/// order/user it is being priced for, when there is one.
#[derive(Debug, Clone)]
pub struct ProductPricingContext {
    pub product: Product,
    pub order: Option<Order>,
    pub user: Option<User>,
    pub discounts: Vec<Discount>,
    pub currency: CurrencyCode,
    pub country_code: Option<String>,
    pub quantity: u64,
}

impl ProductPricingContext {
    pub fn for_product(product: &Product, currency: CurrencyCode, quantity: u64) -> Self {
        Self {
            product: product.clone(),
            order: None,
            user: None,
            discounts: Vec::new(),
            currency,
            country_code: None,
            quantity,
        }
    }

    /// Price the position within an order: the order contributes its user, country and discounts.
    pub fn for_order_position(product: &Product, order: &Order, user: Option<User>, quantity: u64) -> Self {
        Self {
            product: product.clone(),
            order: Some(order.clone()),
            user,
            discounts: order.discounts.clone(),
            currency: order.currency.clone(),
            country_code: order.country_code.clone(),
            quantity,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_discounts(mut self, discounts: Vec<Discount>) -> Self {
        self.discounts = discounts;
        self
    }

    pub fn with_country_code<S: Into<String>>(mut self, country_code: S) -> Self {
        self.country_code = Some(country_code.into());
        self
    }
}
