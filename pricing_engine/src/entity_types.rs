//! The entity shapes the pricing engine calculates against.
//!
//! Persistence for these entities lives with external collaborators (storefront, catalog, user store); the engine
//! only reads the references a pricing context is built from.

use chrono::{DateTime, Utc};
use pricing_common::CurrencyCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::discounts::Discount;

//--------------------------------------        User         ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub tags: Vec<String>,
}

impl User {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), tags: Vec::new() }
    }
}

//--------------------------------------      Product        ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: Option<String>,
    pub tags: Vec<String>,
    /// The subscription plan payload for plan products, if any. Adapters gate on its presence.
    pub plan: Option<Value>,
}

impl Product {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), sku: None, tags: Vec::new(), plan: None }
    }

    pub fn with_sku<S: Into<String>>(mut self, sku: S) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_plan(mut self, plan: Value) -> Self {
        self.plan = Some(plan);
        self
    }
}

//--------------------------------------     Providers       ---------------------------------------------------------

/// A configured delivery provider on the storefront. The `adapter_key` names the pricing adapter that knows how to
/// charge for this provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryProvider {
    pub id: String,
    pub adapter_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProvider {
    pub id: String,
    pub adapter_key: String,
}

//--------------------------------------    Order pieces     ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub product_id: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDelivery {
    pub id: String,
    pub provider: DeliveryProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayment {
    pub id: String,
    pub provider: PaymentProvider,
}

//--------------------------------------        Order        ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: Option<String>,
    pub currency: CurrencyCode,
    pub country_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub delivery: Option<OrderDelivery>,
    pub payment: Option<OrderPayment>,
    pub discounts: Vec<Discount>,
}

impl Order {
    pub fn new<S: Into<String>>(id: S, currency: CurrencyCode) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            currency,
            country_code: None,
            created_at: Utc::now(),
            items: Vec::new(),
            delivery: None,
            payment: None,
            discounts: Vec::new(),
        }
    }

    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_country_code<S: Into<String>>(mut self, country_code: S) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn with_item(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_delivery(mut self, delivery: OrderDelivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn with_payment(mut self, payment: OrderPayment) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discounts.push(discount);
        self
    }

    /// Total unit count across all line items.
    pub fn item_quantity(&self) -> u64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
