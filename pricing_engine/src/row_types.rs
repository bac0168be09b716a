use std::fmt::{Debug, Display};

use pricing_common::Money;
use serde::{Deserialize, Serialize};
use serde_json::Value;

//--------------------------------------     RowCategory     ---------------------------------------------------------

/// The closed set of row categories for one pricing domain.
///
/// Every domain tags its rows from its own enum, but the generic sheet still needs to know which members carry
/// discounts and taxes in order to answer `discount_sum` and `tax_sum` queries.
pub trait RowCategory: Copy + Eq + Debug + Send + Sync + 'static {
    /// The category discount rows carry in this domain.
    fn discount() -> Self;
    /// The category tax rows carry in this domain.
    fn tax() -> Self;
}

//--------------------------------------    OrderCategory    ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCategory {
    /// The sum of all product line items on the order.
    Items,
    /// Order-level discounts.
    Discounts,
    /// Order-level taxes.
    Taxes,
    /// The delivery fees for the order.
    Delivery,
    /// The payment fees for the order.
    Payment,
}

impl RowCategory for OrderCategory {
    fn discount() -> Self {
        OrderCategory::Discounts
    }

    fn tax() -> Self {
        OrderCategory::Taxes
    }
}

impl Display for OrderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderCategory::Items => write!(f, "Items"),
            OrderCategory::Discounts => write!(f, "Discounts"),
            OrderCategory::Taxes => write!(f, "Taxes"),
            OrderCategory::Delivery => write!(f, "Delivery"),
            OrderCategory::Payment => write!(f, "Payment"),
        }
    }
}

//--------------------------------------   ProductCategory   ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCategory {
    Item,
    Discount,
    Tax,
}

impl RowCategory for ProductCategory {
    fn discount() -> Self {
        ProductCategory::Discount
    }

    fn tax() -> Self {
        ProductCategory::Tax
    }
}

impl Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductCategory::Item => write!(f, "Item"),
            ProductCategory::Discount => write!(f, "Discount"),
            ProductCategory::Tax => write!(f, "Tax"),
        }
    }
}

//--------------------------------------  DeliveryCategory   ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryCategory {
    Item,
    Discount,
    Tax,
}

impl RowCategory for DeliveryCategory {
    fn discount() -> Self {
        DeliveryCategory::Discount
    }

    fn tax() -> Self {
        DeliveryCategory::Tax
    }
}

impl Display for DeliveryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryCategory::Item => write!(f, "Item"),
            DeliveryCategory::Discount => write!(f, "Discount"),
            DeliveryCategory::Tax => write!(f, "Tax"),
        }
    }
}

//--------------------------------------   PaymentCategory   ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentCategory {
    Item,
    Discount,
    Tax,
}

impl RowCategory for PaymentCategory {
    fn discount() -> Self {
        PaymentCategory::Discount
    }

    fn tax() -> Self {
        PaymentCategory::Tax
    }
}

impl Display for PaymentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentCategory::Item => write!(f, "Item"),
            PaymentCategory::Discount => write!(f, "Discount"),
            PaymentCategory::Tax => write!(f, "Tax"),
        }
    }
}

//--------------------------------------   CalculationRow    ---------------------------------------------------------

/// One ledger entry in a pricing calculation.
///
/// Rows are append-only within a pass: corrections are expressed as new rows with negated amounts, never by mutating
/// or removing earlier rows. The amount is always in the minor unit of the owning sheet's currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRow<C> {
    pub category: C,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub is_taxable: bool,
    #[serde(default)]
    pub is_net_price: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<C> CalculationRow<C> {
    pub fn new(category: C, amount: Money) -> Self {
        Self {
            category,
            amount,
            discount_id: None,
            rate: None,
            is_taxable: false,
            is_net_price: false,
            meta: None,
        }
    }

    pub fn with_discount_id<S: Into<String>>(mut self, discount_id: S) -> Self {
        self.discount_id = Some(discount_id.into());
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn taxable(mut self) -> Self {
        self.is_taxable = true;
        self
    }

    pub fn net_price(mut self) -> Self {
        self.is_net_price = true;
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

//--------------------------------------      RowFilter      ---------------------------------------------------------

/// Row matching criteria for sheet queries.
///
/// An unset key is a wildcard: it matches *every* row, including rows where the corresponding field is unset. To
/// select rows for a specific discount, set both the discount category and the discount id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFilter<C> {
    pub category: Option<C>,
    pub discount_id: Option<String>,
}

impl<C> Default for RowFilter<C> {
    fn default() -> Self {
        Self { category: None, discount_id: None }
    }
}

impl<C: RowCategory> RowFilter<C> {
    /// A filter that matches every row.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn for_category(category: C) -> Self {
        Self { category: Some(category), discount_id: None }
    }

    /// All discount rows of the domain.
    pub fn for_discounts() -> Self {
        Self::for_category(C::discount())
    }

    pub fn with_discount_id<S: Into<String>>(mut self, discount_id: S) -> Self {
        self.discount_id = Some(discount_id.into());
        self
    }

    pub fn matches(&self, row: &CalculationRow<C>) -> bool {
        if let Some(category) = self.category {
            if row.category != category {
                return false;
            }
        }
        if let Some(discount_id) = &self.discount_id {
            if row.discount_id.as_deref() != Some(discount_id.as_str()) {
                return false;
            }
        }
        true
    }
}
