use pricing_common::Money;
use serde_json::Value;

use crate::{
    row_types::{CalculationRow, OrderCategory, RowFilter},
    sheets::PricingSheet,
};

pub type OrderPricingSheet = PricingSheet<OrderCategory>;

/// Typed row constructors and queries for order pricing sheets.
///
/// The order ledger aggregates four sub-calculations: the item totals contributed by product pricing, order-level
/// discounts and taxes, and the delivery and payment fee totals.
impl PricingSheet<OrderCategory> {
    pub fn add_items(&mut self, amount: Money) {
        self.push_row(CalculationRow::new(OrderCategory::Items, amount));
    }

    pub fn add_discount<S: Into<String>>(&mut self, amount: Money, discount_id: S, meta: Option<Value>) {
        let mut row = CalculationRow::new(OrderCategory::Discounts, amount).with_discount_id(discount_id);
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_tax(&mut self, amount: Money, rate: Option<f64>, meta: Option<Value>) {
        let mut row = CalculationRow::new(OrderCategory::Taxes, amount);
        row.rate = rate;
        row.meta = meta;
        self.push_row(row);
    }

    pub fn add_delivery(&mut self, amount: Money) {
        self.push_row(CalculationRow::new(OrderCategory::Delivery, amount));
    }

    pub fn add_payment(&mut self, amount: Money) {
        self.push_row(CalculationRow::new(OrderCategory::Payment, amount));
    }

    pub fn items_sum(&self) -> Money {
        self.sum(&RowFilter::for_category(OrderCategory::Items))
    }

    pub fn delivery_sum(&self) -> Money {
        self.sum(&RowFilter::for_category(OrderCategory::Delivery))
    }

    pub fn payment_sum(&self) -> Money {
        self.sum(&RowFilter::for_category(OrderCategory::Payment))
    }
}

#[cfg(test)]
mod test {
    use pricing_common::CurrencyCode;

    use super::*;

    #[test]
    fn category_sums_are_independent() {
        let mut sheet = OrderPricingSheet::new(CurrencyCode::new("CHF"));
        sheet.add_items(Money::from(240_000));
        sheet.add_delivery(Money::from(0));
        sheet.add_payment(Money::from(0));
        assert_eq!(sheet.items_sum(), Money::from(240_000));
        assert_eq!(sheet.delivery_sum(), Money::zero());
        assert_eq!(sheet.payment_sum(), Money::zero());
        assert_eq!(sheet.total(None).amount, Money::from(240_000));
        assert_eq!(sheet.tax_sum(), Money::zero());
        assert_eq!(sheet.net(), Money::from(240_000));
    }

    #[test]
    fn discounts_group_by_id() {
        let mut sheet = OrderPricingSheet::new(CurrencyCode::new("EUR"));
        sheet.add_items(Money::from(10_000));
        sheet.add_discount(Money::from(-500), "SUMMER", None);
        sheet.add_discount(Money::from(-300), "SUMMER", None);
        sheet.add_discount(Money::from(-100), "LOYALTY", None);
        assert_eq!(sheet.discount_sum("SUMMER"), Money::from(-800));
        let prices = sheet.discount_prices(None);
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].discount_id, "SUMMER");
        assert_eq!(prices[0].amount, Money::from(-800));
        assert_eq!(prices[1].discount_id, "LOYALTY");
    }
}
