//! Discount data and per-adapter configuration resolution.
//!
//! A [`Discount`] is plain data: which discount hangs on the entity being priced, and the payload it was created
//! with. Whether it applies to a *particular adapter at a particular point in the calculation* is answered by a
//! [`DiscountPolicy`], which the director re-consults on every adapter iteration — applicability can depend on rows
//! accumulated by earlier adapters (e.g. a threshold discount that only kicks in once item rows exist).
//!
//! Resolution is a total function by construction: it returns an `Option`, never an error, so a misbehaving policy
//! cannot abort a pricing pass. Policies needing fallible work (say, a remote campaign lookup) must perform it before
//! the pass and stash the outcome in the discount's `meta`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{adapters::PricingDomain, row_types::CalculationRow};

//--------------------------------------      Discount       ---------------------------------------------------------

/// A discount attached to the entity being priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub discount_id: String,
    /// The voucher code or trigger that placed this discount on the entity, if any.
    pub code: Option<String>,
    /// Free-form payload that policies resolve adapter configurations from.
    pub meta: Option<Value>,
}

impl Discount {
    pub fn new<S: Into<String>>(discount_id: S) -> Self {
        Self { discount_id: discount_id.into(), code: None, meta: None }
    }

    pub fn with_code<S: Into<String>>(mut self, code: S) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

//--------------------------------------     DiscountRef     ---------------------------------------------------------

/// The resolved applicability of one discount for one adapter in one iteration of the calculation fold.
///
/// Adapters only ever see discounts that resolved to a configuration; a discount that does not apply is simply
/// absent from the slice handed to the adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRef {
    pub discount_id: String,
    pub configuration: Value,
}

//--------------------------------------   DiscountPolicy    ---------------------------------------------------------

/// Decides, per adapter and per chain position, what configuration a discount contributes.
pub trait DiscountPolicy<D: PricingDomain>: Send + Sync {
    /// The configuration `discount` contributes when the adapter identified by `adapter_key` runs against the rows
    /// accumulated so far, or `None` if the discount does not apply there.
    fn configuration_for_adapter(
        &self,
        discount: &Discount,
        adapter_key: &str,
        calculation: &[CalculationRow<D::Category>],
    ) -> Option<Value>;
}

/// A policy that never applies any discount. Used by the delivery and payment directors, and by order or product
/// passes with no discount machinery wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiscountPolicy;

impl<D: PricingDomain> DiscountPolicy<D> for NullDiscountPolicy {
    fn configuration_for_adapter(
        &self,
        _discount: &Discount,
        _adapter_key: &str,
        _calculation: &[CalculationRow<D::Category>],
    ) -> Option<Value> {
        None
    }
}

/// Resolve the subset of `discounts` applicable to one adapter, in context order.
///
/// This is the unit the director calls once per adapter iteration. It is exposed so policies can be tested without
/// standing up a director.
pub fn resolve_discounts<D: PricingDomain>(
    policy: &dyn DiscountPolicy<D>,
    discounts: &[Discount],
    adapter_key: &str,
    calculation: &[CalculationRow<D::Category>],
) -> Vec<DiscountRef> {
    discounts
        .iter()
        .filter_map(|discount| {
            policy
                .configuration_for_adapter(discount, adapter_key, calculation)
                .map(|configuration| DiscountRef { discount_id: discount.discount_id.clone(), configuration })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pricing_common::Money;
    use serde_json::json;

    use super::*;
    use crate::{directors::OrderPricing, row_types::OrderCategory};

    /// Applies only the discount whose id matches the adapter's configured target, and only once rows exist.
    struct TargetedPolicy;

    impl DiscountPolicy<OrderPricing> for TargetedPolicy {
        fn configuration_for_adapter(
            &self,
            discount: &Discount,
            adapter_key: &str,
            calculation: &[CalculationRow<OrderCategory>],
        ) -> Option<Value> {
            (discount.discount_id == "SUMMER" && adapter_key == "shop.pricing.order-discounts" &&
                !calculation.is_empty())
            .then(|| json!({ "rate": 0.1 }))
        }
    }

    #[test]
    fn only_applicable_discounts_resolve() {
        let discounts = vec![Discount::new("SUMMER"), Discount::new("WINTER")];
        let rows = vec![CalculationRow::new(OrderCategory::Items, Money::from(1_000))];
        let resolved = resolve_discounts(&TargetedPolicy, &discounts, "shop.pricing.order-discounts", &rows);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].discount_id, "SUMMER");
        assert_eq!(resolved[0].configuration, json!({ "rate": 0.1 }));
    }

    #[test]
    fn unresolved_discounts_leave_the_slice_empty() {
        let discounts = vec![Discount::new("SUMMER")];
        // Wrong adapter, and no rows accumulated yet: both gates fail.
        assert!(resolve_discounts(&TargetedPolicy, &discounts, "shop.pricing.order-items", &[]).is_empty());
        assert!(resolve_discounts(&TargetedPolicy, &discounts, "shop.pricing.order-discounts", &[]).is_empty());
    }

    #[test]
    fn null_policy_never_applies() {
        let discounts = vec![Discount::new("SUMMER")];
        let rows = vec![CalculationRow::new(OrderCategory::Items, Money::from(1_000))];
        let resolved =
            resolve_discounts::<OrderPricing>(&NullDiscountPolicy, &discounts, "shop.pricing.order-discounts", &rows);
        assert!(resolved.is_empty());
    }
}
