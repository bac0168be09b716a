//! Pricing directors: per-domain orchestration of one calculation pass.
//!
//! A director builds the calculation context for an entity, asks the registry for the applicable adapters, folds
//! them in order into a row ledger and wraps the result in a sheet. One `calculate` call is one pass; directors keep
//! no state between passes beyond the rows of the most recent one.

use std::sync::Arc;

use log::*;

use crate::{
    adapters::{AdapterRegistry, CalculationState, PricingDomain},
    discounts::{resolve_discounts, DiscountPolicy, NullDiscountPolicy},
    row_types::CalculationRow,
    sheets::PricingSheet,
};

mod delivery;
mod order;
mod payment;
mod product;

pub use delivery::{DeliveryPricing, DeliveryPricingContext, DeliveryPricingDirector};
pub use order::{OrderPricing, OrderPricingContext, OrderPricingDirector};
pub use payment::{PaymentPricing, PaymentPricingContext, PaymentPricingDirector};
pub use product::{ProductPricing, ProductPricingContext, ProductPricingDirector};

//--------------------------------------  PricingDirector    ---------------------------------------------------------

pub struct PricingDirector<D: PricingDomain> {
    registry: Arc<AdapterRegistry<D>>,
    discount_policy: Arc<dyn DiscountPolicy<D>>,
    context: D::Context,
    rows: Vec<CalculationRow<D::Category>>,
}

impl<D: PricingDomain> PricingDirector<D> {
    /// A director over the given registry and context, with no discount machinery wired up.
    pub fn new(registry: Arc<AdapterRegistry<D>>, context: D::Context) -> Self {
        Self { registry, discount_policy: Arc::new(NullDiscountPolicy), context, rows: Vec::new() }
    }

    /// Wire up the policy that resolves the context's discounts per adapter. Only meaningful for the order and
    /// product domains; the other domains carry no discounts to resolve.
    pub fn with_discount_policy(mut self, policy: Arc<dyn DiscountPolicy<D>>) -> Self {
        self.discount_policy = policy;
        self
    }

    pub fn context(&self) -> &D::Context {
        &self.context
    }

    /// The rows of the most recent pass.
    pub fn calculation(&self) -> &[CalculationRow<D::Category>] {
        &self.rows
    }

    /// Run one pricing pass.
    ///
    /// Selection reads a registry snapshot sorted by `order_index` (ascending, ties in registration order) and keeps
    /// the adapters whose activation predicate accepts the context. The fold is strictly sequential: each adapter
    /// sees the rows accumulated by every adapter before it, so this loop must never be parallelised, even for
    /// I/O-bound adapters.
    ///
    /// Discount applicability is re-resolved on *every* iteration, since a discount can hinge on rows an earlier
    /// adapter contributed.
    ///
    /// A failing adapter is logged and skipped; the pass continues and the adapter contributes nothing. Callers that
    /// need to know whether pricing is complete must inspect the resulting sheet — the director does not signal
    /// partial failure. Every pass starts from an empty ledger, so recomputing an entity is simply calling
    /// `calculate` again.
    pub async fn calculate(&mut self) -> &[CalculationRow<D::Category>] {
        let adapters = self
            .registry
            .sorted_adapters()
            .into_iter()
            .filter(|adapter| adapter.is_activated_for(&self.context))
            .collect::<Vec<_>>();
        debug!("🧮️ {} of {} registered {} pricing adapters activated", adapters.len(), self.registry.len(), D::NAME);
        let mut rows: Vec<CalculationRow<D::Category>> = Vec::new();
        for adapter in adapters {
            let discounts =
                resolve_discounts(self.discount_policy.as_ref(), D::discounts(&self.context), adapter.key(), &rows);
            trace!(
                "🧮️ Running {} adapter '{}' against {} rows with {} applicable discounts",
                D::NAME,
                adapter.key(),
                rows.len(),
                discounts.len()
            );
            let state = CalculationState { context: &self.context, calculation: &rows, discounts: &discounts };
            match adapter.calculate(state).await {
                Ok(mut contributed) => {
                    trace!("🧮️ Adapter '{}' contributed {} rows", adapter.key(), contributed.len());
                    rows.append(&mut contributed);
                },
                Err(e) => {
                    error!(
                        "🧮️ {} pricing adapter '{}' failed and contributes nothing to this pass: {e}",
                        D::NAME,
                        adapter.key()
                    );
                },
            }
        }
        self.rows = rows;
        &self.rows
    }

    /// Wrap the rows of the most recent pass in a sheet denominated in the context currency.
    pub fn result_sheet(&self) -> PricingSheet<D::Category> {
        let mut sheet = PricingSheet::from_rows(D::currency(&self.context).clone(), self.rows.clone());
        if let Some(quantity) = D::quantity(&self.context) {
            sheet = sheet.with_quantity(quantity);
        }
        sheet
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pricing_common::{CurrencyCode, Money};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        adapters::{AdapterError, PricingAdapter},
        discounts::Discount,
        entity_types::{Order, OrderItem},
        row_types::OrderCategory,
    };

    struct RowsAdapter {
        key: &'static str,
        order_index: i32,
        amount: Money,
        seen: Arc<Mutex<Vec<(String, usize, usize)>>>,
    }

    #[async_trait]
    impl PricingAdapter<OrderPricing> for RowsAdapter {
        fn key(&self) -> &str {
            self.key
        }

        fn order_index(&self) -> i32 {
            self.order_index
        }

        fn is_activated_for(&self, _context: &OrderPricingContext) -> bool {
            true
        }

        async fn calculate(
            &self,
            state: CalculationState<'_, OrderPricing>,
        ) -> Result<Vec<CalculationRow<OrderCategory>>, AdapterError> {
            self.seen.lock().unwrap().push((self.key.to_string(), state.calculation.len(), state.discounts.len()));
            Ok(vec![CalculationRow::new(OrderCategory::Items, self.amount)])
        }
    }

    struct FailingAdapter {
        order_index: i32,
    }

    #[async_trait]
    impl PricingAdapter<OrderPricing> for FailingAdapter {
        fn key(&self) -> &str {
            "test.broken"
        }

        fn order_index(&self) -> i32 {
            self.order_index
        }

        fn is_activated_for(&self, _context: &OrderPricingContext) -> bool {
            true
        }

        async fn calculate(
            &self,
            _state: CalculationState<'_, OrderPricing>,
        ) -> Result<Vec<CalculationRow<OrderCategory>>, AdapterError> {
            Err(AdapterError::CalculationFailed("the upstream fee service is down".to_string()))
        }
    }

    struct DiscountAdapter {
        seen: Arc<Mutex<Vec<(String, usize, usize)>>>,
    }

    #[async_trait]
    impl PricingAdapter<OrderPricing> for DiscountAdapter {
        fn key(&self) -> &str {
            "test.discounts"
        }

        fn order_index(&self) -> i32 {
            50
        }

        fn is_activated_for(&self, _context: &OrderPricingContext) -> bool {
            true
        }

        async fn calculate(
            &self,
            state: CalculationState<'_, OrderPricing>,
        ) -> Result<Vec<CalculationRow<OrderCategory>>, AdapterError> {
            self.seen.lock().unwrap().push((self.key().to_string(), state.calculation.len(), state.discounts.len()));
            let items_sum = state
                .calculation
                .iter()
                .filter(|row| row.category == OrderCategory::Items)
                .map(|row| row.amount)
                .sum::<Money>();
            let rows = state
                .discounts
                .iter()
                .map(|discount| {
                    CalculationRow::new(OrderCategory::Discounts, Money::from(-items_sum.value() / 10))
                        .with_discount_id(discount.discount_id.clone())
                })
                .collect();
            Ok(rows)
        }
    }

    /// Applies discounts at the discount adapter only, and only once item rows exist.
    struct ItemsPresentPolicy;

    impl DiscountPolicy<OrderPricing> for ItemsPresentPolicy {
        fn configuration_for_adapter(
            &self,
            _discount: &Discount,
            adapter_key: &str,
            calculation: &[CalculationRow<OrderCategory>],
        ) -> Option<Value> {
            (adapter_key == "test.discounts" && calculation.iter().any(|row| row.category == OrderCategory::Items))
                .then(|| json!({ "rate": 0.1 }))
        }
    }

    fn test_order() -> Order {
        Order::new("order-1", CurrencyCode::new("CHF"))
            .with_item(OrderItem { id: "item-1".to_string(), product_id: "product-1".to_string(), quantity: 2 })
            .with_discount(Discount::new("SUMMER"))
    }

    #[tokio::test]
    async fn failing_adapters_are_skipped_and_the_pass_continues() {
        let _ = env_logger::try_init();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(RowsAdapter {
                key: "test.first",
                order_index: 0,
                amount: Money::from(100),
                seen: seen.clone(),
            }))
            .register(Arc::new(FailingAdapter { order_index: 10 }))
            .register(Arc::new(RowsAdapter {
                key: "test.third",
                order_index: 20,
                amount: Money::from(50),
                seen: seen.clone(),
            }));
        let context = OrderPricingContext::for_order(&test_order(), None);
        let mut director = OrderPricingDirector::new(Arc::new(registry), context);
        let rows = director.calculate().await;
        assert_eq!(rows.len(), 2);
        let sheet = director.result_sheet();
        assert_eq!(sheet.gross(), Money::from(150));
        // The third adapter ran after the failure and saw only the first adapter's row.
        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("test.first".to_string(), 0, 0), ("test.third".to_string(), 1, 0)]);
    }

    #[tokio::test]
    async fn adapters_run_in_order_index_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = AdapterRegistry::new();
        // Registered out of execution order on purpose.
        registry
            .register(Arc::new(RowsAdapter {
                key: "test.late",
                order_index: 90,
                amount: Money::from(1),
                seen: seen.clone(),
            }))
            .register(Arc::new(RowsAdapter {
                key: "test.early",
                order_index: 5,
                amount: Money::from(2),
                seen: seen.clone(),
            }));
        let context = OrderPricingContext::for_order(&test_order(), None);
        let mut director = OrderPricingDirector::new(Arc::new(registry), context);
        director.calculate().await;
        let keys = seen.lock().unwrap().iter().map(|(key, ..)| key.clone()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["test.early".to_string(), "test.late".to_string()]);
    }

    #[tokio::test]
    async fn discounts_resolve_per_iteration_against_the_running_rows() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = AdapterRegistry::new();
        registry
            .register(Arc::new(RowsAdapter {
                key: "test.items",
                order_index: 0,
                amount: Money::from(10_000),
                seen: seen.clone(),
            }))
            .register(Arc::new(DiscountAdapter { seen: seen.clone() }));
        let context = OrderPricingContext::for_order(&test_order(), None);
        let mut director =
            OrderPricingDirector::new(Arc::new(registry), context).with_discount_policy(Arc::new(ItemsPresentPolicy));
        director.calculate().await;
        let sheet = director.result_sheet();
        assert_eq!(sheet.gross(), Money::from(9_000));
        assert_eq!(sheet.discount_sum("SUMMER"), Money::from(-1_000));
        // The items adapter ran with an empty discount slice (no item rows yet when it resolved); the discount
        // adapter saw the re-resolved discount.
        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("test.items".to_string(), 0, 0), ("test.discounts".to_string(), 1, 1)]);
    }

    #[tokio::test]
    async fn recalculating_starts_from_an_empty_ledger() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(RowsAdapter {
            key: "test.items",
            order_index: 0,
            amount: Money::from(700),
            seen: seen.clone(),
        }));
        let context = OrderPricingContext::for_order(&test_order(), None);
        let mut director = OrderPricingDirector::new(Arc::new(registry), context);
        director.calculate().await;
        director.calculate().await;
        assert_eq!(director.calculation().len(), 1);
        assert_eq!(director.result_sheet().gross(), Money::from(700));
    }
}
