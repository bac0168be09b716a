//! The pricing adapter contract and the per-domain adapter registry.
//!
//! An adapter is a single-responsibility calculator: a payment-fee surcharge, a tax rule, a discount engine. This
//! crate defines the contract and the plumbing that runs adapters in order; concrete adapters are supplied by plugin
//! crates and registered at application wiring time. A registry is an explicit value handed to each director — there
//! is no ambient global table.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use log::*;
use pricing_common::CurrencyCode;
use thiserror::Error;

use crate::{
    discounts::{Discount, DiscountRef},
    row_types::{CalculationRow, RowCategory},
};

//--------------------------------------    PricingDomain    ---------------------------------------------------------

/// Ties together the types making up one pricing domain: the row category enum and the calculation context, plus the
/// handful of context accessors the generic director needs.
pub trait PricingDomain: Sized + Send + Sync + 'static {
    type Category: RowCategory;
    type Context: Send + Sync;

    /// Domain tag used in log lines.
    const NAME: &'static str;

    fn currency(context: &Self::Context) -> &CurrencyCode;

    /// The unit count the result sheet carries. Only the product domain has one.
    fn quantity(_context: &Self::Context) -> Option<u64> {
        None
    }

    /// The discounts attached to the priced entity. Only the order and product domains resolve discounts.
    fn discounts(_context: &Self::Context) -> &[Discount] {
        &[]
    }
}

//--------------------------------------  CalculationState   ---------------------------------------------------------

/// Everything an adapter may read during one `calculate` call: the immutable context, the rows accumulated by every
/// earlier adapter in this pass, and the discounts that resolved for this adapter. Plain borrowed data — the engine
/// hands the adapter no handle it could mutate shared state through.
pub struct CalculationState<'a, D: PricingDomain> {
    pub context: &'a D::Context,
    pub calculation: &'a [CalculationRow<D::Category>],
    pub discounts: &'a [DiscountRef],
}

impl<'a, D: PricingDomain> Clone for CalculationState<'a, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: PricingDomain> Copy for CalculationState<'a, D> {}

//--------------------------------------    AdapterError     ---------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("Pricing calculation failed: {0}")]
    CalculationFailed(String),
    #[error("Invalid adapter configuration: {0}")]
    Configuration(String),
}

//--------------------------------------   PricingAdapter    ---------------------------------------------------------

/// The contract every pricing adapter implements.
///
/// Identity (`key`, `label`, `version`, `order_index`) is fixed per adapter value, not per pass. The activation
/// predicate is pure and synchronous: no I/O, no failure path. `calculate` returns *only the rows this adapter
/// contributes* — the director concatenates them onto the running calculation.
#[async_trait]
pub trait PricingAdapter<D: PricingDomain>: Send + Sync {
    /// Globally unique identity, e.g. `shop.pricing.order-items`.
    fn key(&self) -> &str;

    fn label(&self) -> &str {
        self.key()
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Execution priority. Lower runs earlier; ties run in registration order.
    fn order_index(&self) -> i32;

    /// Whether this adapter participates in a pass over the given context.
    fn is_activated_for(&self, context: &D::Context) -> bool;

    async fn calculate(
        &self,
        state: CalculationState<'_, D>,
    ) -> Result<Vec<CalculationRow<D::Category>>, AdapterError>;
}

//--------------------------------------   AdapterRegistry   ---------------------------------------------------------

/// The table of adapters for one pricing domain.
///
/// Built once at application wiring time, then shared read-only (typically behind an `Arc`) with every director for
/// that domain. Registration is idempotent by key: registering a key twice overwrites the earlier entry in place, so
/// an adapter keeps its original slot and order-index ties remain stable across re-registration.
pub struct AdapterRegistry<D: PricingDomain> {
    adapters: Vec<Arc<dyn PricingAdapter<D>>>,
}

impl<D: PricingDomain> Default for AdapterRegistry<D> {
    fn default() -> Self {
        Self { adapters: Vec::new() }
    }
}

impl<D: PricingDomain> Debug for AdapterRegistry<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdapterRegistry<{}> ({} adapters)", D::NAME, self.adapters.len())
    }
}

impl<D: PricingDomain> AdapterRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the adapter, or overwrite the existing entry with the same key.
    pub fn register(&mut self, adapter: Arc<dyn PricingAdapter<D>>) -> &mut Self {
        match self.adapters.iter().position(|existing| existing.key() == adapter.key()) {
            Some(i) => {
                debug!("🧩️ Replacing '{}' in the {} adapter registry", adapter.key(), D::NAME);
                self.adapters[i] = adapter;
            },
            None => {
                debug!("🧩️ Registered '{}' ({}) in the {} adapter registry", adapter.key(), adapter.label(), D::NAME);
                self.adapters.push(adapter);
            },
        }
        self
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// A snapshot of the registered adapters, stable-sorted by `order_index` ascending.
    pub fn sorted_adapters(&self) -> Vec<Arc<dyn PricingAdapter<D>>> {
        let mut sorted = self.adapters.clone();
        sorted.sort_by_key(|adapter| adapter.order_index());
        sorted
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::row_types::ProductCategory;

    struct TestDomain;

    impl PricingDomain for TestDomain {
        type Category = ProductCategory;
        type Context = CurrencyCode;

        const NAME: &'static str = "test";

        fn currency(context: &Self::Context) -> &CurrencyCode {
            context
        }
    }

    struct StaticAdapter {
        key: &'static str,
        order_index: i32,
    }

    #[async_trait]
    impl PricingAdapter<TestDomain> for StaticAdapter {
        fn key(&self) -> &str {
            self.key
        }

        fn order_index(&self) -> i32 {
            self.order_index
        }

        fn is_activated_for(&self, _context: &CurrencyCode) -> bool {
            true
        }

        async fn calculate(
            &self,
            _state: CalculationState<'_, TestDomain>,
        ) -> Result<Vec<CalculationRow<ProductCategory>>, AdapterError> {
            Ok(Vec::new())
        }
    }

    fn adapter(key: &'static str, order_index: i32) -> Arc<dyn PricingAdapter<TestDomain>> {
        Arc::new(StaticAdapter { key, order_index })
    }

    #[test]
    fn registration_is_idempotent_by_key() {
        let mut registry = AdapterRegistry::<TestDomain>::new();
        registry.register(adapter("a", 10)).register(adapter("b", 5)).register(adapter("a", 1));
        assert_eq!(registry.len(), 2);
        let sorted = registry.sorted_adapters();
        // The overwrite took effect: "a" now sorts ahead of "b".
        assert_eq!(sorted[0].key(), "a");
        assert_eq!(sorted[0].order_index(), 1);
        assert_eq!(sorted[1].key(), "b");
    }

    #[test]
    fn sorted_adapters_is_nondecreasing_and_stable() {
        let mut registry = AdapterRegistry::<TestDomain>::new();
        registry
            .register(adapter("late", 20))
            .register(adapter("tie-1", 10))
            .register(adapter("early", 0))
            .register(adapter("tie-2", 10));
        let sorted = registry.sorted_adapters();
        let indices = sorted.iter().map(|a| a.order_index()).collect::<Vec<_>>();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
        // Ties run in registration order.
        let keys = sorted.iter().map(|a| a.key()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["early", "tie-1", "tie-2", "late"]);
    }
}
