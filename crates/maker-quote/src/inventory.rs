//! Inventory state for one strategy instance.
//!
//! The target inventory ratio is captured from the first observed balances
//! and held fixed for the lifetime of the instance; each cycle re-expresses
//! it in current terms through the mid price and derives the signed
//! deviation `q` that skews the quotes.

use crate::error::{QuoteError, QuoteResult};
use maker_core::Price;
use rust_decimal::Decimal;
use tracing::info;

/// Balances and the fixed inventory target.
#[derive(Debug, Clone)]
pub struct InventoryState {
    pub base_balance: Decimal,
    pub quote_balance: Decimal,
    q_target: Option<Decimal>,
}

impl InventoryState {
    pub fn new() -> Self {
        Self {
            base_balance: Decimal::ZERO,
            quote_balance: Decimal::ZERO,
            q_target: None,
        }
    }

    /// Refresh balances from an explicit balance query.
    pub fn update_balances(&mut self, base: Decimal, quote: Decimal) {
        self.base_balance = base;
        self.quote_balance = quote;
    }

    /// The fixed target ratio, once captured.
    pub fn q_target(&self) -> Option<Decimal> {
        self.q_target
    }

    /// Signed deviation of base holdings from the target, normalized by
    /// total inventory in base units.
    ///
    /// Captures `q_target` on the first call and keeps it for the lifetime
    /// of the instance.
    pub fn deviation(&mut self, mid: Price) -> QuoteResult<Decimal> {
        if !mid.is_positive() {
            return Err(QuoteError::InvalidInventory(format!(
                "non-positive mid price {mid}"
            )));
        }
        let inventory_in_quote = self.base_balance * mid.inner() + self.quote_balance;
        if inventory_in_quote.is_zero() {
            return Err(QuoteError::InvalidInventory(
                "total inventory is zero".to_string(),
            ));
        }
        let inventory_in_base = inventory_in_quote / mid.inner();

        let q_target = match self.q_target {
            Some(target) => target,
            None => {
                let target = self.base_balance / inventory_in_base;
                info!(q_target = %target, "Captured initial inventory target");
                self.q_target = Some(target);
                target
            }
        };

        let target_inventory_in_quote = inventory_in_quote * q_target;
        let target_inventory_in_base = target_inventory_in_quote / mid.inner();
        Ok((self.base_balance - target_inventory_in_base) / inventory_in_base)
    }
}

impl Default for InventoryState {
    fn default() -> Self {
        Self::new()
    }
}
