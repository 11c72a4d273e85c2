//! Inventory-aware Avellaneda-Stoikov quoting.
//!
//! Consumes published analytics ticks and the strategy's inventory state,
//! computes reservation price / optimal spread / skewed sizes, and manages
//! the lifecycle of the outstanding quote pair through `MakerAction`s
//! executed by the application against the trading gateway.

pub mod config;
pub mod error;
pub mod inventory;
pub mod quote_engine;
pub mod quote_manager;
pub mod tracker;

pub use config::QuoteConfig;
pub use error::{QuoteError, QuoteResult};
pub use inventory::InventoryState;
pub use quote_engine::{compute_quote, Quote};
pub use quote_manager::{MakerAction, PendingCancel, PendingOrder, QuoteManager};
pub use tracker::{OrderTracker, TrackedOrder};
