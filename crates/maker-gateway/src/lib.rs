//! External boundaries of the market maker.
//!
//! Nothing here implements exchange logic; these are the typed seams the
//! core talks through:
//! - `TradingClient` / `RestClient`: balance queries, order placement,
//!   cancellation
//! - `UserStreamEvent` / `OrderUpdate`: inbound order status, fill, and
//!   balance events
//! - `TickPublisher` / `ChannelPublisher`: outbound tick and trade
//!   publishing

pub mod client;
pub mod error;
pub mod publish;
pub mod user_stream;

pub use client::{RestClient, TradingClient};
pub use error::{GatewayError, GatewayResult};
pub use publish::{ChannelPublisher, TickPublisher};
pub use user_stream::{
    parse_event, translate, BalanceUpdate, OrderFillUpdate, OrderStatusUpdate, OrderUpdate,
    UserStreamEvent,
};
