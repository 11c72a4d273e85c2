//! User-stream event contract.
//!
//! The exchange's user stream reports order status changes, fills, and
//! balance updates as typed events. The strategy only consumes enough of
//! this to retire tracked order ids and notice balance drift; the full
//! translation into the internal order-update contract lives here at the
//! boundary.

use crate::error::GatewayResult;
use maker_core::ClientOrderId;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

/// Raw order status payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: String,
    pub market_id: String,
    pub status: String,
}

/// Raw order fill payload. Amounts are cumulative fills; deltas describe
/// this event alone.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderFillUpdate {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: String,
    pub market_id: String,
    pub base_fill: Decimal,
    pub counter_fill: Decimal,
    pub base_delta: Decimal,
    pub counter_delta: Decimal,
    pub base_fee: Decimal,
    pub counter_fee: Decimal,
}

/// Raw balance update payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceUpdate {
    pub account_id: String,
    pub balance: Decimal,
    pub balance_delta: Decimal,
    pub available: Decimal,
    pub available_delta: Decimal,
}

/// One inbound user-stream event, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserStreamEvent {
    OrderStatus {
        order_status_update: OrderStatusUpdate,
    },
    OrderFill {
        order_fill_update: OrderFillUpdate,
    },
    BalanceUpdate {
        balance_update: BalanceUpdate,
    },
}

/// Translated order update consumed by the strategy task.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderUpdate {
    Status {
        client_order_id: ClientOrderId,
        exchange_order_id: String,
        symbol: String,
        status: String,
    },
    Fill {
        client_order_id: ClientOrderId,
        exchange_order_id: String,
        symbol: String,
        fill_price: Decimal,
        fill_size: Decimal,
        commission: Decimal,
    },
    Balance {
        account_id: String,
        balance: Decimal,
        available: Decimal,
    },
}

impl OrderUpdate {
    /// The client order id this update retires, if any: a fill, or a
    /// status update that left the open state.
    pub fn closes_order(&self) -> Option<&ClientOrderId> {
        match self {
            Self::Fill {
                client_order_id, ..
            } => Some(client_order_id),
            Self::Status {
                client_order_id,
                status,
                ..
            } if status != "PENDING" => Some(client_order_id),
            _ => None,
        }
    }
}

/// Parse a raw user-stream payload.
pub fn parse_event(payload: &str) -> GatewayResult<UserStreamEvent> {
    Ok(serde_json::from_str(payload)?)
}

/// Translate an inbound event into the internal order-update contract.
///
/// Fill price is `counter_fill / base_fill`; a fill event with a zero base
/// amount is malformed and dropped.
pub fn translate(event: UserStreamEvent) -> Option<OrderUpdate> {
    match event {
        UserStreamEvent::OrderStatus {
            order_status_update: update,
        } => Some(OrderUpdate::Status {
            client_order_id: ClientOrderId::from_string(update.client_order_id),
            exchange_order_id: update.order_id,
            symbol: update.market_id,
            status: update.status,
        }),
        UserStreamEvent::OrderFill {
            order_fill_update: update,
        } => {
            if update.base_fill.is_zero() {
                warn!(order_id = %update.order_id, "Fill with zero base amount dropped");
                return None;
            }
            Some(OrderUpdate::Fill {
                client_order_id: ClientOrderId::from_string(update.client_order_id),
                exchange_order_id: update.order_id,
                symbol: update.market_id,
                fill_price: update.counter_fill / update.base_fill,
                fill_size: update.base_fill,
                commission: update.base_fee,
            })
        }
        UserStreamEvent::BalanceUpdate {
            balance_update: update,
        } => Some(OrderUpdate::Balance {
            account_id: update.account_id,
            balance: update.balance,
            available: update.available,
        }),
    }
}
