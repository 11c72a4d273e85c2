//! REST trading client boundary.
//!
//! The quoting side of the system only needs three calls: balance query,
//! limit order placement, and cancel. `TradingClient` is the seam the
//! application executes `MakerAction`s through; `RestClient` is the live
//! implementation against the exchange REST API.

use crate::error::{GatewayError, GatewayResult};
use maker_core::{ClientOrderId, Price, Side, Volume};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for REST requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Order placement and account access used by the strategy task.
pub trait TradingClient: Send + Sync {
    /// Current balances for the given assets.
    fn get_balances(
        &self,
        assets: &[String],
    ) -> impl Future<Output = GatewayResult<HashMap<String, Decimal>>> + Send;

    /// Place a post-only limit order under a caller-assigned client order id.
    fn place_limit_order(
        &self,
        pair: &str,
        price: Price,
        side: Side,
        volume: Volume,
        client_order_id: &ClientOrderId,
        post_only: bool,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Cancel an outstanding order by client order id.
    fn cancel_order(&self, order_id: &ClientOrderId)
        -> impl Future<Output = GatewayResult<()>> + Send;
}

#[derive(Debug, Deserialize)]
struct BalanceEntry {
    asset: String,
    balance: Decimal,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: Vec<BalanceEntry>,
}

/// Error body the exchange returns on rejected requests.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_code: String,
}

/// Map a rejection body onto the gateway taxonomy. Insufficient-funds
/// rejections get their own variant so the caller can distinguish them
/// from transient errors.
pub(crate) fn classify_rejection(body: &str) -> GatewayError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => {
            if parsed.error_code == "ErrInsufficientBalance"
                || parsed.error.to_lowercase().contains("insufficient balance")
            {
                GatewayError::InsufficientBalance(parsed.error)
            } else {
                GatewayError::Rejected {
                    code: parsed.error_code,
                    message: parsed.error,
                }
            }
        }
        Err(_) => GatewayError::Rejected {
            code: String::new(),
            message: body.to_string(),
        },
    }
}

/// Live REST client. Authenticates with the API key id/secret pair over
/// HTTP basic auth.
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key_id: String,
    api_key_secret: String,
}

impl RestClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key_id: String,
        api_key_secret: String,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Http(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key_id,
            api_key_secret,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> GatewayResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_rejection(&body))
    }
}

impl TradingClient for RestClient {
    async fn get_balances(&self, assets: &[String]) -> GatewayResult<HashMap<String, Decimal>> {
        let query: Vec<(&str, &str)> = assets.iter().map(|a| ("assets", a.as_str())).collect();
        let response = self
            .client
            .get(self.url("/api/1/balance"))
            .basic_auth(&self.api_key_id, Some(&self.api_key_secret))
            .query(&query)
            .send()
            .await?;
        let parsed: BalanceResponse = Self::check(response).await?.json().await?;

        let balances = parsed
            .balance
            .into_iter()
            .map(|entry| (entry.asset, entry.balance))
            .collect();
        debug!(?balances, "Balances fetched");
        Ok(balances)
    }

    async fn place_limit_order(
        &self,
        pair: &str,
        price: Price,
        side: Side,
        volume: Volume,
        client_order_id: &ClientOrderId,
        post_only: bool,
    ) -> GatewayResult<()> {
        let order_type = match side {
            Side::Bid => "BID",
            Side::Ask => "ASK",
        };
        let params = [
            ("pair", pair.to_string()),
            ("type", order_type.to_string()),
            ("price", price.to_string()),
            ("volume", volume.to_string()),
            ("client_order_id", client_order_id.to_string()),
            ("post_only", post_only.to_string()),
        ];
        let response = self
            .client
            .post(self.url("/api/1/postorder"))
            .basic_auth(&self.api_key_id, Some(&self.api_key_secret))
            .form(&params)
            .send()
            .await?;
        Self::check(response).await?;
        info!(pair, %side, %price, %volume, order_id = %client_order_id, "Limit order placed");
        Ok(())
    }

    async fn cancel_order(&self, order_id: &ClientOrderId) -> GatewayResult<()> {
        let params = [("order_id", order_id.to_string())];
        let response = self
            .client
            .post(self.url("/api/1/stoporder"))
            .basic_auth(&self.api_key_id, Some(&self.api_key_secret))
            .form(&params)
            .send()
            .await?;
        Self::check(response).await?;
        info!(%order_id, "Order cancelled");
        Ok(())
    }
}
