//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Feed error: {0}")]
    Ws(#[from] maker_ws::WsError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] maker_gateway::GatewayError),

    #[error("Quote error: {0}")]
    Quote(#[from] maker_quote::QuoteError),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type AppResult<T> = Result<T, AppError>;
