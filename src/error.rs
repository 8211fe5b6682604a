use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Missing bot token")]
    #[diagnostic(help("set TELEGRAM_BOT_TOKEN or pass --token"))]
    MissingToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}
