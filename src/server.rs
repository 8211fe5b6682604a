// webhook mode - telegram posts updates to us over http

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::telegram::Update;
use crate::{Bot, Error};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub struct Server;

impl Server {
    /// Register `webhook_url` with telegram and serve updates posted to its path.
    pub async fn run(bot: Bot, webhook_url: &str, host: &str, port: u16) -> Result<(), Error> {
        let url = reqwest::Url::parse(webhook_url)
            .map_err(|e| Error::Server(format!("invalid webhook url: {e}")))?;
        let path = url.path().to_string();
        if path == "/health" {
            return Err(Error::Server("webhook path clashes with /health".into()));
        }

        bot.api().set_webhook(webhook_url).await?;

        let app = Server::router(bot, &path);

        let addr = format!("{host}:{port}");
        info!(%addr, %path, "webhook server listening");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                tokio::signal::ctrl_c().await.ok();
                info!("shutting down");
            })
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }

    pub fn router(bot: Bot, path: &str) -> Router {
        Router::new()
            .route("/health", get(health))
            .route(path, post(webhook))
            .with_state(Arc::new(bot))
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// answer telegram right away, the reply goes out through the bot api
async fn webhook(State(bot): State<Arc<Bot>>, Json(update): Json<Update>) -> StatusCode {
    tokio::spawn(async move { bot.handle(update).await });
    StatusCode::OK
}
