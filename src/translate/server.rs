//! HTTP proxy in front of the translation provider.
//!
//! Exposes `POST /translate` so front-ends never hold the provider key.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use super::{TranslateError, TranslateRequest, TranslateResponse, Translator};

/// Server state shared across requests.
#[derive(Clone)]
pub struct ProxyState {
    pub translator: Arc<dyn Translator>,
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing text, sourceLang, or targetLang")]
    MissingFields,

    #[error("Translation failed")]
    Translation(#[from] TranslateError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ProxyError::MissingFields => (
                StatusCode::BAD_REQUEST,
                TranslateResponse {
                    error: Some(self.to_string()),
                    ..Default::default()
                },
            ),
            ProxyError::Translation(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                TranslateResponse {
                    error: Some(self.to_string()),
                    details: Some(e.to_string()),
                    ..Default::default()
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Handle translation requests.
async fn translate(
    State(state): State<Arc<ProxyState>>,
    body: Bytes,
) -> Result<Json<TranslateResponse>, ProxyError> {
    // Bodies that are not JSON count as missing every field
    let request: TranslateRequest = serde_json::from_slice(&body).unwrap_or_default();
    if !request.is_complete() {
        return Err(ProxyError::MissingFields);
    }

    let translation = state
        .translator
        .translate(&request.text, &request.source_lang, &request.target_lang)
        .await
        .map_err(|e| {
            log::error!("Translation of '{}' failed: {}", request.text, e);
            e
        })?;

    log::debug!(
        "Translated '{}' ({} -> {})",
        request.text,
        request.source_lang,
        request.target_lang
    );

    Ok(Json(TranslateResponse {
        translation: Some(translation),
        ..Default::default()
    }))
}

/// Routes of the proxy, with permissive CORS for browser front-ends
pub fn router(translator: Arc<dyn Translator>) -> Router {
    let state = Arc::new(ProxyState { translator });

    Router::new()
        .route("/translate", post(translate))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Proxy server handle for managing the server lifecycle.
pub struct ProxyServer {
    /// Address the server is listening on.
    pub addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ProxyServer {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Get the base URL for this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the server gracefully.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait until the server task has finished.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            log::error!("Translation proxy task failed: {}", e);
        }
    }
}

/// Start the translation proxy on `addr` (port 0 picks a free port).
pub async fn start_server(
    addr: SocketAddr,
    translator: Arc<dyn Translator>,
) -> std::io::Result<ProxyServer> {
    let app = router(translator);

    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    log::info!("Translation proxy listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                log::info!("Translation proxy shutting down");
            })
            .await;
        if let Err(e) = result {
            log::error!("Translation proxy stopped with error: {}", e);
        }
    });

    Ok(ProxyServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
