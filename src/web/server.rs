//! HTTP server for the search API and the Messenger webhook.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::types::ServerConfig;
use crate::messenger::{MessengerBot, WebhookPayload};
use crate::scripture::PassageResolver;
use crate::web::search::SearchResponse;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PassageResolver>,
    pub messenger: Option<Arc<MessengerBot>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/search", get(search_handler))
        .route("/webhook", get(verify_handler).post(webhook_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve until the shutdown flag is raised.
pub async fn start_http_server(
    state: AppState,
    config: &ServerConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            while shutdown_rx.changed().await.is_ok() {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Passage search. Unrecognized input answers 404 with the same body shape.
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let outcome = state.resolver.search(query.trim()).await;
    let body = SearchResponse::from(&outcome);
    debug!(
        "Search '{}': {} result(s), valid match {}",
        query,
        body.results.len(),
        body.valid_match
    );

    let status = if body.valid_match {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(body)).into_response()
}

async fn verify_handler(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let Some(messenger) = state.messenger else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match messenger.verify_subscription(
        params.mode.as_deref(),
        params.verify_token.as_deref(),
        params.challenge.as_deref(),
    ) {
        Some(challenge) => (StatusCode::OK, challenge.to_string()).into_response(),
        None => {
            warn!("Rejected Messenger webhook verification");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Acknowledge a delivery at once and answer its events in the background.
async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(messenger) = state.messenger else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = messenger.authenticate(&body, signature) {
        warn!("Rejected Messenger delivery: {}", e);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Malformed Messenger delivery: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    tokio::spawn(async move {
        messenger.handle_payload(payload).await;
    });
    (StatusCode::OK, "EVENT_RECEIVED").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::stub::{video, StubCatalog};
    use crate::messenger::MessengerClient;
    use crate::scripture::{BookRegistry, CollectionSettings};

    fn resolver(catalog: StubCatalog) -> Arc<PassageResolver> {
        let registry = Arc::new(BookRegistry::new().unwrap());
        let settings = CollectionSettings {
            old_testament_collection: "OT".to_string(),
            new_testament_collection: "NT".to_string(),
            video_base_url: "http://video.dbt.io/".to_string(),
        };
        Arc::new(PassageResolver::new(registry, Arc::new(catalog), settings).unwrap())
    }

    fn state(with_messenger: bool) -> AppState {
        let resolver = resolver(StubCatalog::with_videos(vec![video("John", 3, 16, "j/3.mp4")]));
        let messenger = with_messenger.then(|| {
            Arc::new(MessengerBot::new(
                MessengerClient::new("page").unwrap(),
                resolver.clone(),
                "verify",
                Some("secret".to_string()),
            ))
        });
        AppState {
            resolver,
            messenger,
        }
    }

    fn search(q: &str) -> Query<SearchParams> {
        Query(SearchParams {
            q: Some(q.to_string()),
        })
    }

    #[tokio::test]
    async fn test_search_found() {
        let response = search_handler(State(state(false)), search("John 3:16")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_book_name_is_valid_match() {
        let response = search_handler(State(state(false)), search("genesis")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_unrecognized_is_404() {
        let response = search_handler(State(state(false)), search("pizza")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = search_handler(State(state(false)), Query(SearchParams::default())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_verify_handshake() {
        let params = VerifyParams {
            mode: Some("subscribe".to_string()),
            verify_token: Some("verify".to_string()),
            challenge: Some("1158201444".to_string()),
        };
        let response = verify_handler(State(state(true)), Query(params)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let params = VerifyParams {
            mode: Some("subscribe".to_string()),
            verify_token: Some("nope".to_string()),
            challenge: Some("1".to_string()),
        };
        let response = verify_handler(State(state(true)), Query(params)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_webhook_without_messenger_is_404() {
        let response = verify_handler(State(state(false)), Query(VerifyParams::default())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsigned_delivery_rejected() {
        let response = webhook_handler(
            State(state(true)),
            HeaderMap::new(),
            Bytes::from_static(br#"{"object":"page","entry":[]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
