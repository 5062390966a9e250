//! In-process stub of the analysis service.
//!
//! Serves `POST /api/analyze` and `GET /api/health` on an ephemeral
//! loopback port, records every analyze request, and answers with a fixed
//! reply.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use product_analyzer::client::HttpTransport;
use product_analyzer::config::AnalyzerConfig;

/// One multipart part as the stub received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPart {
    /// Form field name.
    pub name: Option<String>,
    /// Declared file name.
    pub file_name: Option<String>,
    /// Declared part content type.
    pub content_type: Option<String>,
    /// Raw part bytes.
    pub bytes: Vec<u8>,
}

/// One analyze request as the stub received it.
#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    /// Non-multipart request; the body parsed as JSON (`Null` if not JSON).
    Json {
        /// Request content type.
        content_type: Option<String>,
        /// Parsed body.
        body: Value,
    },
    /// Multipart request.
    Multipart {
        /// Request content type, including the boundary.
        content_type: Option<String>,
        /// Every part, in order.
        parts: Vec<CapturedPart>,
    },
}

/// Stub service state.
#[derive(Debug, Clone)]
pub struct Stub {
    hits: Arc<AtomicUsize>,
    captured: Arc<Mutex<Vec<Captured>>>,
    status: StatusCode,
    reply_content_type: &'static str,
    reply: Arc<String>,
}

impl Stub {
    /// Stub answering `200` with `body` as JSON.
    pub fn json(body: Value) -> Self {
        Self::raw(StatusCode::OK, "application/json", body.to_string())
    }

    /// Stub answering with an arbitrary status, content type and body.
    pub fn raw(status: StatusCode, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
            captured: Arc::new(Mutex::new(Vec::new())),
            status,
            reply_content_type: content_type,
            reply: Arc::new(body.into()),
        }
    }

    /// Number of analyze requests received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Every analyze request received, in order.
    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Serves the stub and returns a transport pointed at it.
    pub async fn start(&self) -> HttpTransport {
        let addr = self.serve().await;
        let Ok(config) = AnalyzerConfig::new(&format!("http://{addr}")) else {
            panic!("stub url is valid");
        };
        let Ok(transport) = HttpTransport::new(&config) else {
            panic!("http client builds");
        };
        transport
    }

    async fn serve(&self) -> SocketAddr {
        let app = Router::new()
            .route("/api/analyze", post(analyze))
            .route("/api/health", get(health))
            .with_state(self.clone());

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind stub listener");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("stub address");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        addr
    }

    fn record(&self, captured: Captured) {
        if let Ok(mut all) = self.captured.lock() {
            all.push(captured);
        }
    }

    fn reply(&self) -> Response {
        (
            self.status,
            [(CONTENT_TYPE, self.reply_content_type)],
            self.reply.as_str().to_string(),
        )
            .into_response()
    }
}

async fn analyze(State(stub): State<Stub>, request: Request) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let is_multipart = content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let Ok(mut multipart) = Multipart::from_request(request, &()).await else {
            return (StatusCode::BAD_REQUEST, "bad multipart").into_response();
        };
        let mut parts = Vec::new();
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().map(str::to_string);
            let file_name = field.file_name().map(str::to_string);
            let part_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            parts.push(CapturedPart {
                name,
                file_name,
                content_type: part_type,
                bytes,
            });
        }
        stub.record(Captured::Multipart {
            content_type,
            parts,
        });
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        stub.record(Captured::Json { content_type, body });
    }

    stub.reply()
}

async fn health() -> impl IntoResponse {
    axum::Json(json!({ "status": "healthy" }))
}

/// Payload from the nutrition scenario: one ingredient, rating 3.
pub fn sugar_payload() -> Value {
    json!({
        "extracted_data": { "ingredients": ["sugar"] },
        "analysis": {
            "nutritional_summary": {
                "overall_rating": 3,
                "calories_assessment": "Mostly sugar"
            }
        }
    })
}
