use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const VERSION: &str = "1.4.0";
const DEFAULT_KEY_LENGTH: usize = 14;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub body: String,
    pub url: bool,
    pub clicks: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub version: String,
    pub availability: bool,
    pub msg: String,
}

/// What `/echo` saw, returned as JSON.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub query: HashMap<String, String>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<String, Record>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/", post(create_record))
        .route("/health", get(health))
        .route("/broken", get(broken))
        .route("/echo", any(echo))
        .route("/slow", get(slow))
        .route("/{key}", get(get_record))
        .route("/{key}/", get(get_record))
        .route("/{key}/clicks", get(get_clicks))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn text(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

async fn create_record(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if body.is_empty() {
        return text(StatusCode::BAD_REQUEST, "empty body".to_string());
    }

    let key = match params.get("key").filter(|k| !k.is_empty()) {
        Some(key) => key.clone(),
        None => {
            let len = params
                .get("len")
                .and_then(|l| l.parse::<usize>().ok())
                .unwrap_or(DEFAULT_KEY_LENGTH)
                .clamp(1, 32);
            Uuid::new_v4().simple().to_string()[..len].to_string()
        }
    };

    let mut records = db.write().await;
    if records.contains_key(&key) {
        return text(StatusCode::CONFLICT, "key already exists".to_string());
    }
    records.insert(
        key.clone(),
        Record {
            body,
            url: params.get("url").is_some_and(|u| u == "true"),
            clicks: 0,
        },
    );

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    text(StatusCode::OK, format!("http://{host}/{key}/"))
}

async fn get_record(State(db): State<Db>, Path(key): Path<String>) -> Response {
    let mut records = db.write().await;
    match records.get_mut(&key) {
        Some(record) => {
            record.clicks += 1;
            if record.url {
                return (StatusCode::FOUND, [(header::LOCATION, record.body.clone())]).into_response();
            }
            text(StatusCode::OK, record.body.clone())
        }
        None => text(StatusCode::NOT_FOUND, "key not found".to_string()),
    }
}

async fn get_clicks(State(db): State<Db>, Path(key): Path<String>) -> Response {
    let records = db.read().await;
    match records.get(&key) {
        Some(record) => text(StatusCode::OK, record.clicks.to_string()),
        None => text(StatusCode::NOT_FOUND, "key not found".to_string()),
    }
}

async fn health() -> Json<Health> {
    Json(Health {
        version: VERSION.to_string(),
        availability: true,
        msg: "ok".to_string(),
    })
}

async fn broken() -> Response {
    text(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
}

async fn echo(
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string),
        query,
        body,
    })
}

async fn slow(Query(params): Query<HashMap<String, String>>) -> Response {
    let ms = params.get("ms").and_then(|m| m.parse::<u64>().ok()).unwrap_or(0);
    tokio::time::sleep(Duration::from_millis(ms)).await;
    text(StatusCode::OK, format!("slept {ms}ms"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_in_field_order() {
        let health = Health {
            version: "1.0.0".to_string(),
            availability: true,
            msg: "ok".to_string(),
        };
        let json = serde_json::to_string(&health).unwrap();
        assert_eq!(json, r#"{"version":"1.0.0","availability":true,"msg":"ok"}"#);
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "POST".to_string(),
            content_type: Some("text/plain".to_string()),
            query: HashMap::from([("ttl".to_string(), "3h".to_string())]),
            body: "hello".to_string(),
        };
        let json = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echo);
    }
}
