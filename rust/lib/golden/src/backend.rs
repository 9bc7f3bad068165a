//! In-memory admin REST backend served over real HTTP.
//!
//! Routes (under `/api`):
//!
//! | method | path | |
//! |---|---|---|
//! | POST | `/auth/login` | `{username, password}` → `{data: {token, expiresIn}}` |
//! | POST | `/auth/check` | 200 when the bearer token was issued here |
//! | GET, POST | `/{entity}` | list (`?locationId=`), create |
//! | GET, PUT, DELETE | `/{entity}/{id}` | read, update, delete |
//!
//! Entity routes require a bearer token issued by `/auth/login` (or
//! [`GoldenBackend::issue_token`]).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use netadmin_core::{ApiResponse, ServiceError, new_id, now_rfc3339};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "golden-admin-pw";

/// Collections the backend serves.
pub const COLLECTIONS: &[&str] = &["location", "cable", "ont", "stb", "inventory"];

/// Token lifetime reported by `/auth/login`.
const TOKEN_TTL_SECS: u64 = 3600;

#[derive(Default)]
struct Db {
    collections: BTreeMap<&'static str, BTreeMap<String, Value>>,
    tokens: HashSet<String>,
    /// `"{METHOD} {path}"` of every entity and auth request, in arrival order.
    log: Vec<String>,
}

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Db>>,
    latency_ms: Arc<AtomicU64>,
}

impl AppState {
    fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply configured latency, then record the request.
    async fn enter(&self, method: &str, path: String) {
        let ms = self.latency_ms.load(Ordering::Relaxed);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        debug!(method, %path, "golden request");
        self.db().log.push(format!("{} {}", method, path));
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ServiceError> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".into()))?;
        if self.db().tokens.contains(token) {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized("invalid token".into()))
        }
    }
}

/// A running backend bound to `127.0.0.1` on an ephemeral port.
///
/// The server task is aborted on drop.
pub struct GoldenBackend {
    addr: SocketAddr,
    state: AppState,
    handle: JoinHandle<()>,
}

impl GoldenBackend {
    pub async fn start() -> std::io::Result<Self> {
        let state = AppState {
            db: Arc::new(Mutex::new(Db::default())),
            latency_ms: Arc::new(AtomicU64::new(0)),
        };

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/check", post(check))
            .route("/{entity}", get(list).post(create))
            .route("/{entity}/{id}", get(read).put(update).delete(remove))
            .with_state(state.clone());
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "golden backend stopped");
            }
        });

        Ok(Self { addr, state, handle })
    }

    /// Base API endpoint, e.g. `http://127.0.0.1:41234/api`.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Mint a token without going through `/auth/login`.
    pub fn issue_token(&self) -> String {
        let token = new_id();
        self.state.db().tokens.insert(token.clone());
        token
    }

    /// Delay every request by `latency` before it is handled.
    pub fn set_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.state.latency_ms.store(ms, Ordering::Relaxed);
    }

    /// Store `record` directly, returning its identifier.
    pub fn seed(&self, entity: &str, record: Value) -> String {
        let mut db = self.state.db();
        let Some(name) = collection(entity) else {
            return String::new();
        };
        let (id, stored) = stamp_new(record);
        db.collections.entry(name).or_default().insert(id.clone(), stored);
        id
    }

    pub fn record(&self, entity: &str, id: &str) -> Option<Value> {
        let db = self.state.db();
        db.collections
            .get(entity)
            .and_then(|c| c.get(id))
            .cloned()
    }

    pub fn count(&self, entity: &str) -> usize {
        self.state.db().collections.get(entity).map_or(0, BTreeMap::len)
    }

    /// Number of requests whose line starts with `prefix` (`"GET /ont"`).
    pub fn requests_matching(&self, prefix: &str) -> usize {
        self.state
            .db()
            .log
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

impl Drop for GoldenBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn collection(entity: &str) -> Option<&'static str> {
    COLLECTIONS.iter().copied().find(|c| *c == entity)
}

fn known(entity: &str) -> Result<&'static str, ServiceError> {
    collection(entity).ok_or_else(|| ServiceError::NotFound(format!("unknown collection '{}'", entity)))
}

fn object(body: Value) -> Result<Map<String, Value>, ServiceError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ServiceError::Validation("body must be a JSON object".into())),
    }
}

/// Assign id and timestamps to a new record.
fn stamp_new(record: Value) -> (String, Value) {
    let mut map = match record {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let id = match map.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => new_id(),
    };
    let now = now_rfc3339();
    map.insert("id".into(), Value::String(id.clone()));
    map.insert("createdAt".into(), Value::String(now.clone()));
    map.insert("updatedAt".into(), Value::String(now));
    (id, Value::Object(map))
}

/// Serial numbers are unique per device collection.
fn serial_taken(records: &BTreeMap<String, Value>, serial: &str, except: Option<&str>) -> bool {
    records.iter().any(|(id, r)| {
        Some(id.as_str()) != except && r.get("serialNumber").and_then(Value::as_str) == Some(serial)
    })
}

fn check_serial(
    records: &BTreeMap<String, Value>,
    body: &Map<String, Value>,
    except: Option<&str>,
) -> Result<(), ServiceError> {
    match body.get("serialNumber").and_then(Value::as_str) {
        Some(serial) if !serial.is_empty() && serial_taken(records, serial, except) => {
            Err(ServiceError::Conflict(format!("serial number {} already registered", serial)))
        }
        _ => Ok(()),
    }
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    state.enter("POST", "/auth/login".into()).await;
    if body.username != ADMIN_USER || body.password != ADMIN_PASSWORD {
        return Err(ServiceError::Unauthorized("invalid credentials".into()));
    }
    let token = new_id();
    state.db().tokens.insert(token.clone());
    Ok(Json(ApiResponse::ok(json!({
        "token": token,
        "expiresIn": TOKEN_TTL_SECS,
    }))))
}

async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    state.enter("POST", "/auth/check".into()).await;
    state.authorize(&headers)?;
    Ok(Json(ApiResponse::ok(json!({"valid": true})).with_message("session valid")))
}

// ── Collections ─────────────────────────────────────────────────────

async fn list(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Value>>>, ServiceError> {
    state.enter("GET", format!("/{}", entity)).await;
    state.authorize(&headers)?;
    let name = known(&entity)?;

    let location = query.get("locationId");
    let db = state.db();
    let rows: Vec<Value> = db
        .collections
        .get(name)
        .map(|c| {
            c.values()
                .filter(|r| match location {
                    Some(loc) => r.get("locationId").and_then(Value::as_str) == Some(loc.as_str()),
                    None => true,
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(ApiResponse::ok(rows)))
}

async fn read(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    state.enter("GET", format!("/{}/{}", entity, id)).await;
    state.authorize(&headers)?;
    let name = known(&entity)?;

    let db = state.db();
    db.collections
        .get(name)
        .and_then(|c| c.get(&id))
        .cloned()
        .map(|r| Json(ApiResponse::ok(r)))
        .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", name, id)))
}

async fn create(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    state.enter("POST", format!("/{}", entity)).await;
    state.authorize(&headers)?;
    let name = known(&entity)?;
    let mut body = object(body)?;
    body.remove("id");

    let mut db = state.db();
    let records = db.collections.entry(name).or_default();
    check_serial(records, &body, None)?;
    let (id, stored) = stamp_new(Value::Object(body));
    records.insert(id, stored.clone());
    Ok(Json(ApiResponse::ok(stored).with_message(format!("{} created", name))))
}

async fn update(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    state.enter("PUT", format!("/{}/{}", entity, id)).await;
    state.authorize(&headers)?;
    let name = known(&entity)?;
    let body = object(body)?;

    let mut db = state.db();
    let records = db.collections.entry(name).or_default();
    check_serial(records, &body, Some(&id))?;
    let Some(Value::Object(existing)) = records.get_mut(&id) else {
        return Err(ServiceError::NotFound(format!("{} '{}' not found", name, id)));
    };
    for (k, v) in body {
        if k != "id" && k != "createdAt" {
            existing.insert(k, v);
        }
    }
    existing.insert("updatedAt".into(), Value::String(now_rfc3339()));
    let stored = Value::Object(existing.clone());
    Ok(Json(ApiResponse::ok(stored).with_message(format!("{} updated", name))))
}

async fn remove(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    state.enter("DELETE", format!("/{}/{}", entity, id)).await;
    state.authorize(&headers)?;
    let name = known(&entity)?;

    let mut db = state.db();
    db.collections
        .get_mut(name)
        .and_then(|c| c.remove(&id))
        .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", name, id)))?;
    Ok(Json(ApiResponse::ok(json!({"id": id})).with_message(format!("{} deleted", name))))
}
