use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ResponseMeta;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id, echoed back on the response and copied into every envelope.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer tokens accepted on the `/api/v1` audit routes.
#[derive(Clone)]
pub struct AuthState {
    tokens: Arc<[String]>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("tokens", &self.tokens.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthState {
    /// Reads `SHOPAUDIT_API_KEYS`.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("SHOPAUDIT_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// Parses a comma-separated token list. An empty list turns auth off in
    /// development and is a startup error everywhere else.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut tokens: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        tokens.sort_unstable();
        tokens.dedup();

        match (tokens.is_empty(), is_development) {
            (false, _) => Ok(Self {
                tokens: tokens.into(),
                enabled: true,
            }),
            (true, true) => {
                tracing::warn!("SHOPAUDIT_API_KEYS is empty; audit routes are open in development");
                Ok(Self {
                    tokens: Arc::from(Vec::new()),
                    enabled: false,
                })
            }
            (true, false) => anyhow::bail!(
                "SHOPAUDIT_API_KEYS must list at least one bearer token outside development"
            ),
        }
    }

    /// Checks every configured token so timing does not reveal a prefix match.
    fn allows(&self, candidate: &str) -> bool {
        let hit = self
            .tokens
            .iter()
            .map(|token| token.as_bytes().ct_eq(candidate.as_bytes()))
            .fold(subtle::Choice::from(0u8), |acc, eq| acc | eq);
        hit.into()
    }
}

/// Fixed-window limiter shared by all audit routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<(Instant, usize)>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new((Instant::now(), 0))),
        }
    }

    /// Counts one request against the window; `false` once the budget is spent.
    async fn try_acquire(&self) -> bool {
        let mut current = self.current.lock().await;
        let (started_at, count) = &mut *current;
        if started_at.elapsed() >= self.window {
            *started_at = Instant::now();
            *count = 0;
        }
        if *count >= self.max_requests {
            return false;
        }
        *count += 1;
        true
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
    meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

fn reject(req: &Request, status: StatusCode, code: &'static str, message: &'static str) -> Response {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map_or_else(|| Uuid::new_v4().to_string(), |id| id.0.clone());
    let body = MiddlewareErrorBody {
        error: MiddlewareError { code, message },
        meta: ResponseMeta::new(request_id),
    };
    (status, Json(body)).into_response()
}

/// Takes the caller's `x-request-id` or mints a `UUIDv4`, stores it as a
/// [`RequestId`] extension and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    let authorized = bearer_token(req.headers().get(AUTHORIZATION)).is_some_and(|t| auth.allows(t));
    if authorized {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "audit request rejected: bad bearer token");
    reject(
        &req,
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "missing or invalid bearer token",
    )
}

pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.try_acquire().await {
        next.run(req).await
    } else {
        tracing::warn!(path = %req.uri().path(), "audit request rate limited");
        reject(
            &req,
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded",
        )
    }
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    let token = value?.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
