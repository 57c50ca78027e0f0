//! HTTP implementation of [`ActivityClient`].
//!
//! Speaks the JSON endpoints of the private API:
//!
//! - `POST accounts/login/` - form login, session cookies in `Set-Cookie`
//! - `GET users/{username}/usernameinfo/` - account lookup
//! - `GET news/[?max_id=...]` - following-activity feed
//!
//! Session cookies are kept in the settings snapshot as raw bytes under
//! `cookie`, so a later run can resume without the password.

use async_trait::async_trait;
use chrono::Utc;
use followfeed_core::{
    ActivityClient, ActivityPage, AuthRequest, ClientError, RawActivityEntry, SessionState,
    SettingValue, UserId, DEVICE_ID_KEY,
};
use followfeed_store::ApiConfig;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, RETRY_AFTER, SET_COOKIE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint.
const LOGIN_ENDPOINT: &str = "accounts/login/";

/// Following-activity feed endpoint.
const NEWS_ENDPOINT: &str = "news/";

/// Settings key holding the cookie header bytes.
pub const COOKIE_KEY: &str = "cookie";

/// Settings key holding the cookie expiry (epoch seconds).
pub const COOKIE_EXPIRY_KEY: &str = "cookie_expiry";

/// Settings key holding the per-install uuid.
pub const UUID_KEY: &str = "uuid";

/// Settings key holding the user agent.
pub const USER_AGENT_KEY: &str = "user_agent";

/// Settings key holding the login timestamp.
pub const CREATED_TS_KEY: &str = "created_ts";

/// Cookie lifetime when the server sends no `Max-Age`.
const DEFAULT_COOKIE_LIFETIME_SECS: i64 = 90 * 24 * 60 * 60;

/// `error_type` values that mean the username/password pair was refused.
const CREDENTIAL_ERROR_TYPES: &[&str] = &["bad_password", "invalid_user", "invalid_credentials"];

// ============================================================================
// API Response Types
// ============================================================================

/// Error body returned by the API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_type: Option<String>,
}

/// Response from the login endpoint.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Response from the usernameinfo endpoint.
#[derive(Debug, Deserialize)]
struct UsernameInfoResponse {
    user: UsernameInfoUser,
}

#[derive(Debug, Deserialize)]
struct UsernameInfoUser {
    pk: Value,
}

/// Response from the news endpoint.
#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    stories: Vec<RawActivityEntry>,
    #[serde(default)]
    next_max_id: Option<Value>,
}

impl NewsResponse {
    fn into_page(self) -> ActivityPage {
        let next_cursor = match self.next_max_id {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        ActivityPage::new(self.stories, next_cursor)
    }
}

// ============================================================================
// API Client
// ============================================================================

/// HTTP client for the private activity API.
#[derive(Debug)]
pub struct HttpActivityClient {
    http: reqwest::Client,
    base_url: Url,
    user_agent: String,
    settings: SessionState,
}

impl HttpActivityClient {
    /// Creates an unauthenticated client.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ClientError::Http(format!("Invalid base URL {base}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            user_agent: config.user_agent.clone(),
            settings: SessionState::new(),
        })
    }

    /// Generates a device id of the form `android-<16 hex chars>`.
    pub fn generate_device_id() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("android-{}", &hex[..16])
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Http(format!("Invalid endpoint {path}: {e}")))
    }

    /// `users/{username}/usernameinfo/`, with the username as one encoded
    /// path segment.
    fn usernameinfo_url(&self, username: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Http(format!("Base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["users", username, "usernameinfo", ""]);
        Ok(url)
    }

    /// The `Cookie` header value from the current settings.
    fn cookie_header(&self) -> Option<String> {
        let bytes = self.settings.get(COOKIE_KEY)?.as_bytes()?;
        let cookie = String::from_utf8_lossy(bytes).into_owned();
        (!cookie.trim().is_empty()).then_some(cookie)
    }

    /// Checks that cached settings still describe a live session.
    fn validate_cached_session(&self) -> Result<(), ClientError> {
        if self.cookie_header().is_none() {
            return Err(ClientError::SessionExpired(
                "login required: no session cookie".to_string(),
            ));
        }

        if let Some(expiry) = self.settings.get(COOKIE_EXPIRY_KEY).and_then(SettingValue::as_i64) {
            let now = Utc::now().timestamp();
            if expiry <= now {
                return Err(ClientError::SessionExpired(format!(
                    "session cookie expired at {expiry}"
                )));
            }
        }

        Ok(())
    }

    async fn get_json(&self, url: Url) -> Result<Value, ClientError> {
        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some(cookie) = self.cookie_header() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let response = check_status(response).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    #[instrument(skip(self, request), fields(username = %request.credentials.username))]
    async fn login(&mut self, request: AuthRequest<'_>) -> Result<(), ClientError> {
        let credentials = request.credentials;
        let password = credentials
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ClientError::LoginRejected(format!(
                    "no password configured for {}",
                    credentials.username
                ))
            })?;

        let device_id = request.device_id.unwrap_or_else(Self::generate_device_id);
        let uuid = Uuid::new_v4().to_string();
        debug!(device_id = %device_id, "Logging in");

        let form = [
            ("username", credentials.username.as_str()),
            ("password", password),
            ("device_id", device_id.as_str()),
            ("guid", uuid.as_str()),
        ];

        let response = self
            .http
            .post(self.endpoint(LOGIN_ENDPOINT)?)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = check_status(response).await?;
        let now = Utc::now().timestamp();
        let (cookie, max_age) = collect_cookies(response.headers());

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        if body.status.as_deref() != Some("ok") {
            return Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                message: body.message.unwrap_or_else(|| "login failed".to_string()),
            });
        }
        if cookie.is_empty() {
            return Err(ClientError::InvalidResponse(
                "login succeeded without a session cookie".to_string(),
            ));
        }

        let mut settings = SessionState::new();
        settings.insert(DEVICE_ID_KEY, device_id);
        settings.insert(UUID_KEY, uuid);
        settings.insert(USER_AGENT_KEY, self.user_agent.clone());
        settings.insert(COOKIE_KEY, SettingValue::Bytes(cookie.into_bytes()));
        settings.insert(COOKIE_EXPIRY_KEY, cookie_expiry(now, max_age));
        settings.insert(CREATED_TS_KEY, now);
        self.settings = settings;

        if let Some(observer) = request.on_login {
            observer.on_login(&self.settings).await?;
        }

        debug!("Login complete");
        Ok(())
    }
}

#[async_trait]
impl ActivityClient for HttpActivityClient {
    async fn authenticate(&mut self, request: AuthRequest<'_>) -> Result<(), ClientError> {
        match request.cached_settings {
            Some(settings) => {
                self.settings = settings;
                self.validate_cached_session()?;
                debug!("Resumed cached session");
                Ok(())
            }
            None => self.login(request).await,
        }
    }

    #[instrument(skip(self))]
    async fn lookup_user_id(&self, username: &str) -> Result<UserId, ClientError> {
        let url = self.usernameinfo_url(username)?;
        let body = self.get_json(url).await?;
        let info: UsernameInfoResponse = serde_json::from_value(body)?;

        let id = match &info.user.pk {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        id.map(UserId).ok_or_else(|| {
            ClientError::InvalidResponse(format!("unexpected user pk: {}", info.user.pk))
        })
    }

    #[instrument(skip(self))]
    async fn fetch_activity_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<ActivityPage, ClientError> {
        let mut url = self.endpoint(NEWS_ENDPOINT)?;
        if let Some(max_id) = cursor {
            url.query_pairs_mut().append_pair("max_id", max_id);
        }

        let body = self.get_json(url).await?;
        let news: NewsResponse = serde_json::from_value(body)?;
        Ok(news.into_page())
    }

    fn settings(&self) -> SessionState {
        self.settings.clone()
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn map_transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Http(format!("Request timed out: {err}"))
    } else if err.is_connect() {
        ClientError::Http(format!("Connection failed: {err}"))
    } else {
        ClientError::Http(err.to_string())
    }
}

/// Passes successful responses through and classifies the rest.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

    let err = classify_error(status, body, retry_after);
    warn!(status = status.as_u16(), error = %err, "API request failed");
    Err(err)
}

fn classify_error(status: StatusCode, body: ErrorBody, retry_after: Option<u64>) -> ClientError {
    let message = body
        .message
        .clone()
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ClientError::RateLimited { retry_after };
    }
    if status == StatusCode::UNAUTHORIZED || body.message.as_deref() == Some("login_required") {
        return ClientError::SessionExpired(message);
    }
    if body
        .error_type
        .as_deref()
        .is_some_and(|t| CREDENTIAL_ERROR_TYPES.contains(&t))
    {
        return ClientError::LoginRejected(message);
    }

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Absolute expiry for a cookie issued at `now`.
fn cookie_expiry(now: i64, max_age: Option<i64>) -> i64 {
    now.saturating_add(max_age.unwrap_or(DEFAULT_COOKIE_LIFETIME_SECS))
}

/// Joins `Set-Cookie` headers into a `Cookie` header value.
///
/// Returns the header and the smallest positive `Max-Age` seen. Cookies
/// being cleared (empty value or `Max-Age=0`) are skipped.
fn collect_cookies(headers: &HeaderMap) -> (String, Option<i64>) {
    let mut pairs = Vec::new();
    let mut min_age: Option<i64> = None;

    for raw in headers.get_all(SET_COOKIE) {
        let Ok(raw) = raw.to_str() else { continue };
        let mut parts = raw.split(';').map(str::trim);
        let Some(pair) = parts.next() else { continue };
        let Some((name, value)) = pair.split_once('=') else { continue };

        let max_age = parts
            .filter_map(|attr| attr.split_once('='))
            .find(|(k, _)| k.eq_ignore_ascii_case("max-age"))
            .and_then(|(_, v)| v.trim().parse::<i64>().ok());

        if value.is_empty() || value == "\"\"" || max_age.is_some_and(|age| age <= 0) {
            continue;
        }
        if let Some(age) = max_age {
            min_age = Some(min_age.map_or(age, |m| m.min(age)));
        }
        pairs.push(format!("{}={}", name.trim(), value));
    }

    (pairs.join("; "), min_age)
}

// ============================================================================
// Tests
// ============================================================================
