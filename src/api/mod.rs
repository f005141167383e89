use crate::config::EnvConfig;
use crate::models::{AuthUser, NewTodo, Session, Todo, TodoPatch};
use crate::storage::{clear_session_storage, load_session_from_storage, save_session_to_storage};
use crate::util::now_secs;
use serde::{Deserialize, Serialize};

pub(crate) const TODOS_TABLE: &str = "todos";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: &str) -> Self {
        let kind = if matches!(status.as_u16(), 401 | 403) {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Http
        };
        Self {
            kind,
            message: backend_message(status.as_u16(), body),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Picks the human-readable message out of a GoTrue/PostgREST error body.
pub(crate) fn backend_message(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        let found = ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|m| m.as_str()))
            .filter(|m| !m.trim().is_empty());
        if let Some(m) = found {
            return m.to_string();
        }
    }

    if body.trim().is_empty() {
        format!("Request failed ({status})")
    } else {
        body.trim().to_string()
    }
}

/// Total row count from a PostgREST `Content-Range` header (`0-5/7`, `*/0`).
pub(crate) fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}

/// Outcome of asking the server about a stored session.
///
/// Only a server rejection drops it. When the server cannot be reached the
/// stored session is kept, so a flaky connection at load does not sign out.
pub(crate) fn reconcile_stored_session(stored: Session, check: ApiResult<AuthUser>) -> Option<Session> {
    match check {
        Ok(user) => Some(Session { user, ..stored }),
        Err(e) if e.kind == ApiErrorKind::Unauthorized => {
            log::info!("stored session rejected: {e}");
            None
        }
        Err(e) => {
            log::warn!("could not verify stored session ({:?}): {e}", e.kind);
            Some(stored)
        }
    }
}

/// Email/password auth plus session lookup.
#[allow(async_fn_in_trait)]
pub(crate) trait AuthBackend: Clone + 'static {
    async fn current_user(&self, access_token: &str) -> ApiResult<AuthUser>;

    async fn get_session(&self) -> Option<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> ApiResult<Session>;

    /// `Ok(None)` when the account still needs email confirmation.
    async fn sign_up(&self, email: &str, password: &str) -> ApiResult<Option<Session>>;

    async fn sign_out(&self, session: &Session) -> ApiResult<()>;
}

/// Row operations on the `todos` table, always scoped by the caller's session.
#[allow(async_fn_in_trait)]
pub(crate) trait TodoBackend: Clone + 'static {
    async fn count(&self, session: &Session) -> ApiResult<u64>;

    /// Newest first.
    async fn list_page(&self, session: &Session, offset: usize, limit: usize)
        -> ApiResult<Vec<Todo>>;

    async fn insert(&self, session: &Session, row: &NewTodo) -> ApiResult<()>;

    async fn update(&self, session: &Session, id: &str, patch: &TodoPatch) -> ApiResult<()>;

    async fn delete(&self, session: &Session, id: &str) -> ApiResult<()>;
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PasswordRequest {
    pub email: String,
    pub password: String,
}

/// GoTrue token grant response.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl TokenResponse {
    pub fn into_session(self, now_secs: i64) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now_secs + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Signup returns a full token grant when auto-confirm is on, otherwise just
/// the pending user.
pub(crate) fn parse_signup_response(data: serde_json::Value, now_secs: i64) -> ApiResult<Option<Session>> {
    if data.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(data).map_err(ApiError::parse)?;
        Ok(Some(token.into_session(now_secs)))
    } else {
        Ok(None)
    }
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
}

impl ApiClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self { base_url, anon_key }
    }

    pub fn from_env(config: &EnvConfig) -> Self {
        Self::new(config.supabase_url.clone(), config.supabase_anon_key.clone())
    }

    fn with_auth_headers(
        &self,
        mut req: reqwest::RequestBuilder,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        req = req.header("apikey", &self.anon_key);
        if let Some(token) = access_token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    pub(crate) fn todos_url(&self, query: &str) -> String {
        format!("{}/rest/v1/{}?{}", self.base_url, TODOS_TABLE, query)
    }

    pub(crate) fn list_query(user_id: &str, offset: usize, limit: usize) -> String {
        format!(
            "select=*&user_id=eq.{}&order=created_at.desc&offset={}&limit={}",
            urlencoding::encode(user_id),
            offset,
            limit
        )
    }

    pub(crate) fn id_query(id: &str) -> String {
        format!("id=eq.{}", urlencoding::encode(id))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body))
        }
    }

    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        self.send(req).await?.json().await.map_err(ApiError::parse)
    }

    async fn request_empty(&self, req: reqwest::RequestBuilder) -> ApiResult<()> {
        self.send(req).await.map(|_| ())
    }
}

impl AuthBackend for ApiClient {
    async fn current_user(&self, access_token: &str) -> ApiResult<AuthUser> {
        let client = reqwest::Client::new();
        let req = self.with_auth_headers(
            client.get(format!("{}/auth/v1/user", self.base_url)),
            Some(access_token),
        );
        self.request_json(req).await
    }

    async fn get_session(&self) -> Option<Session> {
        let stored = load_session_from_storage()?;
        if stored.is_expired_at(now_secs()) {
            log::info!("stored session expired");
            clear_session_storage();
            return None;
        }

        let check = self.current_user(&stored.access_token).await;
        let session = reconcile_stored_session(stored, check);
        if session.is_none() {
            clear_session_storage();
        }
        session
    }

    async fn sign_in(&self, email: &str, password: &str) -> ApiResult<Session> {
        let client = reqwest::Client::new();
        let req = self
            .with_auth_headers(
                client.post(format!("{}/auth/v1/token?grant_type=password", self.base_url)),
                None,
            )
            .json(&PasswordRequest {
                email: email.to_string(),
                password: password.to_string(),
            });

        let token: TokenResponse = self.request_json(req).await?;
        let session = token.into_session(now_secs());
        save_session_to_storage(&session);
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> ApiResult<Option<Session>> {
        let client = reqwest::Client::new();
        let req = self
            .with_auth_headers(client.post(format!("{}/auth/v1/signup", self.base_url)), None)
            .json(&PasswordRequest {
                email: email.to_string(),
                password: password.to_string(),
            });

        let data: serde_json::Value = self.request_json(req).await?;
        let session = parse_signup_response(data, now_secs())?;
        if let Some(s) = &session {
            save_session_to_storage(s);
        }
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> ApiResult<()> {
        clear_session_storage();
        let client = reqwest::Client::new();
        let req = self.with_auth_headers(
            client.post(format!("{}/auth/v1/logout", self.base_url)),
            Some(&session.access_token),
        );
        self.request_empty(req).await
    }
}

impl TodoBackend for ApiClient {
    async fn count(&self, session: &Session) -> ApiResult<u64> {
        let client = reqwest::Client::new();
        let url = self.todos_url(&format!(
            "select=id&user_id=eq.{}",
            urlencoding::encode(session.user_id())
        ));
        let req = self
            .with_auth_headers(client.head(url), Some(&session.access_token))
            .header("Prefer", "count=exact");

        let res = self.send(req).await?;
        let header = res
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        parse_content_range_total(&header)
            .ok_or_else(|| ApiError::parse(format!("Unexpected Content-Range: {header:?}")))
    }

    async fn list_page(
        &self,
        session: &Session,
        offset: usize,
        limit: usize,
    ) -> ApiResult<Vec<Todo>> {
        let client = reqwest::Client::new();
        let url = self.todos_url(&Self::list_query(session.user_id(), offset, limit));
        let req = self.with_auth_headers(client.get(url), Some(&session.access_token));
        self.request_json(req).await
    }

    async fn insert(&self, session: &Session, row: &NewTodo) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let req = self
            .with_auth_headers(
                client.post(format!("{}/rest/v1/{}", self.base_url, TODOS_TABLE)),
                Some(&session.access_token),
            )
            .header("Prefer", "return=minimal")
            .json(row);
        self.request_empty(req).await
    }

    async fn update(&self, session: &Session, id: &str, patch: &TodoPatch) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let req = self
            .with_auth_headers(
                client.patch(self.todos_url(&Self::id_query(id))),
                Some(&session.access_token),
            )
            .header("Prefer", "return=minimal")
            .json(patch);
        self.request_empty(req).await
    }

    async fn delete(&self, session: &Session, id: &str) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let req = self.with_auth_headers(
            client.delete(self.todos_url(&Self::id_query(id))),
            Some(&session.access_token),
        );
        self.request_empty(req).await
    }
}
