//! CRUD client for the partsbay marketplace REST API.
//!
//! Presents the uniform list/get/create/update/delete contract the storefront
//! and back-office screens are written against, hiding endpoint mapping,
//! bearer auth and response normalization. Multi-record operations fan out
//! one request per id and join on all of them: the first rejection fails the
//! whole call and already-completed requests are not compensated.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart;
use serde::Deserialize;
use serde_json::Value;

use partsbay_core::session::{
    SessionCredentials, SessionStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, ROLE_KEY, USERNAME_KEY,
};

use crate::error::{extract_message, ConnectError, Result};
use crate::resources::endpoint_path;
use crate::types::{
    DraftField, ListPage, ListQuery, RawListBody, Record, RecordDraft, RecordId, Role,
};

/// Fallback API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "PARTSBAY_API_URL";
/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Resolve the API base URL from the environment, trimmed of trailing
/// slashes, falling back to [`DEFAULT_API_URL`].
pub fn api_base_url() -> String {
    std::env::var(API_URL_ENV)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Client for the marketplace REST API.
///
/// Holds no mutable state of its own; session credentials live in the
/// injected [`SessionStore`] and are read before every outgoing request.
#[derive(Debug, Clone)]
pub struct PartsbayClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl PartsbayClient {
    /// Create a client against an explicit base URL.
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Create a client from [`api_base_url`].
    pub fn from_env(session: Arc<dyn SessionStore>) -> Self {
        Self::new(&api_base_url(), session)
    }

    /// Headers for an outgoing request. The bearer token is attached when one
    /// is stored, absent otherwise.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.session.get(ACCESS_TOKEN_KEY) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ConnectError::auth("stored access token is not a valid header value"))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint_path(resource))
    }

    fn record_url(&self, resource: &str, id: &RecordId) -> String {
        format!("{}{}/", self.resource_url(resource), id)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Read the response body, mapping non-2xx statuses to
    /// [`ConnectError::Api`] with the extracted backend message.
    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);
        if !status.is_success() {
            return Err(ConnectError::api(status.as_u16(), extract_message(&body)));
        }
        Ok(body)
    }

    async fn parse_record(response: reqwest::Response) -> Result<Record> {
        let body = Self::read_body(response).await?;
        let value: Value = serde_json::from_str(&body)?;
        Record::from_value(value)
    }

    async fn parse_list(response: reqwest::Response) -> Result<ListPage> {
        let body = Self::read_body(response).await?;
        let raw: RawListBody = serde_json::from_str(&body)?;
        raw.normalize()
    }

    /// Attach headers and the draft body, JSON or multipart per the draft's
    /// declared fields, and send.
    async fn send_draft(
        &self,
        request: reqwest::RequestBuilder,
        draft: &RecordDraft,
    ) -> Result<reqwest::Response> {
        let request = request.headers(self.headers()?);
        let request = if draft.has_file() {
            request.multipart(Self::multipart_form(draft)?)
        } else {
            request.json(&draft.to_json())
        };
        Ok(request.send().await?)
    }

    fn multipart_form(draft: &RecordDraft) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for (name, field) in draft.fields() {
            form = match field {
                DraftField::Json(value) => {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    form.text(name.clone(), text)
                }
                DraftField::File(upload) => {
                    let part = multipart::Part::bytes(upload.bytes.clone())
                        .file_name(upload.file_name.clone())
                        .mime_str(&upload.content_type)
                        .map_err(|_| {
                            ConnectError::invalid_record(format!(
                                "invalid MIME type for field `{name}`"
                            ))
                        })?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication & Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in with username/password credentials.
    ///
    /// On success the access and refresh tokens, the role claim (when issued)
    /// and the username are written to the session store. On a non-2xx
    /// response nothing is stored.
    ///
    /// POST /api/token/
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionCredentials> {
        let url = format!("{}/api/token/", self.base_url);
        debug!("Logging in as {}", username);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);
        if !status.is_success() {
            return Err(ConnectError::auth(extract_message(&body)));
        }

        let credentials: SessionCredentials = serde_json::from_str(&body)?;
        self.session.set(ACCESS_TOKEN_KEY, &credentials.access);
        self.session.set(REFRESH_TOKEN_KEY, &credentials.refresh);
        if let Some(role) = &credentials.role {
            self.session.set(ROLE_KEY, role);
        }
        let stored_username = credentials.username.as_deref().unwrap_or(username);
        self.session.set(USERNAME_KEY, stored_username);
        Ok(credentials)
    }

    /// Clear the stored session. No network call is made; the backend keeps
    /// the refresh token until it expires.
    pub fn logout(&self) {
        self.session.clear();
    }

    /// True when an access token is stored. Local check only; expiry is the
    /// backend's concern.
    pub fn check_auth(&self) -> bool {
        self.session.get(ACCESS_TOKEN_KEY).is_some()
    }

    /// Role stored at login, if any.
    pub fn current_role(&self) -> Option<Role> {
        self.session.get(ROLE_KEY).map(|raw| Role::parse(&raw))
    }

    /// Exchange the stored refresh token for a new access token and store it.
    ///
    /// Refresh is always explicit; no operation triggers it implicitly.
    ///
    /// POST /api/token/refresh/
    pub async fn refresh_session(&self) -> Result<String> {
        let refresh = self
            .session
            .get(REFRESH_TOKEN_KEY)
            .ok_or_else(|| ConnectError::auth("no refresh token stored"))?;
        let url = format!("{}/api/token/refresh/", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);
        if !status.is_success() {
            return Err(ConnectError::auth(extract_message(&body)));
        }

        #[derive(Deserialize)]
        struct RefreshBody {
            access: String,
        }
        let parsed: RefreshBody = serde_json::from_str(&body)?;
        self.session.set(ACCESS_TOKEN_KEY, &parsed.access);
        Ok(parsed.access)
    }

    /// Create a customer account. Public endpoint; works without a session.
    ///
    /// POST /api/register/
    pub async fn register(&self, draft: &RecordDraft) -> Result<Record> {
        let url = format!("{}/api/register/", self.base_url);
        let response = self.send_draft(self.client.post(&url), draft).await?;
        Self::parse_record(response).await
    }

    /// Fetch the authenticated user's own record.
    ///
    /// GET /api/profile/
    pub async fn profile(&self) -> Result<Record> {
        let url = format!("{}/api/profile/", self.base_url);
        let response = self.client.get(&url).headers(self.headers()?).send().await?;
        Self::parse_record(response).await
    }

    /// Update the authenticated user's own record. Same body selection rule
    /// as [`create`](Self::create).
    ///
    /// PATCH /api/profile/
    pub async fn update_profile(&self, draft: &RecordDraft) -> Result<Record> {
        let url = format!("{}/api/profile/", self.base_url);
        let response = self.send_draft(self.client.patch(&url), draft).await?;
        Self::parse_record(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // CRUD
    // ─────────────────────────────────────────────────────────────────────────

    /// List records with pagination, sorting and filtering.
    ///
    /// GET /api/{resource}?page=&page_size=&ordering=&{filters}
    pub async fn get_list(&self, resource: &str, query: &ListQuery) -> Result<ListPage> {
        let url = self.resource_url(resource);
        let params = query.to_params();

        let mut request = self.client.get(&url).headers(self.headers()?);
        if !params.is_empty() {
            request = request.query(&params);
        }
        let response = request.send().await?;
        Self::parse_list(response).await
    }

    /// Fetch a single record.
    ///
    /// GET /api/{resource}/{id}/
    pub async fn get_one(&self, resource: &str, id: &RecordId) -> Result<Record> {
        let url = self.record_url(resource, id);
        let response = self.client.get(&url).headers(self.headers()?).send().await?;
        Self::parse_record(response).await
    }

    /// Fetch several records by id, one request per id, concurrently.
    ///
    /// Results come back in input order regardless of completion order; a
    /// single failure fails the whole call.
    pub async fn get_many(&self, resource: &str, ids: &[RecordId]) -> Result<Vec<Record>> {
        try_join_all(ids.iter().map(|id| self.get_one(resource, id))).await
    }

    /// List records referencing another record: `{target}={target_id}` is
    /// merged into the query's filter.
    ///
    /// GET /api/{resource}?{target}={target_id}
    pub async fn get_many_reference(
        &self,
        resource: &str,
        target: &str,
        target_id: &RecordId,
        query: &ListQuery,
    ) -> Result<ListPage> {
        let mut query = query.clone();
        query.filter.insert(target.to_string(), target_id.to_value());
        self.get_list(resource, &query).await
    }

    /// Create a record. The body is multipart iff the draft carries a file
    /// field, JSON otherwise.
    ///
    /// POST /api/{resource}/
    pub async fn create(&self, resource: &str, draft: &RecordDraft) -> Result<Record> {
        let url = self.resource_url(resource);
        let response = self.send_draft(self.client.post(&url), draft).await?;
        Self::parse_record(response).await
    }

    /// Apply a partial update. Same body selection rule as
    /// [`create`](Self::create).
    ///
    /// PATCH /api/{resource}/{id}/
    pub async fn update(
        &self,
        resource: &str,
        id: &RecordId,
        draft: &RecordDraft,
    ) -> Result<Record> {
        let url = self.record_url(resource, id);
        let response = self.send_draft(self.client.patch(&url), draft).await?;
        Self::parse_record(response).await
    }

    /// Apply the same partial update to several records, concurrently.
    /// Fail-fast; completed updates are not rolled back.
    pub async fn update_many(
        &self,
        resource: &str,
        ids: &[RecordId],
        draft: &RecordDraft,
    ) -> Result<Vec<RecordId>> {
        try_join_all(ids.iter().map(|id| self.update(resource, id, draft))).await?;
        Ok(ids.to_vec())
    }

    /// Delete a record. Any response body is discarded; the deleted id is
    /// returned.
    ///
    /// DELETE /api/{resource}/{id}/
    pub async fn delete(&self, resource: &str, id: &RecordId) -> Result<RecordId> {
        let url = self.record_url(resource, id);
        let response = self
            .client
            .delete(&url)
            .headers(self.headers()?)
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(id.clone())
    }

    /// Delete several records, one request per id, concurrently.
    ///
    /// Fail-fast with no partial-failure reporting: when one delete is
    /// rejected the caller cannot tell which of the others already landed on
    /// the backend.
    pub async fn delete_many(&self, resource: &str, ids: &[RecordId]) -> Result<Vec<RecordId>> {
        try_join_all(ids.iter().map(|id| self.delete(resource, id))).await
    }
}
