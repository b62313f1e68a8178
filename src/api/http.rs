use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::api::{AdminApi, AdminUser, ApiError, ApiResult, PartyList, Post};
use crate::config::AppConfig;

/// Reqwest-backed `AdminApi`. The trait is synchronous, so each call is
/// driven to completion on a current-thread runtime owned by the client.
/// Requests carry cookies (the backend session) and, once an admin is
/// known, an `X-Admin-Id` header.
pub struct HttpApi {
    base_url: String,
    admin_id: Option<String>,
    client: Client,
    runtime: Runtime,
}

impl HttpApi {
    pub fn new(config: &AppConfig) -> ApiResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self {
            base_url: config.api_base.clone(),
            admin_id: None,
            client,
            runtime,
        })
    }

    pub fn set_admin_id(&mut self, admin_id: i64) {
        self.admin_id = Some(admin_id.to_string());
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.admin_id {
            Some(id) => request.header("X-Admin-Id", id),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = self
            .runtime
            .block_on(self.decorate(request).send())
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(http_error(status, self.read_body(response)));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        match self.read_body(response) {
            Some(body) => Ok(body),
            None => Ok(Value::Null),
        }
    }

    fn read_body(&self, response: Response) -> Option<Value> {
        self.runtime.block_on(response.json::<Value>()).ok()
    }

    fn get_array<T: serde::de::DeserializeOwned>(&self, path: String, what: &str) -> ApiResult<Vec<T>> {
        let body = self.send(self.client.get(&path))?;
        if !body.is_array() {
            return Err(ApiError::Malformed(format!("{what} payload is not an array")));
        }
        serde_json::from_value(body).map_err(|err| ApiError::Malformed(err.to_string()))
    }
}

fn http_error(status: StatusCode, body: Option<Value>) -> ApiError {
    let message = body
        .as_ref()
        .and_then(|value| value.get("message"))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    ApiError::Http {
        status: status.as_u16(),
        message,
    }
}

impl AdminApi for HttpApi {
    fn login(&self, email: &str, password: &str) -> ApiResult<AdminUser> {
        debug!(email, "logging in");
        let body = self.send(
            self.client
                .post(self.url("/admin/login"))
                .json(&json!({ "email": email, "password": password })),
        )?;
        let user = body
            .get("user")
            .cloned()
            .ok_or_else(|| ApiError::Malformed("login response missing user".into()))?;
        serde_json::from_value(user).map_err(|err| ApiError::Malformed(err.to_string()))
    }

    fn fetch_posts(&self) -> ApiResult<Vec<Post>> {
        self.get_array(self.url("/admin/posts"), "posts")
    }

    fn approve_post(&self, post_id: i64) -> ApiResult<()> {
        self.send(self.client.post(self.url(&format!("/admin/posts/{post_id}/approve"))))?;
        Ok(())
    }

    fn reject_post(&self, post_id: i64, admin_notes: &str) -> ApiResult<()> {
        self.send(
            self.client
                .post(self.url(&format!("/admin/posts/{post_id}/reject")))
                .json(&json!({ "admin_notes": admin_notes })),
        )?;
        Ok(())
    }

    fn search_party_lists(&self, query: &str) -> ApiResult<Vec<PartyList>> {
        let body = self.send(
            self.client
                .get(self.url("/admin/partylists/search"))
                .query(&[("q", query)]),
        )?;
        if !body.is_array() {
            return Err(ApiError::Malformed("party list payload is not an array".into()));
        }
        serde_json::from_value(body).map_err(|err| ApiError::Malformed(err.to_string()))
    }

    fn add_party_list_member(&self, list_id: i64, post_id: i64) -> ApiResult<()> {
        self.send(
            self.client
                .post(self.url(&format!("/admin/partylists/{list_id}/members")))
                .json(&json!({ "post_id": post_id })),
        )?;
        Ok(())
    }

    fn create_party_list(&self, name: &str, post_id: i64, platform: &[String]) -> ApiResult<()> {
        self.send(
            self.client
                .post(self.url("/admin/partylists"))
                .json(&json!({ "name": name, "post_id": post_id, "platform": platform })),
        )?;
        Ok(())
    }
}
