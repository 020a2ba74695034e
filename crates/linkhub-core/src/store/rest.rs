//! REST link store
//!
//! Talks to a PostgREST-style table endpoint (`{base}/rest/v1/links`), the
//! API exposed by hosted Postgres backends. Rows are filtered with
//! `column=eq.value` query parameters and mutations ask for the affected
//! rows back, so an update or delete that matched nothing is reported as
//! `NotFoundOrForbidden` instead of succeeding silently.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::LinkStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{Link, LinkPatch, NewLink, OwnerId};

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 15;

/// Table path below the base URL
const TABLE_PATH: &str = "rest/v1/links";

/// Link store backed by a hosted REST table
#[derive(Debug, Clone)]
pub struct RestLinkStore {
    client: Client,
    table_url: Url,
}

/// Insert payload: the new link's fields plus its owner
#[derive(Serialize)]
struct InsertRow<'a> {
    #[serde(flatten)]
    fields: &'a NewLink,
    user_id: &'a OwnerId,
}

impl RestLinkStore {
    /// Create a store for the project at `base_url`
    ///
    /// `api_key` identifies the project. Requests are authorized with
    /// `access_token` when given, otherwise with the api key itself.
    pub fn new(base_url: &str, api_key: &str, access_token: Option<&str>) -> StoreResult<Self> {
        let table_url = table_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(api_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", access_token.unwrap_or(api_key)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(concat!("linkhub/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self { client, table_url })
    }

    /// The table endpoint this store talks to
    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn list_url(&self, owner: &OwnerId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("user_id", &eq(owner.as_str()))
            .append_pair("order", "created_at.desc");
        url
    }

    fn row_url(&self, id: Uuid, owner: &OwnerId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &eq(&id.to_string()))
            .append_pair("user_id", &eq(owner.as_str()));
        url
    }

    fn insert_url(&self) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("select", "*");
        url
    }

    async fn send_for_rows(&self, request: RequestBuilder) -> StoreResult<Vec<Link>> {
        let response = request
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json::<Vec<Link>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LinkStore for RestLinkStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> StoreResult<Vec<Link>> {
        let links = self
            .send_for_rows(self.client.get(self.list_url(owner)))
            .await?;
        debug!("Fetched {} links for {}", links.len(), owner);
        Ok(links)
    }

    async fn insert(&self, owner: &OwnerId, fields: &NewLink) -> StoreResult<Link> {
        let body = [InsertRow {
            fields,
            user_id: owner,
        }];
        let rows = self
            .send_for_rows(self.client.post(self.insert_url()).json(&body))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        owner: &OwnerId,
        patch: &LinkPatch,
    ) -> StoreResult<Link> {
        let rows = self
            .send_for_rows(self.client.patch(self.row_url(id, owner)).json(patch))
            .await?;

        first_affected(rows, id)
    }

    async fn delete_by_id(&self, id: Uuid, owner: &OwnerId) -> StoreResult<()> {
        let rows = self
            .send_for_rows(self.client.delete(self.row_url(id, owner)))
            .await?;

        first_affected(rows, id).map(|_| ())
    }
}

/// The row a scoped mutation touched
///
/// No row back means the id is absent or owned by someone else; the two
/// are reported the same way.
fn first_affected(rows: Vec<Link>, id: Uuid) -> StoreResult<Link> {
    rows.into_iter()
        .next()
        .ok_or(StoreError::NotFoundOrForbidden { id })
}

/// Build the table endpoint from a project base URL
fn table_url(base_url: &str) -> StoreResult<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(TABLE_PATH))
        .map_err(|e| StoreError::Transport(format!("Invalid REST URL {}: {}", base_url, e)))
}

fn header_value(value: &str) -> StoreResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| StoreError::Unauthorized("credentials contain invalid characters".to_string()))
}

/// An equality filter operand
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Turn a non-success response into the matching `StoreError`
async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error = classify(status, &body);
    warn!("Link store request failed with {}: {}", status, error);
    Err(error)
}

/// Map an error status and body to a `StoreError`
///
/// Bodies are PostgREST error objects: `{"code", "message", ...}` where
/// `code` is a PostgreSQL SQLSTATE. Class 23 is an integrity violation.
fn classify(status: StatusCode, body: &str) -> StoreError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    let message = field("message").unwrap_or_else(|| body.to_string());
    let code = field("code").unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized(message),
        StatusCode::CONFLICT => StoreError::Constraint(message),
        _ if code.starts_with("23") => StoreError::Constraint(message),
        _ => StoreError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}
