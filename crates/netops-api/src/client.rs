// Async HTTP client for a PostgREST-style REST surface.
//
// Base path: /rest/v1/
// Auth: `apikey` header plus `Authorization: Bearer <token>`

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::query::Query;
use crate::transport::TransportConfig;
use crate::Error;

const PREFER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";
const COUNT_EXACT: &str = "count=exact";
const PREVIEW_CHARS: usize = 200;

/// Postgres SQLSTATE for insufficient privilege.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for table-scoped CRUD against the hosted database.
///
/// Every call targets `/rest/v1/<table>` and is shaped by a [`Query`].
/// Writes ask for `return=representation` so callers see the affected
/// rows, which is how conditional updates detect a lost race.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from the project API key and an optional user access token.
    ///
    /// The API key always travels in the `apikey` header. The bearer
    /// token is the user's access token when present, else the API key.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        access_token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", sensitive(api_key.expose_secret())?);

        let bearer = access_token.unwrap_or(api_key).expose_secret();
        headers.insert(AUTHORIZATION, sensitive(&format!("Bearer {bearer}"))?);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// Ensure the base URL points at `/rest/v1/`, with a trailing slash.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/rest/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/rest/v1/"));
        }

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(table)?)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch every row matching `query`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, Error> {
        let url = self.table_url(table)?;
        let params = query.to_params();
        debug!("GET {url} params={params:?}");

        let resp = self.send(self.http.get(url).query(&params)).await?;
        self.handle_response(resp).await
    }

    /// Fetch the first row matching `query`, if any.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Option<T>, Error> {
        let rows: Vec<T> = self.select(table, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Exact row count for `query`, read from the `Content-Range` header.
    pub async fn count(&self, table: &str, query: &Query) -> Result<u64, Error> {
        let url = self.table_url(table)?;
        let mut params = query.to_params();
        params.retain(|(k, _)| k != "select" && k != "order" && k != "limit");
        params.insert(0, ("select".to_owned(), "id".to_owned()));
        debug!("HEAD {url} params={params:?}");

        let resp = self
            .send(self.http.head(url).query(&params).header(PREFER, COUNT_EXACT))
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let header = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        parse_content_range(header)
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert one row (or an array of rows) and return what was stored.
    pub async fn insert<T, B>(&self, table: &str, body: &B) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.table_url(table)?;
        debug!("POST {url}");

        let resp = self
            .send(
                self.http
                    .post(url)
                    .header(PREFER, RETURN_REPRESENTATION)
                    .json(body),
            )
            .await?;
        self.handle_response(resp).await
    }

    /// Patch every row matching `query`; returns the rows actually changed.
    ///
    /// An empty result means no row matched, which for a conditional
    /// update is the signal that the precondition failed.
    pub async fn update<T, B>(&self, table: &str, query: &Query, body: &B) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        if !query.has_filters() {
            return Err(Error::UnfilteredWrite {
                verb: "PATCH",
                table: table.to_owned(),
            });
        }
        let url = self.table_url(table)?;
        let params = query.to_params();
        debug!("PATCH {url} params={params:?}");

        let resp = self
            .send(
                self.http
                    .patch(url)
                    .query(&params)
                    .header(PREFER, RETURN_REPRESENTATION)
                    .json(body),
            )
            .await?;
        self.handle_response(resp).await
    }

    /// Delete every row matching `query`; returns the removed rows.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, Error> {
        if !query.has_filters() {
            return Err(Error::UnfilteredWrite {
                verb: "DELETE",
                table: table.to_owned(),
            });
        }
        let url = self.table_url(table)?;
        let params = query.to_params();
        debug!("DELETE {url} params={params:?}");

        let resp = self
            .send(
                self.http
                    .delete(url)
                    .query(&params)
                    .header(PREFER, RETURN_REPRESENTATION),
            )
            .await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                Error::Transport(e)
            }
        })
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(PREVIEW_CHARS).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();

        let message = parsed
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.clone()
                }
            });
        let code = parsed.as_ref().and_then(|e| e.code.clone());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication { message };
        }
        if status == reqwest::StatusCode::FORBIDDEN
            || code.as_deref() == Some(INSUFFICIENT_PRIVILEGE)
        {
            return Error::PermissionDenied { message };
        }

        let details = parsed.as_ref().and_then(|e| e.details.clone());
        if status == reqwest::StatusCode::CONFLICT
            || code.as_deref().is_some_and(|c| c.starts_with("23"))
        {
            return Error::Constraint {
                message,
                code,
                details,
            };
        }

        Error::Api {
            status: status.as_u16(),
            message,
            code,
            details,
            hint: parsed.and_then(|e| e.hint),
        }
    }
}

fn sensitive(value: &str) -> Result<HeaderValue, Error> {
    let mut header = HeaderValue::from_str(value).map_err(|e| Error::Authentication {
        message: format!("invalid credential header value: {e}"),
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Parse the total from `Content-Range: 0-9/42` or `*/42`.
fn parse_content_range(header: &str) -> Result<u64, Error> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.parse().ok())
        .ok_or_else(|| Error::ContentRange(header.to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range("0-9/42").unwrap(), 42);
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
        assert!(parse_content_range("*/*").is_err());
        assert!(parse_content_range("").is_err());
    }

    #[test]
    fn base_url_gains_rest_prefix() {
        let url = RestClient::normalize_base_url("https://db.example.com").unwrap();
        assert_eq!(url.as_str(), "https://db.example.com/rest/v1/");

        let url = RestClient::normalize_base_url("https://db.example.com/rest/v1").unwrap();
        assert_eq!(url.as_str(), "https://db.example.com/rest/v1/");
    }
}
