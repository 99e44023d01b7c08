// OPNsense API HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction, basic-auth key/secret
// injection, and status/body classification. Endpoint groups (traffic shaper,
// interfaces) are implemented as inherent methods in separate modules so this
// file stays focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

/// Body of a non-2xx OPNsense response, e.g. a blocked delete:
/// `{"errorTitle": "...", "errorMessage": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default, rename = "errorTitle")]
    pub title: Option<String>,
    #[serde(default, rename = "errorMessage")]
    pub message: Option<String>,
}

/// API key + secret pair, sent as HTTP basic auth.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: SecretString,
}

/// Status and body of a completed request, before classification.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: reqwest::StatusCode,
    pub body: String,
}

impl RawResponse {
    /// Decode a 2xx body as JSON, or classify the failure status.
    pub fn into_json(self) -> Result<Value, Error> {
        if self.status == reqwest::StatusCode::UNAUTHORIZED
            || self.status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("API key rejected (HTTP {})", self.status.as_u16()),
            });
        }

        if !self.status.is_success() {
            return Err(Error::Http {
                status: self.status.as_u16(),
                message: self.error_message(),
            });
        }

        parse_json(&self.body)
    }

    /// Best-effort human message for a failed response.
    pub fn error_message(&self) -> String {
        let parsed: ErrorResponse = serde_json::from_str(&self.body).unwrap_or_default();
        match (parsed.title, parsed.message) {
            (_, Some(message)) => message,
            (Some(title), None) => title,
            (None, None) if self.body.is_empty() => self.status.to_string(),
            (None, None) => preview(&self.body).to_owned(),
        }
    }
}

/// Parse a body as JSON, keeping the raw text on failure.
pub(crate) fn parse_json(body: &str) -> Result<Value, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the OPNsense REST API.
///
/// Every endpoint lives under `{base}/api/{module}/{controller}/{command}`,
/// optionally followed by one identifier segment. Cheap to clone: the inner
/// `reqwest::Client` is reference-counted.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<ApiCredentials>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a firewall URL, credentials, and transport config.
    ///
    /// `base_url` is the firewall root (e.g. `https://10.0.0.1`); the
    /// `/api/` prefix is appended unless already present.
    pub fn new(
        base_url: &str,
        credentials: Option<ApiCredentials>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, credentials)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Option<ApiCredentials>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// The normalized API root, always ending in `/api/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/api/{module}/{controller}/{command}[/{id}]`.
    ///
    /// The identifier is pushed as a single percent-encoded segment, so an
    /// opaque id can never escape into another path.
    pub(crate) fn endpoint(
        &self,
        module: &str,
        controller: &str,
        command: &str,
        id: Option<&str>,
    ) -> Url {
        let mut url = self.base_url.clone();
        // base_url was checked to be a base URL at construction.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([module, controller, command]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(creds) => builder.basic_auth(&creds.key, Some(creds.secret.expose_secret())),
            None => builder,
        }
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<RawResponse, Error> {
        let resp = self.authorize(builder).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }

    /// Send a GET request.
    pub(crate) async fn get_raw(&self, url: Url) -> Result<RawResponse, Error> {
        debug!("GET {url}");
        self.execute(self.http.get(url)).await
    }

    /// Send a POST request with a JSON body.
    pub(crate) async fn post_raw(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<RawResponse, Error> {
        debug!("POST {url}");
        self.execute(self.http.post(url).json(body)).await
    }

    /// GET and decode a 2xx JSON body.
    pub(crate) async fn get_json(&self, url: Url) -> Result<Value, Error> {
        self.get_raw(url).await?.into_json()
    }

    /// POST and decode a 2xx JSON body.
    pub(crate) async fn post_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Value, Error> {
        self.post_raw(url, body).await?.into_json()
    }
}
