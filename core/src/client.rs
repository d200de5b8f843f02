//! HTTP client for the WordPress REST API.
//!
//! # Design
//! `WordPressClient` holds only a base URL, the fixed JSON headers and a
//! `Transport`; it carries no mutable state between calls. Every operation is
//! split into a `build_*` step that produces an `HttpRequest`, the transport
//! round-trip, and a parse step that validates the status and decodes JSON.
//! Any failure along the way leaves as a normalized `ApiError`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{normalize_error, validate_http_response, ApiError, Failure};
use crate::http::{header_value, HttpMethod, HttpRequest, HttpResponse};
use crate::query::QueryParams;
use crate::transport::{Transport, UreqTransport};

/// A decoded body together with the raw response headers.
#[derive(Debug, Clone, PartialEq)]
pub struct WithHeaders<T> {
    pub data: T,
    pub headers: Vec<(String, String)>,
}

impl<T> WithHeaders<T> {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}

#[derive(Debug, Clone)]
pub struct WordPressClient<T = UreqTransport> {
    base_url: String,
    headers: Vec<(String, String)>,
    transport: T,
}

impl WordPressClient<UreqTransport> {
    /// Client backed by a fresh `UreqTransport`.
    pub fn with_default_transport(base_url: &str) -> Self {
        Self::new(base_url, UreqTransport::new())
    }
}

impl<T: Transport> WordPressClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET request for `{base}{path}` with `params` appended to the query
    /// string. List values are comma-joined and null values are skipped.
    pub fn build_get(&self, path: &str, params: &QueryParams) -> Result<HttpRequest, ApiError> {
        let mut url = self.endpoint(path)?;
        let pairs = params.to_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: self.headers.clone(),
            body: None,
        })
    }

    /// POST request for `{base}{path}` carrying `body` as JSON.
    pub fn build_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint(path)?;
        let body = serde_json::to_string(body)
            .map_err(|e| normalize_error(Failure::Other(format!("serializing request body: {e}"))))?;

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: self.headers.clone(),
            body: Some(body),
        })
    }

    /// Validate the status and decode the JSON body.
    pub fn parse_json<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, ApiError> {
        let response = validate_http_response(response)?;
        decode(&response)
    }

    pub fn get<R: DeserializeOwned>(&self, path: &str, params: &QueryParams) -> Result<R, ApiError> {
        let request = self.build_get(path, params)?;
        let response = self.send(&request)?;
        decode(&response)
    }

    pub fn post<R, B>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.build_post(path, body)?;
        let response = self.send(&request)?;
        decode(&response)
    }

    /// Like `get`, but keeps the response headers, which is where WordPress
    /// puts pagination totals.
    pub fn get_with_headers<R: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<WithHeaders<R>, ApiError> {
        let request = self.build_get(path, params)?;
        let response = self.send(&request)?;
        let data = decode(&response)?;
        Ok(WithHeaders {
            data,
            headers: response.headers,
        })
    }

    /// Whether `/posts?per_page=1` answers successfully. Never fails; the
    /// reason for an unhealthy result is logged.
    pub fn health_check(&self) -> bool {
        let params = QueryParams::new().with("per_page", 1u32);
        match self.get::<serde_json::Value>("/posts", &params) {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(
                    code = %err.code,
                    status = err.status,
                    message = %err.message,
                    "WordPress API health check failed"
                );
                false
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw)
            .map_err(|e| normalize_error(Failure::Other(format!("invalid URL {raw:?}: {e}"))))
    }

    /// Execute the request and reject non-2xx responses.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request)
            .map_err(|e| normalize_error(e.into()))?;
        validate_http_response(response)
    }
}

fn decode<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ApiError> {
    serde_json::from_str(&response.body)
        .map_err(|e| normalize_error(Failure::Other(format!("decoding response body: {e}"))))
}
