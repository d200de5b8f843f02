//! The network seam between `WordPressClient` and the outside world.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and hands back the raw
//! `HttpResponse`. Status interpretation stays in the client, so a transport
//! must return 4xx/5xx responses as data and only fail when no response was
//! received at all. Tests swap in scripted transports; production code uses
//! `UreqTransport`.

use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// The request never produced an HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Ureq(#[from] ureq::Error),

    #[error("{0}")]
    Other(String),
}

/// Executes HTTP requests on behalf of the client.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// The agent is configured with `http_status_as_error(false)` so non-2xx
/// responses come back as data rather than `Err`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
