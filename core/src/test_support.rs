//! Scripted transport used by unit tests.

use std::sync::Mutex;

use url::Url;

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

enum Reply {
    Response(HttpResponse),
    Fail,
}

/// Answers requests by URL path suffix and records every request it sees.
/// Unscripted paths fail like an unreachable host.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Vec<(String, Reply)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: &str) -> Self {
        self.respond_with_headers(path, status, body, &[])
    }

    pub fn respond_with_headers(
        mut self,
        path: &str,
        status: u16,
        body: &str,
        headers: &[(&str, &str)],
    ) -> Self {
        let response = HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        };
        self.routes.push((path.to_string(), Reply::Response(response)));
        self
    }

    pub fn fail(mut self, path: &str) -> Self {
        self.routes.push((path.to_string(), Reply::Fail));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let path = Url::parse(&request.url)
            .map(|url| url.path().to_string())
            .unwrap_or_default();
        match self.routes.iter().find(|(route, _)| path.ends_with(route.as_str())) {
            Some((_, Reply::Response(response))) => Ok(response.clone()),
            Some((_, Reply::Fail)) | None => {
                Err(TransportError::Other(format!("connection refused: {path}")))
            }
        }
    }
}
