//! HTTP transport boundary.
//!
//! The middleware only needs "send this request, give me status and body". [`Transport`] is that
//! seam; [`StaticTransport`] answers from an in-memory route table, and `GlooTransport` (feature
//! `gloo`) uses the browser fetch API.
use crate::{Method, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Value of the header called `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON. An empty body is `null`.
    pub fn parse_json(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body)
    }
}

/// Performs HTTP requests.
///
/// Transport failures (DNS, refused connections, ...) are errors; any HTTP status, including
/// 4xx and 5xx, is a response.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Transport answering from a fixed route table, recording every request.
///
/// Requests without a route fail like an unreachable host would.
#[derive(Debug, Default)]
pub struct StaticTransport {
    routes: RefCell<BTreeMap<(Method, String), HttpResponse>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method url` with `status` and a JSON body.
    pub fn reply(&self, method: Method, url: impl Into<String>, status: u16, body: Value) -> &Self {
        self.routes
            .borrow_mut()
            .insert((method, url.into()), HttpResponse::json(status, &body));
        self
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for StaticTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        let route = (request.method, request.url);
        match self.routes.borrow().get(&route) {
            Some(response) => Ok(response.clone()),
            None => Err(TransportError::Network(format!(
                "request to {} failed, reason: no route for {} {}",
                route.1, route.0, route.1
            ))),
        }
    }
}

#[cfg(feature = "gloo")]
mod gloo_impl {
    use super::*;
    use gloo_net::http::Request;

    /// Browser fetch transport.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct GlooTransport;

    #[async_trait(?Send)]
    impl Transport for GlooTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut builder = match request.method {
                Method::Get => Request::get(&request.url),
                Method::Post => Request::post(&request.url),
                Method::Put => Request::put(&request.url),
                Method::Delete => Request::delete(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            let prepared = match request.body {
                Some(body) => builder.body(body),
                None => builder.build(),
            }
            .map_err(|error| TransportError::InvalidRequest(error.to_string()))?;
            let response = prepared
                .send()
                .await
                .map_err(|error| TransportError::Network(error.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|error| TransportError::Network(error.to_string()))?;
            Ok(HttpResponse { status, body })
        }
    }
}

#[cfg(feature = "gloo")]
pub use gloo_impl::GlooTransport;

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn request(method: Method, url: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: url.into(),
            headers: vec![("Authorization".into(), "Bearer abc".into())],
            body: None,
        }
    }

    #[test]
    fn routes_answer_and_requests_are_recorded() {
        let transport = StaticTransport::new();
        transport.reply(Method::Get, "http://localhost/weather", 200, json!({"weather": "sun"}));
        let sent = transport.send(request(Method::Get, "http://localhost/weather"));
        let response = block_on(sent).unwrap();
        assert!(response.ok());
        assert_eq!(response.parse_json().unwrap(), json!({"weather": "sun"}));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(transport.requests()[0].header("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn unknown_route_is_a_network_error() {
        let transport = StaticTransport::new();
        let sent = transport.send(request(Method::Post, "http://localhost/x"));
        let error = block_on(sent).unwrap_err();
        assert_eq!(
            error.to_string(),
            "request to http://localhost/x failed, reason: no route for POST http://localhost/x"
        );
    }

    #[test]
    fn status_classes() {
        assert!(HttpResponse::new(204, "").ok());
        assert_eq!(HttpResponse::new(204, "").parse_json().unwrap(), Value::Null);
        assert!(!HttpResponse::new(404, "{}").ok());
        assert!(!HttpResponse::new(302, "").ok());
        assert!(HttpResponse::new(500, "<html>").parse_json().is_err());
    }

    #[test]
    fn shared_transport() {
        let transport = Rc::new(StaticTransport::new());
        transport.reply(Method::Delete, "u", 200, json!(null));
        let response = block_on(Transport::send(&transport, request(Method::Delete, "u"))).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.requests().len(), 1);
    }
}
