//! HTTP call descriptions.
//!
//! A [`CallSpec`] is plain data describing one HTTP call. Call sites build it (usually through
//! [`get`], [`post`], [`put`] or [`delete`]), the middleware attaches a token when the call
//! requires authentication, and the transport turns it into a request.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::{fmt, rc::Rc};

/// Parameters used to compile templated paths.
pub type Params = Map<String, Value>;

/// HTTP method of a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path of a call, either fixed or computed from the call parameters.
#[derive(Clone)]
pub enum CallPath {
    Static(String),
    Template(Rc<dyn Fn(&Params) -> String>),
}

impl CallPath {
    pub fn template<F: Fn(&Params) -> String + 'static>(template: F) -> Self {
        CallPath::Template(Rc::new(template))
    }

    /// Produce the concrete path. Static paths ignore the parameters.
    pub fn compile(&self, params: Option<&Params>) -> String {
        match self {
            CallPath::Static(path) => path.clone(),
            CallPath::Template(template) => match params {
                Some(params) => template(params),
                None => template(&Params::new()),
            },
        }
    }
}

impl fmt::Debug for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallPath::Static(path) => f.debug_tuple("Static").field(path).finish(),
            CallPath::Template(_) => f.write_str("Template(..)"),
        }
    }
}

impl PartialEq for CallPath {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CallPath::Static(a), CallPath::Static(b)) => a == b,
            (CallPath::Template(a), CallPath::Template(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for CallPath {
    fn from(path: &str) -> Self {
        CallPath::Static(path.to_owned())
    }
}

impl From<String> for CallPath {
    fn from(path: String) -> Self {
        CallPath::Static(path)
    }
}

/// Description of one HTTP call.
///
/// Optional parts are `None` until supplied; they are skipped entirely when serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct CallSpec {
    pub method: Method,
    pub path: CallPath,
    pub url_params: Option<Params>,
    pub body: Option<Value>,
    pub requires_authentication: bool,
    pub token: Option<String>,
}

impl CallSpec {
    pub fn new(method: Method, path: impl Into<CallPath>) -> Self {
        Self {
            method,
            path: path.into(),
            url_params: None,
            body: None,
            requires_authentication: false,
            token: None,
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.url_params = Some(params);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Mark this call as requiring the bearer token from the application state.
    pub fn auth(mut self) -> Self {
        self.requires_authentication = true;
        self
    }

    /// The key this call fetches under: its compiled path.
    pub fn key(&self) -> String {
        self.path.compile(self.url_params.as_ref())
    }

    /// Request headers for this call.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        if self.method.has_body() {
            headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
            headers.push(("Accept".to_owned(), "application/json".to_owned()));
        }
        headers
    }

    /// JSON-encoded request body. Only `POST` and `PUT` carry one; a missing body is sent as `{}`.
    pub fn encoded_body(&self) -> Result<Option<String>, serde_json::Error> {
        if !self.method.has_body() {
            return Ok(None);
        }
        match &self.body {
            Some(body) => serde_json::to_string(body).map(Some),
            None => Ok(Some("{}".to_owned())),
        }
    }
}

pub fn get(path: impl Into<CallPath>) -> CallSpec {
    CallSpec::new(Method::Get, path)
}

pub fn post(path: impl Into<CallPath>, body: Value) -> CallSpec {
    CallSpec::new(Method::Post, path).with_body(body)
}

pub fn put(path: impl Into<CallPath>, body: Value) -> CallSpec {
    CallSpec::new(Method::Put, path).with_body(body)
}

pub fn delete(path: impl Into<CallPath>) -> CallSpec {
    CallSpec::new(Method::Delete, path)
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Serialized form of a call. Templated paths are written out compiled.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCall {
    method: Method,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url_params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    requires_authentication: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Serialize for CallSpec {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        WireCall {
            method: self.method,
            path: self.key(),
            url_params: self.url_params.clone(),
            body: self.body.clone(),
            requires_authentication: self.requires_authentication,
            token: self.token.clone(),
        }
        .serialize(serializer)
    }
}

impl CallSpec {
    /// JSON form of this call, as carried by a trigger's `dataApiCall`.
    pub fn to_wire(&self) -> Value {
        let mut object = Map::new();
        object.insert("method".into(), Value::String(self.method.as_str().into()));
        object.insert("path".into(), Value::String(self.key()));
        if let Some(params) = &self.url_params {
            object.insert("urlParams".into(), Value::Object(params.clone()));
        }
        if let Some(body) = &self.body {
            object.insert("body".into(), body.clone());
        }
        if self.requires_authentication {
            object.insert("requiresAuthentication".into(), Value::Bool(true));
        }
        if let Some(token) = &self.token {
            object.insert("token".into(), Value::String(token.clone()));
        }
        Value::Object(object)
    }
}

impl<'de> Deserialize<'de> for CallSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireCall::deserialize(deserializer)?;
        Ok(CallSpec {
            method: wire.method,
            path: CallPath::Static(wire.path),
            url_params: wire.url_params,
            body: wire.body,
            requires_authentication: wire.requires_authentication,
            token: wire.token,
        })
    }
}
