//! Normalized request/response shapes, independent of the transport.

use std::collections::HashMap;

use serde_json::{Map, Value};

use gradebook_core::{ApiError, ApiResult};

/// Body as handed over by the transport, before normalization.
#[derive(Debug, Clone, Default)]
pub enum RawBody {
    #[default]
    Absent,
    /// Raw text; parsed as JSON during normalization.
    Text(String),
    /// Already-structured value (in-process callers, tests).
    Json(Value),
}

/// Transport-level request input. The adapter fills this in; tests build it
/// directly.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub path: Option<String>,
    pub method: Option<String>,
    pub headers: HashMap<String, String>,
    /// "k=v" strings, one per cookie.
    pub cookies: Vec<String>,
    pub query: HashMap<String, String>,
    pub body: RawBody,
}

/// Immutable per-request snapshot handlers dispatch on.
#[derive(Debug, Clone)]
pub struct RequestContext {
    path: String,
    /// Path segments, each re-prefixed with '/'; `["/"]` for the root.
    path_parts: Vec<String>,
    method: String,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    query: HashMap<String, String>,
    body: Map<String, Value>,
}

impl RequestContext {
    /// Normalize transport input.
    ///
    /// A missing path or method is a transport-adapter bug and fails the
    /// request as internal, never as a client error.
    pub fn new(raw: RawRequest) -> ApiResult<Self> {
        let path = raw
            .path
            .ok_or_else(|| ApiError::internal("path not found in transport input"))?;
        let method = raw
            .method
            .ok_or_else(|| ApiError::internal("method not found in transport input"))?;

        let mut path_parts: Vec<String> = path
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| format!("/{part}"))
            .collect();
        if path_parts.is_empty() {
            path_parts.push("/".to_string());
        }

        // First '=' splits; entries without one are dropped silently.
        let mut cookies = HashMap::new();
        for entry in raw.cookies {
            if let Some((name, value)) = entry.split_once('=') {
                cookies.insert(name.to_string(), value.to_string());
            }
        }

        let body = match raw.body {
            RawBody::Absent => Map::new(),
            RawBody::Text(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                _ => {
                    let mut map = Map::new();
                    map.insert("message".to_string(), Value::String(text));
                    map
                }
            },
            RawBody::Json(Value::Object(map)) => map,
            RawBody::Json(Value::Null) => Map::new(),
            RawBody::Json(other) => {
                let mut map = Map::new();
                map.insert("message".to_string(), other);
                map
            }
        };

        Ok(Self {
            path,
            path_parts,
            method,
            headers: raw.headers,
            cookies,
            query: raw.query,
            body,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn path_parts(&self) -> &[String] {
        &self.path_parts
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Required body parameter, stringified the way it arrived (numbers
    /// become their decimal text, so `5` and `"5"` parse alike).
    pub fn body_param(&self, key: &str) -> ApiResult<String> {
        let value = self
            .body
            .get(key)
            .ok_or_else(|| ApiError::bad_request(format!("Missing {key} parameter")))?;
        Ok(stringify(value))
    }

    /// Optional body parameter, stringified as above.
    pub fn body_param_opt(&self, key: &str) -> Option<String> {
        self.body.get(key).map(stringify)
    }

    /// Required query parameter.
    pub fn require_query_param(&self, key: &str) -> ApiResult<&str> {
        self.query_param(key)
            .ok_or_else(|| ApiError::bad_request(format!("Missing {key} parameter")))
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Cookie to be set on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub max_age: Option<i64>,
    pub path: Option<String>,
    pub http_only: bool,
}

impl ResponseCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            path: None,
            http_only: true,
        }
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn to_header_value(&self) -> String {
        let mut s = format!("{}={}", self.name, self.value);
        if let Some(max_age) = self.max_age {
            s.push_str(&format!("; Max-Age={max_age}"));
        }
        if let Some(path) = &self.path {
            s.push_str(&format!("; Path={path}"));
        }
        if self.http_only {
            s.push_str("; HttpOnly");
        }
        s
    }
}

/// Mutable response accumulator handlers build up.
#[derive(Debug, Clone)]
pub struct ResponseObject {
    status: u16,
    body: Map<String, Value>,
    headers: HashMap<String, String>,
    cookies: Vec<ResponseCookie>,
    error: Option<String>,
}

impl Default for ResponseObject {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseObject {
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status: 200,
            body: Map::new(),
            headers,
            cookies: Vec::new(),
            error: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn add_body(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn add_cookie(mut self, cookie: ResponseCookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Record a failure message; mirrored into the body under "error".
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.body
            .insert("error".to_string(), Value::String(message.clone()));
        self.error = Some(message);
    }

    /// 302 with a Location header.
    pub fn redirect(self, url: impl Into<String>) -> Self {
        self.with_status(302).add_header("Location", url)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Rendered `Set-Cookie` header values.
    pub fn cookie_strings(&self) -> Vec<String> {
        self.cookies.iter().map(ResponseCookie::to_header_value).collect()
    }
}
