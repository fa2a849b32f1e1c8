use {
    std::collections::HashMap,
    serde::{Serialize, Deserialize},
    serde_json::{Map, Value},
    thiserror::Error,
};

/// The event that triggered one handler invocation. The counter handler does
/// not look inside it, but the hosting adapter fills it in from the incoming
/// request so the contract stays honest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(with = "http_serde::method")]
    pub method: http::Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl InvocationEvent {
    pub fn new() -> Self {
        Self {
            method: http::Method::GET,
            path: "/".to_owned(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_method(mut self, method: http::Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

impl Default for InvocationEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-invocation metadata handed to the handler alongside the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationContext {
    pub request_id: Option<String>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self {
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// The structured response every invocation produces: an http-style status,
/// a flat header map and a body string carrying the json-encoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HandlerResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// A record stored in a table: a json document keyed by its `id` field.
/// Numeric fields keep whatever precision the store gave them; converting to
/// a plain integer is the reader's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

pub const FIELD_ID: &str = "id";

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record does not have a string `{FIELD_ID}` field")]
    MissingId,
}

impl Record {
    pub fn new() -> Self {
        Self {
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn id(&self) -> Result<&str, RecordError> {
        self.fields.get(FIELD_ID)
            .and_then(|v| v.as_str())
            .ok_or(RecordError::MissingId)
    }
}
