use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::input_file::InputFile;
use crate::params::{Param, Params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    /// Retrieval verbs carry their parameters on the query string.
    pub fn uses_query(self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

/// Body serialization policy, selected by the request's `content-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Multipart,
    /// No body: parameters go on the query string.
    None,
}

impl ContentType {
    pub const JSON: &'static str = "application/json";
    pub const MULTIPART: &'static str = "multipart/form-data";

    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return ContentType::None;
        };
        let essence = value.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(Self::JSON) {
            ContentType::Json
        } else if essence.eq_ignore_ascii_case(Self::MULTIPART) {
            ContentType::Multipart
        } else {
            ContentType::None
        }
    }
}

/// One logical API call: verb, path template, headers and parameters.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub path_params: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub params: Params,
    /// Headers rejected by [`Request::header`], reported when the call is built.
    pub(crate) invalid_headers: Vec<String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_params: Vec::new(),
            headers: HeaderMap::new(),
            params: Params::new(),
            invalid_headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path).json()
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path).json()
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path).json()
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path).json()
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path).json()
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::Head, path)
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.path_params.push((name.into(), value.to_string()));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, Param::Value(value.into()));
        self
    }

    pub fn file(mut self, key: impl Into<String>, file: InputFile) -> Self {
        self.params.insert(key, Param::File(file));
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Adds a header. An invalid name or value fails the call with
    /// `Error::Programming` when it is built.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => self.invalid_headers.push(name.to_string()),
        }
        self
    }

    pub fn json(self) -> Self {
        self.header("content-type", ContentType::JSON)
    }

    pub fn multipart(self) -> Self {
        self.header("content-type", ContentType::MULTIPART)
    }
}
