use std::{fmt, sync::Arc};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::{AppwriteError, Error, Result};
use crate::params::{self, Param};
use crate::request::{ContentType, Request};
use crate::rest_types::ErrorBody;
use crate::services::{Avatars, Graphql, Health, Locale, Storage};
use crate::transport::{
    FormField, FormValue, HttpTransport, ReqwestTransport, RequestBody, TransportRequest,
    TransportResponse,
};
use crate::upload::ChunkedUpload;

const MEGABYTE: u64 = 1024 * 1024; // 1MB
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * MEGABYTE;
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

const SDK_NAME: &str = "Rust";
const SDK_PLATFORM: &str = "server";
const SDK_LANGUAGE: &str = "rust";
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
const RESPONSE_FORMAT: &str = "1.5.0";

/// A decoded 2xx/3xx response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Bytes(Bytes),
    /// 204, 304 or an empty body.
    Empty,
}

impl ResponseBody {
    pub fn into_json(self) -> Result<Value> {
        match self {
            ResponseBody::Json(value) => Ok(value),
            ResponseBody::Bytes(bytes) => Ok(serde_json::from_slice(&bytes)?),
            ResponseBody::Empty => Ok(Value::Null),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
            ResponseBody::Bytes(bytes) => bytes,
            ResponseBody::Empty => Bytes::new(),
        }
    }
}

/// Shared request client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    endpoint: Url,
    headers: HeaderMap,
    invalid_headers: Vec<String>,
    chunk_size: u64,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint.as_str())
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        let endpoint = Url::parse(DEFAULT_ENDPOINT).expect("Default endpoint is a valid URL");
        Self::new(endpoint)
    }
}

impl Client {
    pub fn new(endpoint: Url) -> Self {
        let client = Self {
            endpoint,
            headers: HeaderMap::new(),
            invalid_headers: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            transport: Arc::new(ReqwestTransport::default()),
        };

        let user_agent = format!(
            "AppwriteRustSDK/{SDK_VERSION} ({}; {})",
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        client
            .with_header(USER_AGENT.as_str(), &user_agent)
            .with_header("x-sdk-name", SDK_NAME)
            .with_header("x-sdk-platform", SDK_PLATFORM)
            .with_header("x-sdk-language", SDK_LANGUAGE)
            .with_header("x-sdk-version", SDK_VERSION)
            .with_header("X-Appwrite-Response-Format", RESPONSE_FORMAT)
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_project(self, project_id: &str) -> Self {
        self.with_header("X-Appwrite-Project", project_id)
    }

    pub fn with_key(self, api_key: &str) -> Self {
        self.with_header("X-Appwrite-Key", api_key)
    }

    pub fn with_jwt(self, jwt: &str) -> Self {
        self.with_header("X-Appwrite-JWT", jwt)
    }

    pub fn with_locale(self, locale: &str) -> Self {
        self.with_header("X-Appwrite-Locale", locale)
    }

    pub fn with_session(self, session: &str) -> Self {
        self.with_header("X-Appwrite-Session", session)
    }

    pub fn with_forwarded_user_agent(self, user_agent: &str) -> Self {
        self.with_header("X-Appwrite-Forwarded-User-Agent", user_agent)
    }

    /// Sets a default header sent with every call. An invalid name or value
    /// makes every call fail with `Error::Programming`.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
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

    /// Accept self-signed TLS certificates (development servers).
    pub fn with_self_signed(mut self, self_signed: bool) -> Result<Self> {
        self.transport = Arc::new(ReqwestTransport::new(self_signed)?);
        Ok(self)
    }

    pub fn with_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn health(&self) -> Health {
        Health::new(self.clone())
    }

    pub fn avatars(&self) -> Avatars {
        Avatars::new(self.clone())
    }

    pub fn storage(&self) -> Storage {
        Storage::new(self.clone())
    }

    pub fn locale(&self) -> Locale {
        Locale::new(self.clone())
    }

    pub fn graphql(&self) -> Graphql {
        Graphql::new(self.clone())
    }

    /// Renders a logical call into the exact request the transport will send.
    pub async fn build(&self, request: Request) -> Result<TransportRequest> {
        if let Some(name) = self.invalid_headers.iter().chain(&request.invalid_headers).next() {
            return Err(Error::Programming(format!("invalid value for header `{name}`")));
        }
        let path = params::render_path(&request.path, &request.path_params)?;
        let mut url = Url::parse(&format!(
            "{}{}",
            self.endpoint.as_str().trim_end_matches('/'),
            path
        ))
        .map_err(|e| Error::Programming(format!("invalid request URL for `{path}`: {e}")))?;

        let mut headers = self.headers.clone();
        for (name, value) in request.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let content_type =
            ContentType::from_header(headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()));

        let body = if request.method.uses_query() || content_type == ContentType::None {
            let pairs = request.params.to_pairs()?;
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
            RequestBody::Empty
        } else if content_type == ContentType::Json {
            RequestBody::Json(serde_json::to_string(&request.params.to_json()?)?)
        } else {
            // reqwest writes the boundary-bearing content-type itself.
            headers.remove(CONTENT_TYPE);
            let mut fields = Vec::with_capacity(request.params.len());
            for (key, param) in request.params.iter() {
                match param {
                    Param::Value(value) => {
                        let mut pairs = Vec::new();
                        params::flatten_into(key, value, &mut pairs);
                        fields.extend(pairs.into_iter().map(|(name, text)| FormField {
                            name,
                            value: FormValue::Text(text),
                        }));
                    }
                    Param::File(file) => fields.push(FormField {
                        name: key.to_string(),
                        value: FormValue::File {
                            filename: file.filename().to_string(),
                            mime_type: file.mime_type().map(str::to_string),
                            data: file.read_all().await?,
                        },
                    }),
                }
            }
            RequestBody::Multipart(fields)
        };

        Ok(TransportRequest {
            method: request.method,
            url,
            headers,
            body,
        })
    }

    /// Executes one call. Statuses of 400 and above become `Error::Api`.
    pub async fn call(&self, request: Request) -> Result<ResponseBody> {
        let request = self.build(request).await?;
        debug!(method = %request.method, url = %request.url, "Dispatching request");

        let response = self.transport.execute(request).await?;
        trace!(status = response.status, bytes = response.body.len(), "Received response");

        parse_response(response)
    }

    pub async fn call_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let value = self.call(request).await?.into_json()?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn call_bytes(&self, request: Request) -> Result<Bytes> {
        Ok(self.call(request).await?.into_bytes())
    }

    /// Prepares a resumable chunked upload of the file parameter in `request`.
    pub fn chunked_upload(&self, request: Request) -> ChunkedUpload {
        ChunkedUpload::new(self.clone(), request)
    }
}

fn parse_response(response: TransportResponse) -> Result<ResponseBody> {
    if response.status >= 400 {
        return Err(structured_error(&response).into());
    }

    if response.status == 204 || response.status == 304 || response.body.is_empty() {
        return Ok(ResponseBody::Empty);
    }

    if ContentType::from_header(response.content_type()) == ContentType::Json {
        Ok(ResponseBody::Json(serde_json::from_slice(&response.body)?))
    } else {
        Ok(ResponseBody::Bytes(response.body))
    }
}

fn default_message(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error");
    format!("Server responded with {status} {reason}")
}

pub(crate) fn structured_error(response: &TransportResponse) -> AppwriteError {
    let text = String::from_utf8_lossy(&response.body).into_owned();

    match ErrorBody::from_slice(&response.body) {
        Some(body) => AppwriteError {
            status: response.status,
            code: body.code.unwrap_or(response.status),
            error_type: body.error_type.unwrap_or_default(),
            message: body
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| default_message(response.status)),
            response: body.response.unwrap_or(text),
        },
        None => AppwriteError {
            status: response.status,
            code: response.status,
            error_type: String::new(),
            message: if text.trim().is_empty() {
                default_message(response.status)
            } else {
                text.clone()
            },
            response: text,
        },
    }
}
