//! Resumable chunked uploads.
//!
//! Files larger than one chunk are sent as a sequence of requests carrying
//! the full parameter set, each with the next byte range of the file and a
//! `content-range` header. Chunks are strictly sequential: chunk n+1 is read
//! only after chunk n's response has been observed.

use futures::{StreamExt, stream::BoxStream};
use serde_json::Value;
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::params::Param;
use crate::request::Request;
use crate::rest_types::ChunkResponse;

/// Placeholder id asking the server to generate one.
pub const UNIQUE_ID: &str = "unique()";
/// Header naming the resource that follow-up chunks belong to.
pub const ID_HEADER: &str = "x-appwrite-id";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadProgress {
    /// Server-assigned resource id, empty until the first chunk is accepted.
    pub id: String,
    /// Percentage, rounded.
    pub progress: u8,
    pub size_uploaded: u64,
    pub size_total: u64,
    pub chunks_total: u64,
    pub chunks_uploaded: u64,
}

impl UploadProgress {
    fn new(size_total: u64, chunk_size: u64) -> Self {
        Self {
            size_total,
            chunks_total: size_total.div_ceil(chunk_size),
            ..Self::default()
        }
    }

    fn advance(&mut self, size_uploaded: u64, chunk_size: u64) {
        self.size_uploaded = size_uploaded;
        self.chunks_uploaded = size_uploaded.div_ceil(chunk_size);
        self.progress = if self.size_total == 0 {
            100
        } else {
            ((size_uploaded as f64 / self.size_total as f64) * 100.0).round() as u8
        };
    }
}

#[derive(Debug)]
pub enum UploadEvent {
    Progress(UploadProgress),
    Complete(Value),
}

#[derive(Debug, Clone)]
struct Resume {
    id: String,
    probe: Request,
}

/// A prepared upload. Each call to [`ChunkedUpload::stream`] starts a fresh run.
#[derive(Debug, Clone)]
pub struct ChunkedUpload {
    client: Client,
    request: Request,
    chunk_size: u64,
    resume: Option<Resume>,
}

impl ChunkedUpload {
    pub(crate) fn new(client: Client, request: Request) -> Self {
        let chunk_size = client.chunk_size();
        Self {
            client,
            request,
            chunk_size,
            resume: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Resume an earlier upload of `id`. `probe` fetches the partially
    /// uploaded resource so already-accepted chunks are skipped.
    /// The `unique()` placeholder never resumes.
    pub fn resume(mut self, id: impl Into<String>, probe: Request) -> Self {
        let id = id.into();
        self.resume = (id != UNIQUE_ID).then_some(Resume { id, probe });
        self
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn stream(&self) -> BoxStream<'static, Result<UploadEvent>> {
        let client = self.client.clone();
        let request = self.request.clone();
        let chunk_size = self.chunk_size;
        let resume = self.resume.clone();

        let stream = async_stream::try_stream! {
            if chunk_size == 0 {
                Err(Error::Programming("chunk size must be greater than zero".to_string()))?;
            }

            let (file_key, file) = match request.params.file() {
                Some((key, file)) => (key.to_string(), file.clone()),
                None => Err(Error::Programming("upload request has no file parameter".to_string()))?,
            };
            let size = file.size();

            if size <= chunk_size {
                debug!(size, "Uploading in a single request");
                let body = client.call(request).await?.into_json()?;
                yield UploadEvent::Complete(body);
                return;
            }

            let mut progress = UploadProgress::new(size, chunk_size);
            let mut offset = 0u64;
            let mut id: Option<String> = None;
            let mut last: Option<Value> = None;

            if let Some(resume) = resume {
                match client.call(resume.probe).await.and_then(|b| b.into_json()) {
                    Ok(value) => {
                        let existing: ChunkResponse =
                            serde_json::from_value(value.clone()).unwrap_or_default();
                        if let Some(chunks) = existing.chunks_uploaded {
                            offset = chunks.saturating_mul(chunk_size).min(size);
                        }
                        id = Some(existing.id.unwrap_or(resume.id));
                        last = Some(value);
                    }
                    Err(Error::Api(e)) if e.status == 404 => {
                        id = Some(resume.id);
                    }
                    Err(e) => Err(e)?,
                }

                if offset > 0 {
                    debug!(offset, size, "Resuming upload");
                    progress.id = id.clone().unwrap_or_default();
                    progress.advance(offset, chunk_size);
                }
            }

            while offset < size {
                let end = (offset + chunk_size).min(size);

                let chunk = match file.slice(offset, end).await {
                    Ok(chunk) => chunk,
                    Err(e) => Err(Error::Upload { progress: progress.clone(), source: Box::new(e) })?,
                };

                let mut chunk_request = request
                    .clone()
                    .header("content-range", &format!("bytes {}-{}/{}", offset, end - 1, size));
                chunk_request.params.insert(file_key.clone(), Param::File(chunk));
                if let Some(id) = &id {
                    chunk_request = chunk_request.header(ID_HEADER, id);
                }

                debug!(start = offset, end = end - 1, size, "Uploading chunk");
                let value = match client.call(chunk_request).await.and_then(|b| b.into_json()) {
                    Ok(value) => value,
                    Err(e) => Err(Error::Upload { progress: progress.clone(), source: Box::new(e) })?,
                };

                let accepted: ChunkResponse =
                    serde_json::from_value(value.clone()).unwrap_or_default();
                if let Some(new_id) = accepted.id {
                    id = Some(new_id);
                }

                offset = end;
                progress.id = id.clone().unwrap_or_default();
                progress.advance(offset, chunk_size);
                last = Some(value);

                yield UploadEvent::Progress(progress.clone());
            }

            yield UploadEvent::Complete(last.unwrap_or(Value::Null));
        };

        Box::pin(stream)
    }

    /// Runs the upload to completion and returns the final response body.
    pub async fn finish(&self) -> Result<Value> {
        self.finish_with(|_| {}).await
    }

    /// Like [`finish`](Self::finish), reporting each accepted chunk to `on_progress`.
    pub async fn finish_with<F>(&self, mut on_progress: F) -> Result<Value>
    where
        F: FnMut(&UploadProgress),
    {
        let mut stream = self.stream();
        while let Some(event) = stream.next().await {
            match event? {
                UploadEvent::Progress(progress) => on_progress(&progress),
                UploadEvent::Complete(body) => return Ok(body),
            }
        }
        Err(Error::Programming(
            "upload stream ended without a final response".to_string(),
        ))
    }
}
