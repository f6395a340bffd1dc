use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Source {
    Path(PathBuf),
    Bytes(Bytes),
}

/// A file-valued request parameter.
///
/// Path-backed files are opened per read, so no chunk outlives the request
/// that carries it.
#[derive(Debug, Clone)]
pub struct InputFile {
    filename: String,
    mime_type: Option<String>,
    size: u64,
    source: Source,
}

impl InputFile {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        Ok(Self {
            filename,
            mime_type: None,
            size,
            source: Source::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            filename: filename.into(),
            mime_type: None,
            size: data.len() as u64,
            source: Source::Bytes(data),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn read_all(&self) -> Result<Bytes> {
        self.read_range(0, self.size).await
    }

    /// Reads the half-open byte range `[start, end)`.
    pub async fn read_range(&self, start: u64, end: u64) -> Result<Bytes> {
        if start > end || end > self.size {
            return Err(Error::Programming(format!(
                "byte range {start}..{end} is outside of `{}` ({} bytes)",
                self.filename, self.size
            )));
        }

        match &self.source {
            Source::Bytes(data) => Ok(data.slice(start as usize..end as usize)),
            Source::Path(path) => {
                let mut file = tokio::fs::File::open(path).await?;
                file.seek(SeekFrom::Start(start)).await?;
                let mut buffer = vec![0u8; (end - start) as usize];
                file.read_exact(&mut buffer).await?;
                Ok(Bytes::from(buffer))
            }
        }
    }

    /// A copy of this file restricted to `[start, end)`, used as a chunk part.
    pub async fn slice(&self, start: u64, end: u64) -> Result<InputFile> {
        let data = self.read_range(start, end).await?;
        Ok(Self {
            filename: self.filename.clone(),
            mime_type: self.mime_type.clone(),
            size: data.len() as u64,
            source: Source::Bytes(data),
        })
    }
}
