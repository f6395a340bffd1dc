use bytes::Bytes;

use crate::client::Client;
use crate::enums::{ImageFormat, ImageGravity};
use crate::error::Result;
use crate::input_file::InputFile;
use crate::models::{Bucket, BucketList, File, FileList};
use crate::request::Request;
use crate::upload::ChunkedUpload;

const FILES_PATH: &str = "/storage/buckets/{bucketId}/files";
const FILE_PATH: &str = "/storage/buckets/{bucketId}/files/{fileId}";

#[derive(Debug, Clone)]
pub struct Storage {
    client: Client,
}

/// Transformations applied by [`Storage::get_file_preview`].
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub gravity: Option<ImageGravity>,
    pub quality: Option<u32>,
    pub border_width: Option<u32>,
    pub border_color: Option<String>,
    pub border_radius: Option<u32>,
    pub opacity: Option<f64>,
    pub rotation: Option<i32>,
    pub background: Option<String>,
    pub output: Option<ImageFormat>,
}

impl Storage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn list_buckets(
        &self,
        queries: Option<Vec<String>>,
        search: Option<&str>,
    ) -> Result<BucketList> {
        let request = Request::get("/storage/buckets")
            .param("queries", queries)
            .param("search", search);
        self.client.call_json(request).await
    }

    pub async fn get_bucket(&self, bucket_id: &str) -> Result<Bucket> {
        let request = Request::get("/storage/buckets/{bucketId}").path_param("bucketId", bucket_id);
        self.client.call_json(request).await
    }

    pub async fn list_files(
        &self,
        bucket_id: &str,
        queries: Option<Vec<String>>,
        search: Option<&str>,
    ) -> Result<FileList> {
        let request = Request::get(FILES_PATH)
            .path_param("bucketId", bucket_id)
            .param("queries", queries)
            .param("search", search);
        self.client.call_json(request).await
    }

    pub async fn get_file(&self, bucket_id: &str, file_id: &str) -> Result<File> {
        self.client
            .call_json(Self::file_request(Request::get(FILE_PATH), bucket_id, file_id))
            .await
    }

    /// Prepares an upload of `file` into `bucket_id`.
    ///
    /// Files above the client's chunk size are sent in chunks. When `file_id`
    /// names an existing partial upload, chunks the server already holds are
    /// skipped.
    pub fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
        permissions: Option<Vec<String>>,
    ) -> ChunkedUpload {
        let request = Request::post(FILES_PATH)
            .multipart()
            .path_param("bucketId", bucket_id)
            .param("fileId", file_id)
            .file("file", file)
            .param("permissions", permissions);
        let probe = Self::file_request(Request::get(FILE_PATH), bucket_id, file_id);

        self.client.chunked_upload(request).resume(file_id, probe)
    }

    pub async fn update_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        name: Option<&str>,
        permissions: Option<Vec<String>>,
    ) -> Result<File> {
        let request = Self::file_request(Request::put(FILE_PATH), bucket_id, file_id)
            .param("name", name)
            .param("permissions", permissions);
        self.client.call_json(request).await
    }

    pub async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        self.client
            .call(Self::file_request(Request::delete(FILE_PATH), bucket_id, file_id))
            .await
            .map(|_| ())
    }

    pub async fn get_file_download(&self, bucket_id: &str, file_id: &str) -> Result<Bytes> {
        let request = Request::get(format!("{FILE_PATH}/download"));
        self.client
            .call_bytes(Self::file_request(request, bucket_id, file_id))
            .await
    }

    pub async fn get_file_view(&self, bucket_id: &str, file_id: &str) -> Result<Bytes> {
        let request = Request::get(format!("{FILE_PATH}/view"));
        self.client
            .call_bytes(Self::file_request(request, bucket_id, file_id))
            .await
    }

    /// Image preview. Non-image files return a file-type icon.
    pub async fn get_file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: PreviewOptions,
    ) -> Result<Bytes> {
        let request = Self::file_request(Request::get(format!("{FILE_PATH}/preview")), bucket_id, file_id)
            .param("width", options.width)
            .param("height", options.height)
            .param("gravity", options.gravity)
            .param("quality", options.quality)
            .param("borderWidth", options.border_width)
            .param("borderColor", options.border_color)
            .param("borderRadius", options.border_radius)
            .param("opacity", options.opacity)
            .param("rotation", options.rotation)
            .param("background", options.background)
            .param("output", options.output);
        self.client.call_bytes(request).await
    }

    fn file_request(request: Request, bucket_id: &str, file_id: &str) -> Request {
        request
            .path_param("bucketId", bucket_id)
            .path_param("fileId", file_id)
    }
}
