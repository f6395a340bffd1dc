//! Chunked upload behaviour observed through a recording transport.

use std::sync::{Arc, Mutex};

use appwrite::transport::{FormValue, RequestBody};
use appwrite::{
    Client, Error, HttpTransport, InputFile, Method, TransportError, TransportRequest,
    TransportResponse, UploadEvent,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use url::Url;

const SERVER_ID: &str = "srv-id";

/// Answers every chunk with a JSON file body and records what was sent.
#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<TransportRequest>>>,
    /// Zero-based index of the POST that answers 500.
    fail_at: Option<usize>,
    /// Body returned for GET requests; `None` answers 404.
    existing: Option<(u16, Value)>,
}

impl Recorder {
    fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    fn with_existing(status: u16, body: Value) -> Self {
        Self {
            existing: Some((status, body)),
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn posts(&self) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::Post)
            .collect()
    }
}

fn json_response(status: u16, body: Value) -> TransportResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    TransportResponse {
        status,
        headers,
        body: Bytes::from(body.to_string()),
    }
}

#[async_trait]
impl HttpTransport for Recorder {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = request.method;
        let post_index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.iter().filter(|r| r.method == Method::Post).count()
        };

        if method == Method::Get {
            return Ok(match &self.existing {
                Some((status, body)) => json_response(*status, body.clone()),
                None => json_response(
                    404,
                    json!({"message": "File not found", "code": 404, "type": "storage_file_not_found"}),
                ),
            });
        }

        if self.fail_at == Some(post_index - 1) {
            return Ok(json_response(
                500,
                json!({"message": "Disk full", "code": 500, "type": "general_unknown"}),
            ));
        }

        Ok(json_response(
            201,
            json!({"$id": SERVER_ID, "chunksUploaded": post_index, "name": "blob.bin"}),
        ))
    }
}

fn client(recorder: &Recorder, chunk_size: u64) -> Client {
    Client::new(Url::parse("http://appwrite.test/v1").unwrap())
        .with_project("console")
        .with_chunk_size(chunk_size)
        .with_transport(recorder.clone())
}

fn data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

fn content_range(request: &TransportRequest) -> Option<String> {
    request
        .headers
        .get("content-range")
        .map(|v| v.to_str().unwrap().to_string())
}

fn upload_id(request: &TransportRequest) -> Option<String> {
    request
        .headers
        .get("x-appwrite-id")
        .map(|v| v.to_str().unwrap().to_string())
}

fn file_part(request: &TransportRequest) -> Bytes {
    let RequestBody::Multipart(fields) = &request.body else {
        panic!("expected a multipart body");
    };
    fields
        .iter()
        .find_map(|field| match &field.value {
            FormValue::File { data, .. } if field.name == "file" => Some(data.clone()),
            _ => None,
        })
        .expect("no file part")
}

#[tokio::test]
async fn chunks_cover_the_file_in_order() {
    let recorder = Recorder::default();
    let content = data(23);
    let upload = client(&recorder, 5).storage().create_file(
        "bucket",
        "unique()",
        InputFile::from_bytes("blob.bin", content.clone()),
        None,
    );

    let mut events = upload.stream();
    let mut progress = Vec::new();
    let mut complete = None;
    while let Some(event) = events.next().await {
        match event.unwrap() {
            UploadEvent::Progress(p) => progress.push(p),
            UploadEvent::Complete(body) => complete = Some(body),
        }
    }

    let posts = recorder.posts();
    assert_eq!(posts.len(), 5);
    let ranges: Vec<_> = posts.iter().filter_map(content_range).collect();
    assert_eq!(
        ranges,
        vec![
            "bytes 0-4/23",
            "bytes 5-9/23",
            "bytes 10-14/23",
            "bytes 15-19/23",
            "bytes 20-22/23",
        ]
    );

    let sent: Vec<u8> = posts.iter().flat_map(|r| file_part(r).to_vec()).collect();
    assert_eq!(sent, content);

    let uploaded: Vec<u64> = progress.iter().map(|p| p.size_uploaded).collect();
    assert_eq!(uploaded, vec![5, 10, 15, 20, 23]);
    let last = progress.last().unwrap();
    assert_eq!(last.progress, 100);
    assert_eq!(last.chunks_total, 5);
    assert_eq!(last.chunks_uploaded, 5);
    assert_eq!(complete.unwrap()["$id"], SERVER_ID);
}

#[tokio::test]
async fn file_that_fits_goes_in_one_request() {
    let recorder = Recorder::default();
    let body = client(&recorder, 5)
        .storage()
        .create_file("bucket", "unique()", InputFile::from_bytes("small.txt", data(5)), None)
        .finish()
        .await
        .unwrap();

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(content_range(&requests[0]), None);
    assert_eq!(upload_id(&requests[0]), None);
    assert_eq!(file_part(&requests[0]).len(), 5);
    assert_eq!(body["$id"], SERVER_ID);
}

#[tokio::test]
async fn later_chunks_carry_the_server_id() {
    let recorder = Recorder::default();
    client(&recorder, 4)
        .storage()
        .create_file("bucket", "unique()", InputFile::from_bytes("a.bin", data(10)), None)
        .finish()
        .await
        .unwrap();

    let ids: Vec<_> = recorder.posts().iter().map(upload_id).collect();
    assert_eq!(
        ids,
        vec![None, Some(SERVER_ID.to_string()), Some(SERVER_ID.to_string())]
    );
}

#[tokio::test]
async fn every_chunk_repeats_the_other_parameters() {
    let recorder = Recorder::default();
    client(&recorder, 4)
        .storage()
        .create_file(
            "bucket",
            "unique()",
            InputFile::from_bytes("a.bin", data(10)),
            Some(vec!["read(\"any\")".to_string()]),
        )
        .finish()
        .await
        .unwrap();

    for post in recorder.posts() {
        assert_eq!(post.url.path(), "/v1/storage/buckets/bucket/files");
        let RequestBody::Multipart(fields) = &post.body else {
            panic!("expected a multipart body");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fileId", "file", "permissions[]"]);
    }
}

#[tokio::test]
async fn failed_chunk_reports_progress_so_far() {
    let recorder = Recorder::failing_at(2);
    let err = client(&recorder, 5)
        .storage()
        .create_file("bucket", "unique()", InputFile::from_bytes("a.bin", data(23)), None)
        .finish()
        .await
        .unwrap_err();

    let progress = err.upload_progress().expect("upload progress");
    assert_eq!(progress.size_uploaded, 10);
    assert_eq!(progress.chunks_uploaded, 2);
    assert_eq!(progress.id, SERVER_ID);
    assert_eq!(err.as_api().unwrap().code, 500);
    assert_eq!(err.as_api().unwrap().message, "Disk full");
    assert_eq!(recorder.posts().len(), 3);
}

#[tokio::test]
async fn resume_skips_chunks_the_server_holds() {
    let recorder = Recorder::with_existing(
        200,
        json!({"$id": "my-file", "chunksUploaded": 2, "chunksTotal": 5}),
    );
    let content = data(23);
    let mut seen = Vec::new();
    client(&recorder, 5)
        .storage()
        .create_file("bucket", "my-file", InputFile::from_bytes("a.bin", content.clone()), None)
        .finish_with(|p| seen.push(p.size_uploaded))
        .await
        .unwrap();

    let requests = recorder.requests();
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].url.path(), "/v1/storage/buckets/bucket/files/my-file");

    let posts = recorder.posts();
    let ranges: Vec<_> = posts.iter().filter_map(content_range).collect();
    assert_eq!(
        ranges,
        vec!["bytes 10-14/23", "bytes 15-19/23", "bytes 20-22/23"]
    );
    assert_eq!(upload_id(&posts[0]).as_deref(), Some("my-file"));
    assert_eq!(&file_part(&posts[0])[..], &content[10..15]);
    assert_eq!(seen, vec![15, 20, 23]);
}

#[tokio::test]
async fn missing_resource_starts_from_zero() {
    let recorder = Recorder::default();
    client(&recorder, 5)
        .storage()
        .create_file("bucket", "fresh", InputFile::from_bytes("a.bin", data(12)), None)
        .finish()
        .await
        .unwrap();

    let posts = recorder.posts();
    assert_eq!(recorder.requests().len(), 4);
    assert_eq!(content_range(&posts[0]).as_deref(), Some("bytes 0-4/12"));
    assert_eq!(upload_id(&posts[0]).as_deref(), Some("fresh"));
}

#[tokio::test]
async fn not_found_status_starts_fresh_whatever_the_body_code() {
    let recorder = Recorder::with_existing(404, json!({"message": "gone", "code": 0}));
    client(&recorder, 5)
        .storage()
        .create_file("bucket", "fresh", InputFile::from_bytes("a.bin", data(12)), None)
        .finish()
        .await
        .unwrap();

    let ranges: Vec<_> = recorder.posts().iter().filter_map(content_range).collect();
    assert_eq!(ranges, vec!["bytes 0-4/12", "bytes 5-9/12", "bytes 10-11/12"]);
}

#[tokio::test]
async fn not_found_body_code_on_another_status_is_an_error() {
    let recorder = Recorder::with_existing(400, json!({"message": "bad", "code": 404}));
    let err = client(&recorder, 5)
        .storage()
        .create_file("bucket", "mine", InputFile::from_bytes("a.bin", data(12)), None)
        .finish()
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Api(e) if e.status == 400 && e.code == 404));
    assert!(recorder.posts().is_empty());
}

#[tokio::test]
async fn complete_resource_is_not_uploaded_again() {
    let recorder = Recorder::with_existing(
        200,
        json!({"$id": "done", "chunksUploaded": 3, "chunksTotal": 3}),
    );
    let body = client(&recorder, 5)
        .storage()
        .create_file("bucket", "done", InputFile::from_bytes("a.bin", data(12)), None)
        .finish()
        .await
        .unwrap();

    assert!(recorder.posts().is_empty());
    assert_eq!(body["$id"], "done");
}

#[tokio::test]
async fn lookup_failure_other_than_not_found_is_returned() {
    let recorder = Recorder::with_existing(401, json!({"message": "Unauthorized", "code": 401}));
    let err = client(&recorder, 5)
        .storage()
        .create_file("bucket", "mine", InputFile::from_bytes("a.bin", data(12)), None)
        .finish()
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Api(e) if e.code == 401));
    assert!(recorder.posts().is_empty());
}

#[tokio::test]
async fn zero_chunk_size_is_rejected() {
    let recorder = Recorder::default();
    let err = client(&recorder, 0)
        .storage()
        .create_file("bucket", "unique()", InputFile::from_bytes("a.bin", data(3)), None)
        .finish()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Programming(_)));
    assert!(recorder.requests().is_empty());
}

#[tokio::test]
async fn concurrent_uploads_stay_sequential() {
    let first = Recorder::default();
    let second = Recorder::default();
    let a = client(&first, 3).storage().create_file(
        "bucket",
        "unique()",
        InputFile::from_bytes("a.bin", data(10)),
        None,
    );
    let b = client(&second, 4).storage().create_file(
        "bucket",
        "unique()",
        InputFile::from_bytes("b.bin", data(10)),
        None,
    );

    let (ra, rb) = tokio::join!(a.finish(), b.finish());
    ra.unwrap();
    rb.unwrap();

    let ranges_a: Vec<_> = first.posts().iter().filter_map(content_range).collect();
    let ranges_b: Vec<_> = second.posts().iter().filter_map(content_range).collect();
    assert_eq!(
        ranges_a,
        vec!["bytes 0-2/10", "bytes 3-5/10", "bytes 6-8/10", "bytes 9-9/10"]
    );
    assert_eq!(ranges_b, vec!["bytes 0-3/10", "bytes 4-7/10", "bytes 8-9/10"]);
}

#[tokio::test]
async fn uploads_sharing_a_client_stay_sequential() {
    let recorder = Recorder::default();
    let client = client(&recorder, 3);
    let first = data(7);
    let second = data(10);
    let a = client.storage().create_file(
        "bucket",
        "unique()",
        InputFile::from_bytes("a.bin", first.clone()),
        None,
    );
    let b = client.storage().create_file(
        "bucket",
        "unique()",
        InputFile::from_bytes("b.bin", second.clone()),
        None,
    );

    let (ra, rb) = tokio::join!(a.finish(), b.finish());
    ra.unwrap();
    rb.unwrap();

    let posts = recorder.posts();
    assert_eq!(posts.len(), 7);
    let of_size = |total: &str| -> (Vec<String>, Vec<u8>) {
        let mine: Vec<_> = posts
            .iter()
            .filter(|r| content_range(r).is_some_and(|range| range.ends_with(total)))
            .collect();
        let ranges = mine.iter().filter_map(|r| content_range(r)).collect();
        let bytes = mine.iter().flat_map(|r| file_part(r).to_vec()).collect();
        (ranges, bytes)
    };

    let (ranges_a, bytes_a) = of_size("/7");
    assert_eq!(ranges_a, vec!["bytes 0-2/7", "bytes 3-5/7", "bytes 6-6/7"]);
    assert_eq!(bytes_a, first);

    let (ranges_b, bytes_b) = of_size("/10");
    assert_eq!(
        ranges_b,
        vec!["bytes 0-2/10", "bytes 3-5/10", "bytes 6-8/10", "bytes 9-9/10"]
    );
    assert_eq!(bytes_b, second);
}

#[tokio::test]
async fn upload_from_disk_reads_each_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie.bin");
    let content = data(17);
    std::fs::write(&path, &content).unwrap();

    let recorder = Recorder::default();
    let file = InputFile::from_path(&path).await.unwrap();
    assert_eq!(file.filename(), "movie.bin");

    client(&recorder, 8)
        .storage()
        .create_file("bucket", "unique()", file, None)
        .finish()
        .await
        .unwrap();

    let sent: Vec<u8> = recorder
        .posts()
        .iter()
        .flat_map(|r| file_part(r).to_vec())
        .collect();
    assert_eq!(sent, content);
}
