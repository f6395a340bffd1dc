//! Client library for the Appwrite REST API.
//!
//! A single [`Client`] carries the endpoint, credential headers and transport.
//! Service modules ([`Health`], [`Avatars`], [`Storage`], [`Locale`],
//! [`Graphql`]) borrow a clone of it and turn method calls into
//! [`Request`]s. Large files are uploaded through [`ChunkedUpload`], which
//! reports progress as a stream of [`UploadEvent`]s.
//!
//! ```no_run
//! # async fn run() -> appwrite::Result<()> {
//! use appwrite::{Client, Id, InputFile};
//!
//! let client = Client::default().with_project("my-project").with_key("secret");
//! let file = InputFile::from_path("video.mp4").await?;
//! let uploaded = client
//!     .storage()
//!     .create_file("media", &Id::unique(), file, None)
//!     .finish_with(|p| println!("{}%", p.progress))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod enums;
pub mod error;
pub mod helpers;
pub mod input_file;
pub mod models;
pub mod params;
pub mod request;
pub mod rest_types;
pub mod services;
pub mod transport;
pub mod upload;

mod serde_utils;

pub use client::{Client, DEFAULT_CHUNK_SIZE, DEFAULT_ENDPOINT, ResponseBody};
pub use error::{AppwriteError, Error, Result, TransportError};
pub use helpers::{Id, Permission, Query, Role};
pub use input_file::InputFile;
pub use params::{Param, Params};
pub use request::{ContentType, Method, Request};
pub use services::{Avatars, Graphql, Health, IconOptions, Locale, PreviewOptions, Storage};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
pub use upload::{ChunkedUpload, UploadEvent, UploadProgress};
