use bytes::Bytes;

use crate::client::Client;
use crate::error::Result;
use crate::request::Request;

/// Generated images. Every method returns the raw image bytes.
///
/// Size and quality arguments are optional; unset ones are left to the
/// server's defaults.
#[derive(Debug, Clone)]
pub struct Avatars {
    client: Client,
}

/// Output size and quality for icon endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct IconOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u32>,
}

impl Avatars {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn icon(path: &str, code: &str, options: IconOptions) -> Request {
        Request::get(path)
            .path_param("code", code)
            .param("width", options.width)
            .param("height", options.height)
            .param("quality", options.quality)
    }

    /// Browser icon for a code as reported by `/account/sessions`.
    pub async fn get_browser(&self, code: &str, options: IconOptions) -> Result<Bytes> {
        self.client
            .call_bytes(Self::icon("/avatars/browsers/{code}", code, options))
            .await
    }

    pub async fn get_credit_card(&self, code: &str, options: IconOptions) -> Result<Bytes> {
        self.client
            .call_bytes(Self::icon("/avatars/credit-cards/{code}", code, options))
            .await
    }

    pub async fn get_flag(&self, code: &str, options: IconOptions) -> Result<Bytes> {
        self.client
            .call_bytes(Self::icon("/avatars/flags/{code}", code, options))
            .await
    }

    /// Favicon of a remote website.
    pub async fn get_favicon(&self, url: &str) -> Result<Bytes> {
        self.client
            .call_bytes(Request::get("/avatars/favicon").param("url", url))
            .await
    }

    /// Fetch and crop a remote image.
    pub async fn get_image(
        &self,
        url: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Bytes> {
        let request = Request::get("/avatars/image")
            .param("url", url)
            .param("width", width)
            .param("height", height);
        self.client.call_bytes(request).await
    }

    /// Initials avatar. Without `name` the server uses the logged-in user.
    pub async fn get_initials(
        &self,
        name: Option<&str>,
        width: Option<u32>,
        height: Option<u32>,
        background: Option<&str>,
    ) -> Result<Bytes> {
        let request = Request::get("/avatars/initials")
            .param("name", name)
            .param("width", width)
            .param("height", height)
            .param("background", background);
        self.client.call_bytes(request).await
    }

    pub async fn get_qr(
        &self,
        text: &str,
        size: Option<u32>,
        margin: Option<u32>,
        download: Option<bool>,
    ) -> Result<Bytes> {
        let request = Request::get("/avatars/qr")
            .param("text", text)
            .param("size", size)
            .param("margin", margin)
            .param("download", download);
        self.client.call_bytes(request).await
    }
}
