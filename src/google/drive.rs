use std::{pin::Pin, sync::Arc};

use futures::TryStreamExt;
use reqwest::{header::AUTHORIZATION, Client, Response};
use tokio::io::AsyncRead;
use tokio_util::compat::FuturesAsyncReadCompatExt;

use super::{utils, Authenticator};
use crate::{error::Result, utils::IntoIOErr};

pub const DRIVE_URI: &str = "https://www.googleapis.com";
pub const PDF: &str = "application/pdf";

pub type BoxedAsyncRead = Pin<Box<dyn AsyncRead + Send>>;

/// A file body on its way down, with the length if the server sent one.
pub struct Media {
    pub reader: BoxedAsyncRead,
    pub total: Option<u64>,
}

impl From<Response> for Media {
    fn from(res: Response) -> Self {
        let total = res.content_length();
        let reader = res
            .bytes_stream()
            .map_err(IntoIOErr::into_io_err)
            .into_async_read()
            .compat();

        Self {
            reader: Box::pin(reader),
            total,
        }
    }
}

pub struct DriveClient {
    http: Client,
    base_url: String,
    auth: Arc<Authenticator>,
}

impl DriveClient {
    pub fn new(http: Client, base_url: impl Into<String>, auth: Arc<Authenticator>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            auth,
        }
    }

    /// Raw file content. Fails with `Error::Status` for Google editor
    /// documents, which only exist as exports.
    pub async fn get_media(&self, id: &str) -> Result<Media> {
        let url = format!("{}/drive/v3/files/{id}", self.base_url);
        self.open(&url, &[("alt", "media")]).await
    }

    pub async fn export(&self, id: &str, mime_type: &str) -> Result<Media> {
        let url = format!("{}/drive/v3/files/{id}/export", self.base_url);
        self.open(&url, &[("mimeType", mime_type)]).await
    }

    async fn open(&self, url: &str, query: &[(&str, &str)]) -> Result<Media> {
        let res = self
            .http
            .get(url)
            .query(query)
            .header(AUTHORIZATION, self.auth.auth_header().await?)
            .send()
            .await?;

        Ok(utils::check(res).await?.into())
    }
}
