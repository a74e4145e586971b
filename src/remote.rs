//! Backend HTTP client and the [`RemoteStore`] seam.
//!
//! All backend traffic goes through the [`RemoteStore`] trait so the
//! pipeline, deletion, and reindex logic can be exercised against an
//! in-memory fake. [`HttpBackend`] is the real implementation: one
//! `reqwest` client with the configured timeout, issuing requests relative
//! to the configured base URL.
//!
//! # Error extraction
//!
//! The backend reports failures in two shapes:
//! - JSON endpoints (`/files`, `/upload`, `/files/{id}`, `/send`) return a
//!   body with an `error` field; when the body is not parseable the status
//!   text is used instead.
//! - The context endpoints (`/deleteContext`, `/createVectorEmbeddings`)
//!   return plain-text error bodies.

use async_trait::async_trait;
use reqwest::multipart;
use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::models::{Document, FileListResponse};

/// The remote collaborator: document store plus derived-index lifecycle.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List documents in remote-reported order. The order is not guaranteed
    /// stable across calls.
    async fn list_files(&self) -> Result<Vec<Document>, ApiError>;

    /// Upload a single document.
    async fn upload_file(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ApiError>;

    /// Delete a single document by id.
    async fn delete_file(&self, id: &str) -> Result<(), ApiError>;

    /// Delete the derived index.
    async fn delete_context(&self) -> Result<(), ApiError>;

    /// Create a new derived index from the current document set. Returns
    /// the server's confirmation text.
    async fn create_embeddings(&self) -> Result<String, ApiError>;

    /// Forward a chat query; returns the assistant's reply.
    async fn send_query(&self, query: &str) -> Result<String, ApiError>;
}

/// [`RemoteStore`] implementation over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RemoteStore for HttpBackend {
    async fn list_files(&self) -> Result<Vec<Document>, ApiError> {
        // Cache-busting token so the list reflects the latest server state.
        let t = chrono::Utc::now().timestamp_millis();

        let resp = self
            .client
            .get(self.url("/files"))
            .query(&[("t", t.to_string())])
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(json_error(resp).await);
        }

        let body: FileListResponse = resp.json().await?;
        Ok(body.files)
    }

    async fn upload_file(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ApiError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(json_error(resp).await);
        }

        // The success body describes the stored document; nothing in it is
        // needed here — the list is refreshed by a full reload.
        Ok(())
    }

    async fn delete_file(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .delete(self.url(&format!("/files/{}", id)))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(json_error(resp).await);
        }

        Ok(())
    }

    async fn delete_context(&self) -> Result<(), ApiError> {
        let resp = self
            .client
            .delete(self.url("/deleteContext"))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(text_error(resp).await);
        }

        Ok(())
    }

    async fn create_embeddings(&self) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.url("/createVectorEmbeddings"))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: non_empty_or_status(text, status),
            });
        }

        Ok(text)
    }

    async fn send_query(&self, query: &str) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(self.url("/send"))
            .json(&serde_json::json!({ "userQuery": query }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(json_error(resp).await);
        }

        Ok(resp.text().await?)
    }
}

/// Build a [`ApiError::Server`] from a non-2xx JSON response: prefer the
/// body's `error` field, fall back to the status text.
async fn json_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    let message = match resp.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(|e| e.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| status_text(status)),
        Err(_) => status_text(status),
    };

    ApiError::Server {
        status: status.as_u16(),
        message,
    }
}

/// Build a [`ApiError::Server`] from a non-2xx plain-text response.
async fn text_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();

    ApiError::Server {
        status: status.as_u16(),
        message: non_empty_or_status(text, status),
    }
}

fn non_empty_or_status(text: String, status: reqwest::StatusCode) -> String {
    if text.trim().is_empty() {
        status_text(status)
    } else {
        text
    }
}

fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
