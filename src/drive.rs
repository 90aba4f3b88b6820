use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::StudioError;
use crate::ids::{FileId, FolderId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopiedFile {
    pub id: FileId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CopyRequest<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

pub trait DriveClient: Send + Sync {
    fn copy_file(
        &self,
        source: &FileId,
        folder: &FolderId,
        name: &str,
    ) -> Result<CopiedFile, StudioError>;
}

#[derive(Clone)]
pub struct DriveHttpClient {
    client: Client,
    token: Arc<dyn TokenProvider>,
}

impl DriveHttpClient {
    pub fn new(token: Arc<dyn TokenProvider>) -> Result<Self, StudioError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("studio-docs/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| StudioError::DriveHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| StudioError::DriveHttp(err.to_string()))?;
        Ok(Self { client, token })
    }

    pub fn copy_url(source: &FileId) -> String {
        format!(
            "https://www.googleapis.com/drive/v3/files/{}/copy?supportsAllDrives=true",
            source.as_str()
        )
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, StudioError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Google Drive request failed".to_string());
        Err(StudioError::DriveStatus { status, message })
    }
}

impl DriveClient for DriveHttpClient {
    fn copy_file(
        &self,
        source: &FileId,
        folder: &FolderId,
        name: &str,
    ) -> Result<CopiedFile, StudioError> {
        let url = Self::copy_url(source);
        let token = self.token.access_token()?;
        let body = CopyRequest {
            name,
            parents: [folder.as_str()],
        };
        debug!(%source, %folder, name, "drive.copy");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .map_err(|err| StudioError::DriveHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .json()
            .map_err(|err| StudioError::DriveHttp(err.to_string()))
    }
}
