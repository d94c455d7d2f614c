//! Two-phase remote write client for WebHDFS-compatible gateways.
//!
//! Phase 1 issues a create request and expects a 307 redirect naming the
//! data-node location. Phase 2 PUTs the file content to that location and
//! expects 201. Redirect following is disabled on the client for both phases
//! so the Location header is always handled explicitly.

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use snafu::prelude::*;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{
    ClientSnafu, MissingLocationSnafu, NoRedirectSnafu, TransportSnafu, UploadError,
    UploadRejectedSnafu,
};

/// Header naming the acting user on the data write.
const HDFS_USER_HEADER: &str = "Hdfs-User";

/// Replace characters a gateway will not accept in a path component.
///
/// Applying the function twice yields the same result, so an already
/// sanitized name passes through unchanged.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '[' | ']' | '{' | '}' | '(' | ')' | '<' | '>' | '*' | '?' | '|' | '"' | '^' | '%'
            | '$' | '#' | '@' | '!' | '~' | '`' => '_',
            other => other,
        })
        .collect()
}

/// Client for the two-phase create/write protocol.
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
    remote_dir: String,
    user: Option<String>,
    auth_key: Option<String>,
    overwrite: bool,
}

impl UploadClient {
    /// Build a client from configuration.
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(config.upload.connect_timeout_secs))
            .timeout(Duration::from_secs(config.upload.request_timeout_secs))
            .build()
            .context(ClientSnafu)?;

        Ok(Self {
            http,
            endpoint: config.base.domain.clone(),
            remote_dir: config.hdfs.dir.clone(),
            user: config.hdfs.user.clone(),
            auth_key: config.internal.key.clone(),
            overwrite: config.upload.overwrite,
        })
    }

    /// Upload one file's content, returning the remote path written.
    ///
    /// No retries happen here; a failed call leaves nothing to clean up and
    /// the caller decides what to do with the file.
    pub async fn upload(&self, file_name: &str, content: Bytes) -> Result<String, UploadError> {
        let remote_path = format!("{}/{}", self.remote_dir, sanitize_file_name(file_name));
        let location = self.request_location(&remote_path).await?;
        self.write_content(&location, content).await?;
        info!(remote = %remote_path, "Remote write complete");
        Ok(remote_path)
    }

    /// Phase 1: negotiate the data-node location for the target path.
    async fn request_location(&self, remote_path: &str) -> Result<String, UploadError> {
        let create_url = format!("{}{}", self.endpoint, remote_path);

        let mut query: Vec<(&str, String)> = vec![
            ("op", "CREATE".to_string()),
            ("overwrite", self.overwrite.to_string()),
        ];
        if let Some(user) = &self.user {
            query.push(("user.name", user.clone()));
        }

        let mut request = self.http.put(&create_url).query(&query);
        if let Some(key) = &self.auth_key {
            request = request.header(AUTHORIZATION, key.as_str());
        }

        let response = request.send().await.context(TransportSnafu)?;
        let status = response.status();
        ensure!(
            status == StatusCode::TEMPORARY_REDIRECT,
            NoRedirectSnafu {
                status: status.as_u16(),
            }
        );

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        ensure!(!location.is_empty(), MissingLocationSnafu);

        debug!(%location, "Redirect location received");
        Ok(location)
    }

    /// Phase 2: write the content to the negotiated location.
    async fn write_content(&self, location: &str, content: Bytes) -> Result<(), UploadError> {
        let mut request = self.http.put(location).body(content);
        if let Some(user) = &self.user {
            request = request.header(HDFS_USER_HEADER, user.as_str());
        }

        let response = request.send().await.context(TransportSnafu)?;
        let status = response.status();
        ensure!(
            status == StatusCode::CREATED,
            UploadRejectedSnafu {
                status: status.as_u16(),
            }
        );
        Ok(())
    }
}
