//! Google Drive API connector implementation
//!
//! Implements the `RemoteFolderSource` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::source::{RemoteFolderSource, RemoteItem};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{DriveFile, FilesListResponse};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Results requested per listing page
const PAGE_SIZE: u32 = 200;

/// Fields to request for file resources
const FILE_FIELDS: &str = "id,name,mimeType,size,modifiedTime,md5Checksum,shortcutDetails";

/// Attempts per API request before the listing error is surfaced
const MAX_RETRIES: u32 = 3;

/// Google Drive folder connector
///
/// Implements `RemoteFolderSource` for Google Drive API v3:
///
/// - Paginated folder listing, filtered to playable media
/// - Shortcut and subfolder entries excluded during conversion
/// - Streaming downloads straight to the destination file
/// - Exponential backoff on rate limits and server errors
///
/// Authentication is the host's concern: the connector injects the bearer
/// token it was constructed with and never refreshes it.
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::source::RemoteFolderSource;
///
/// let connector = GoogleDriveConnector::new(http_client, access_token);
/// let items = connector.list_folder_items("folder-id").await?;
/// ```
pub struct GoogleDriveConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token with `drive.readonly` scope
    access_token: String,
}

impl GoogleDriveConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
        }
    }

    /// Convert a Drive file resource into a listing snapshot. Folders and
    /// shortcuts have no playable content and are dropped here.
    fn convert_file(&self, file: DriveFile) -> Option<RemoteItem> {
        if file.is_folder() || file.is_shortcut() {
            return None;
        }
        Some(RemoteItem {
            fetch_ref: format!(
                "{}/files/{}?supportsAllDrives=true&alt=media",
                DRIVE_API_BASE, file.id
            ),
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size.and_then(|s| s.parse().ok()),
            modified_time: file.modified_time,
            content_hash: file.md5_checksum,
        })
    }

    /// Execute an API request, retrying rate limits and server errors with
    /// exponential backoff.
    #[instrument(skip(self), fields(url = %url))]
    async fn execute_with_retry(
        &self,
        url: String,
    ) -> crate::error::Result<bridge_traits::http::HttpResponse> {
        let mut attempt = 0;

        loop {
            let request = HttpRequest::get(url.clone())
                .bearer_token(self.access_token.as_str())
                .header("Accept", "application/json")
                .timeout(Duration::from_secs(30));

            match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, "API request succeeded");
                    return Ok(response);
                }
                Ok(response) if response.status == 429 || response.is_server_error() => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        warn!(
                            status = response.status,
                            "API request failed after {} attempts", MAX_RETRIES
                        );
                        return Err(GoogleDriveError::ApiError {
                            status_code: response.status,
                            message: format!("request failed after {} retries", MAX_RETRIES),
                        });
                    }
                    let backoff_ms = 100u64 * 2u64.pow(attempt);
                    warn!(
                        status = response.status,
                        attempt, "retryable API failure, retrying in {}ms", backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Ok(response) => {
                    // Client error, retrying will not help.
                    warn!(status = response.status, "API request failed");
                    return Err(GoogleDriveError::ApiError {
                        status_code: response.status,
                        message: String::from_utf8_lossy(&response.body).to_string(),
                    });
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        warn!("API request failed after {} attempts: {}", MAX_RETRIES, e);
                        return Err(e.into());
                    }
                    let backoff_ms = 100u64 * 2u64.pow(attempt);
                    warn!(attempt, "transport failure: {}, retrying in {}ms", e, backoff_ms);
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl RemoteFolderSource for GoogleDriveConnector {
    #[instrument(skip(self), fields(folder_id = %folder_id))]
    async fn list_folder_items(
        &self,
        folder_id: &str,
    ) -> bridge_traits::error::Result<Vec<RemoteItem>> {
        let query = format!("'{}' in parents and trashed=false", folder_id);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            page_count += 1;
            let mut url = format!(
                "{}/files?q={}&pageSize={}&fields=nextPageToken,files({})",
                DRIVE_API_BASE,
                urlencoding::encode(&query),
                PAGE_SIZE,
                FILE_FIELDS
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self
                .execute_with_retry(url)
                .await
                .map_err(bridge_traits::error::BridgeError::from)?;

            let page: FilesListResponse = serde_json::from_slice(&response.body)
                .map_err(|e| {
                    GoogleDriveError::ParseError(format!("files list response: {}", e))
                })
                .map_err(bridge_traits::error::BridgeError::from)?;

            debug!(page = page_count, files = page.files.len(), "listing page fetched");
            items.extend(
                page.files
                    .into_iter()
                    .filter_map(|file| self.convert_file(file))
                    .filter(|item| item.media_kind().is_some()),
            );

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        items.sort_by_key(|item| item.name.to_lowercase());
        info!(items = items.len(), pages = page_count, "listed folder");
        Ok(items)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn download_item(
        &self,
        item: &RemoteItem,
        destination: &Path,
    ) -> bridge_traits::error::Result<()> {
        let request = HttpRequest::get(item.fetch_ref.clone())
            .bearer_token(self.access_token.as_str())
            .timeout(Duration::from_secs(300));

        let mut stream = self.http_client.download_stream(request).await?;

        // Scope the file handle so it is flushed and closed before the
        // post-write checks, on success and on error alike.
        let written = {
            let mut file = tokio::fs::File::create(destination).await?;
            let written = tokio::io::copy(&mut stream, &mut file).await?;
            tokio::io::AsyncWriteExt::flush(&mut file).await?;
            written
        };

        if written == 0 {
            return Err(GoogleDriveError::EmptyBody {
                file_id: item.id.clone(),
            }
            .into());
        }

        debug!(bytes = written, path = %destination.display(), "downloaded item");
        Ok(())
    }
}
