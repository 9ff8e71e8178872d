//! Google Drive API response types
//!
//! Data structures for deserializing Google Drive API v3 responses.

use serde::Deserialize;

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const SHORTCUT_MIME: &str = "application/vnd.google-apps.shortcut";

/// Google Drive API file resource
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// File size in bytes, serialized as a string (omitted for folders)
    #[serde(default)]
    pub size: Option<String>,

    /// Modification time (RFC 3339)
    #[serde(default)]
    pub modified_time: Option<String>,

    /// MD5 checksum (regular files only)
    #[serde(default)]
    pub md5_checksum: Option<String>,

    /// Present on shortcut entries
    #[serde(default)]
    pub shortcut_details: Option<ShortcutDetails>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }

    pub fn is_shortcut(&self) -> bool {
        self.mime_type == SHORTCUT_MIME || self.shortcut_details.is_some()
    }
}

/// Shortcut target metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutDetails {
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub target_mime_type: Option<String>,
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// Files on this page
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for the next page, absent on the last one
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_drive_file() {
        let json = r#"{
            "id": "abc123",
            "name": "loop.mp4",
            "mimeType": "video/mp4",
            "size": "1048576",
            "modifiedTime": "2024-05-01T12:00:00.000Z",
            "md5Checksum": "d41d8cd98f00b204e9800998ecf8427e"
        }"#;

        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "abc123");
        assert_eq!(file.mime_type, "video/mp4");
        assert_eq!(file.size, Some("1048576".to_string()));
        assert!(!file.is_folder());
        assert!(!file.is_shortcut());
    }

    #[test]
    fn test_folder_and_shortcut_detection() {
        let folder: DriveFile = serde_json::from_str(
            r#"{"id": "f1", "name": "Media", "mimeType": "application/vnd.google-apps.folder"}"#,
        )
        .unwrap();
        assert!(folder.is_folder());

        let shortcut: DriveFile = serde_json::from_str(
            r#"{
                "id": "s1",
                "name": "link to clip",
                "mimeType": "application/vnd.google-apps.shortcut",
                "shortcutDetails": {"targetId": "abc", "targetMimeType": "video/mp4"}
            }"#,
        )
        .unwrap();
        assert!(shortcut.is_shortcut());
    }

    #[test]
    fn test_deserialize_files_list_response() {
        let json = r#"{
            "files": [
                {"id": "file1", "name": "wall.jpg", "mimeType": "image/jpeg"}
            ],
            "nextPageToken": "token123"
        }"#;

        let response: FilesListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.files.len(), 1);
        assert_eq!(response.next_page_token, Some("token123".to_string()));
    }

    #[test]
    fn test_last_page_has_no_token() {
        let response: FilesListResponse = serde_json::from_str(r#"{"files": []}"#).unwrap();
        assert!(response.files.is_empty());
        assert_eq!(response.next_page_token, None);
    }
}
