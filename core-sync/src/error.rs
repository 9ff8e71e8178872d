use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote listing failed: {0}")]
    Listing(String),

    #[error("Download failed for item {item_id}: {message}")]
    Download { item_id: String, message: String },

    #[error("Manifest persistence failed: {0}")]
    Persist(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
