use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Signage loop already running")]
    AlreadyRunning,

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
