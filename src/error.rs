use thiserror::Error;

/// Every way the host can fail. None of these are recoverable inside the frame
/// loop: `run` returns them after the backend has been released.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("failed to create streaming texture: {0}")]
    Texture(String),
    #[error("failed to lock texture: {0}")]
    Lock(String),
    #[error("failed to clear surface: {0}")]
    Clear(String),
    #[error("failed to copy texture to surface: {0}")]
    Copy(String),
    #[error("failed to present surface: {0}")]
    Present(String),
    #[error("host has already run, a terminated host cannot be restarted")]
    AlreadyRun,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, HostError>;
