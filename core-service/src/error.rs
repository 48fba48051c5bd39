use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Content error: {0}")]
    Content(#[from] core_content::ContentError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] core_navigation::NavigationError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
