use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemindError {
    #[error("not initialized: run 'remind init'")]
    NotInitialized,

    #[error("avatar not found: {0}")]
    AvatarNotFound(String),

    #[error("invalid avatar id '{0}': must be lowercase alphanumeric with '_' or '-'")]
    InvalidAvatarId(String),

    #[error("microphone permission denied")]
    MicrophoneDenied,

    #[error("recorder error: {0}")]
    Recorder(String),

    #[error("video player error: {0}")]
    Player(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RemindError>;
