use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("WebDriver error: {0}")]
    WebDriverError(String),

    #[error("Speech synthesis error: {0}")]
    SpeechError(String),

    #[error("Audio error: {0}")]
    AudioError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocentError>;
