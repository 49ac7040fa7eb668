use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
