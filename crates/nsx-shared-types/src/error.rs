use thiserror::Error;

pub type SharedResult<T> = Result<T, SharedTypeError>;

#[derive(Debug, Error)]
pub enum SharedTypeError {
    #[error("invalid resource id '{value}': expected {expected} parts")]
    InvalidResourceId { value: String, expected: usize },
}
