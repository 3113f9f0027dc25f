use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecarbError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Record not found: {kind} '{key}'")]
    NotFound { kind: String, key: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DecarbError {
    fn from(e: serde_json::Error) -> Self {
        DecarbError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for DecarbError {
    fn from(e: std::io::Error) -> Self {
        DecarbError::Storage(e.to_string())
    }
}
