use thiserror::Error;

/// Error for all shrike operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("Function has no entry block: {0}")]
    FunctionEntry(String),
    #[error("Error in the graph library: vertex not found {0}")]
    GraphVertexNotFound(usize),
    #[error("Error in the graph library: edge not found ({0}, {1})")]
    GraphEdgeNotFound(usize, usize),
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("serde_json error")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Value not found in function: {0}")]
    ValueNotFound(usize),
}

impl From<&str> for Error {
    fn from(s: &str) -> Error {
        Error::Custom(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
