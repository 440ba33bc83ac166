//! Error types for the MCP servers.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Server errors.
#[derive(Error, Debug)]
pub enum Error {
    /// JSON-RPC protocol error.
    #[error("JSON-RPC error: {code} - {message}")]
    JsonRpc {
        /// Error code.
        code: i32,
        /// Error message.
        message: String,
    },

    /// Tool not found.
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// Invalid parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Error body returned by the Notion API. Displays the API's own message.
    #[error("{message}")]
    Notion {
        /// HTTP status.
        status: u16,
        /// Notion error code, e.g. `object_not_found`.
        code: String,
        /// Human-readable message from the API.
        message: String,
    },

    /// HTTP transport failure.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// An upload failed after some batches were already stored.
    #[error("{source}")]
    PartialUpload {
        /// Page that was created before the failure.
        page_id: String,
        /// Batches stored, counting the create call.
        completed_batches: usize,
        /// Batches planned.
        total_batches: usize,
        /// The failing call's error.
        source: Box<Error>,
    },

    /// Browser automation failure.
    #[error("{0}")]
    Browser(String),

    /// A page tool was called before any navigation.
    #[error("No page is currently open. Use navigate_to_page first.")]
    NoActivePage,

    /// Engine kind the configured launcher cannot start.
    #[error("browser engine not supported: {0}")]
    UnsupportedEngine(String),

    /// Invalid runtime configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::JsonRpc { code, .. } => *code,
            Error::ToolNotFound(_) => codes::METHOD_NOT_FOUND,
            Error::InvalidParams(_) | Error::UnsupportedEngine(_) | Error::Config(_) => {
                codes::INVALID_PARAMS
            }
            Error::Notion { .. } | Error::Http(_) | Error::PartialUpload { .. } => -32001,
            Error::Browser(_) | Error::NoActivePage => -32002,
            Error::Serialization(_) => codes::PARSE_ERROR,
            Error::Io(_) => -32003,
        }
    }
}

/// Standard JSON-RPC error codes.
pub mod codes {
    /// Parse error.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid request.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error.
    pub const INTERNAL_ERROR: i32 = -32603;
}
