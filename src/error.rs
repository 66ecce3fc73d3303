use std::path::PathBuf;

use thiserror::Error;

/// Message shown when the backend fails without saying why.
pub const GENERIC_SERVER_ERROR: &str = "Ocorreu um erro no servidor.";

/// Message shown when a submission has neither text nor files.
pub const MISSING_INPUT_ERROR: &str = "Por favor, insira um texto ou faça o upload de um arquivo.";

pub type ClientResult<T> = Result<T, ClientError>;

/// Failures that abort a backend operation.
///
/// Per-item processing errors are not represented here: they travel inside
/// a successful [`crate::model::ClassifyResponse`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("falha de conexão com o servidor: {0}")]
    Transport(String),

    /// The backend answered with a non-success status. `message` is the
    /// server-supplied `error` field, or [`GENERIC_SERVER_ERROR`].
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A success status with a body of unexpected shape.
    #[error("resposta inesperada do servidor: {0}")]
    MalformedResponse(String),

    /// Client-side validation rejected the input before any request.
    #[error("{0}")]
    Validation(String),

    /// A file selected for upload could not be read.
    #[error("não foi possível ler o arquivo {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn missing_input() -> Self {
        Self::Validation(MISSING_INPUT_ERROR.to_string())
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short, stable name for logs and the activity log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Server { .. } => "server",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Validation(_) => "validation",
            Self::Io { .. } => "io",
        }
    }
}
