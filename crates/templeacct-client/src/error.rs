//! Error types for templeacct-client

use templeacct_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Could not reach the accounting service: {message}")]
    Transport { message: String },

    #[error("The accounting service answered HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not read the accounting service response: {message}")]
    Decode { message: String },

    /// Envelope with `success == false`
    #[error("{message}")]
    Unsuccessful { message: String },
}

impl ClientError {
    pub fn transport(error: impl std::fmt::Display) -> Self {
        ClientError::Transport {
            message: error.to_string(),
        }
    }

    pub fn decode(error: impl std::fmt::Display) -> Self {
        ClientError::Decode {
            message: error.to_string(),
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Decode { message } => CoreError::MalformedResponse { message },
            other => CoreError::RequestFailure {
                message: other.to_string(),
            },
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
