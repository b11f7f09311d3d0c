//! Error types for the jRPC client.

use std::time::Duration;

use thiserror::Error;

use crate::wire::{FrameDecodeError, FrameEncodeError};

/// Every way a dial, call or discovery can fail.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc client: connect to {addr} timed out: expect within {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("rpc client: connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("rpc client: write request timed out: expect within {0:?}")]
    WriteTimeout(Duration),

    #[error("rpc client: read response timed out: expect within {0:?}")]
    ReadTimeout(Duration),

    #[error("rpc client: I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rpc client: {0}")]
    Encode(#[from] FrameEncodeError),

    #[error("rpc client: {0}")]
    Decode(#[from] FrameDecodeError),

    /// The server handled the request and reported a failure.
    #[error("rpc client: server error: {0}")]
    Remote(String),

    #[error("rpc client: response seq {got} does not match request seq {expected}")]
    UnexpectedSeq { expected: u64, got: u64 },

    /// An earlier write was abandoned or the stream failed; the connection can't be reused.
    #[error("rpc client: connection is broken")]
    ConnectionBroken,
}

impl RpcError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            RpcError::ConnectTimeout { .. } | RpcError::WriteTimeout(_) | RpcError::ReadTimeout(_)
        )
    }
}

/// Result type alias using RpcError.
pub type Result<T> = std::result::Result<T, RpcError>;
