//! TCP dial bounded by a connect deadline. IPv4, IPv6 (`[::1]:port`) and host names all resolve.

use std::time::Duration;

use tokio::net::TcpStream;

use crate::error::{Result, RpcError};

/// Connect to `addr` or give up after `connect_timeout`. Losing the race drops the
/// handshake, so a late completion can't leak a socket.
pub async fn dial(addr: &str, connect_timeout: Duration) -> Result<TcpStream> {
    match tokio::time::timeout(connect_timeout, TcpStream::connect(addr)).await {
        Err(_) => {
            tracing::warn!(%addr, timeout = ?connect_timeout, "rpc client: connect timeout");
            Err(RpcError::ConnectTimeout {
                addr: addr.to_owned(),
                timeout: connect_timeout,
            })
        }
        Ok(Err(source)) => {
            tracing::warn!(%addr, error = %source, "rpc client: new client error");
            Err(RpcError::Connect {
                addr: addr.to_owned(),
                source,
            })
        }
        Ok(Ok(stream)) => {
            stream.set_nodelay(true)?;
            tracing::debug!(%addr, "rpc client: connected");
            Ok(stream)
        }
    }
}
