//! Client side of the connection: writes request frames, reads response frames.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, RpcError};
use crate::protocol::{Request, Response};
use crate::wire::{self, FrameDecodeError};

const READ_CHUNK: usize = 8 * 1024;

/// Owns the byte stream. Not internally synchronized; the client holds it behind a mutex.
#[derive(Debug)]
pub struct ClientCodec<S> {
    stream: S,
    /// Bytes read but not yet decoded. Survives a dropped `read_response`.
    read_buf: Vec<u8>,
    /// Set while a frame is being written; still set on entry means the last write was dropped.
    writing: bool,
    broken: bool,
}

impl<S> ClientCodec<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            read_buf: Vec::with_capacity(READ_CHUNK),
            writing: false,
            broken: false,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken || self.writing
    }

    /// Mark the stream unusable, e.g. after a write was abandoned mid-frame.
    pub fn poison(&mut self) {
        self.broken = true;
    }

    /// Encode and write one request frame, then flush.
    /// Not cancel-safe: a dropped write may leave half a frame on the wire, so the
    /// codec refuses all further traffic after one.
    pub async fn write_request(&mut self, req: &Request) -> Result<()> {
        if self.is_broken() {
            self.broken = true;
            return Err(RpcError::ConnectionBroken);
        }
        let frame = wire::encode_frame(req)?;
        self.writing = true;
        let res = async {
            self.stream.write_all(&frame).await?;
            self.stream.flush().await
        }
        .await;
        match res {
            Ok(()) => {
                self.writing = false;
                Ok(())
            }
            Err(e) => {
                self.broken = true;
                Err(e.into())
            }
        }
    }

    /// Read until one full response frame decodes.
    /// Cancel-safe: bytes already read stay in the buffer for the next call.
    pub async fn read_response(&mut self) -> Result<Response> {
        if self.is_broken() {
            return Err(RpcError::ConnectionBroken);
        }
        loop {
            match wire::decode_frame::<Response>(&self.read_buf) {
                Ok((resp, used)) => {
                    self.read_buf.drain(..used);
                    return Ok(resp);
                }
                Err(FrameDecodeError::NeedMore) => {}
                Err(e) => {
                    self.broken = true;
                    return Err(e.into());
                }
            }
            let n = match self.stream.read_buf(&mut self.read_buf).await {
                Ok(n) => n,
                Err(e) => {
                    self.broken = true;
                    return Err(e.into());
                }
            };
            if n == 0 {
                self.broken = true;
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed by peer",
                )
                .into());
            }
        }
    }

    /// Shut down the write half. The stream itself is dropped with the codec.
    pub async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
