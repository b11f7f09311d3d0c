//! RPC client over one connection.
//!
//! Every call runs the same critical section: take the connection lock, write the
//! request under the write deadline, read the matching response under the read
//! deadline, release. Concurrent callers queue on the lock; their requests never
//! interleave on the wire. A deadline that fires drops the in-flight write or read,
//! so nothing keeps running against the connection once the caller has its answer.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::Instrument;

use crate::codec::ClientCodec;
use crate::config::ClientConfig;
use crate::connector::dial;
use crate::error::{Result, RpcError};
use crate::protocol::{Request, Response, Value};

struct Conn<S> {
    codec: ClientCodec<S>,
    next_seq: u64,
}

/// Client for one connection. Share it behind an `Arc` to call from several tasks.
pub struct Client<S = TcpStream> {
    conn: Mutex<Conn<S>>,
    config: ClientConfig,
    span: tracing::Span,
}

impl Client<TcpStream> {
    /// Dial `addr` under the connect deadline and wrap the connection.
    pub async fn connect(addr: &str, config: ClientConfig) -> Result<Self> {
        let stream = dial(addr, config.connect_timeout).await?;
        let span = tracing::info_span!("rpc_client", peer = %addr);
        Ok(Self::new(stream, config).with_span(span))
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an open connection. No I/O happens here.
    pub fn new(stream: S, config: ClientConfig) -> Self {
        Self {
            conn: Mutex::new(Conn {
                codec: ClientCodec::new(stream),
                next_seq: 0,
            }),
            config,
            span: tracing::info_span!("rpc_client"),
        }
    }

    /// Emit all of this client's diagnostics inside `span`.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Invoke `method` and return its replies in order.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        async {
            let resp = self
                .round_trip(|seq| Request::new(seq, method, args))
                .await?;
            if !resp.is_ok() {
                tracing::warn!(method, error = %resp.err, "rpc client: client receive");
                return Err(RpcError::Remote(resp.err));
            }
            tracing::debug!(
                method,
                replies = resp.replies.len(),
                "rpc client: client call success"
            );
            for (idx, reply) in resp.replies.iter().enumerate() {
                tracing::debug!("Value {idx} is : {reply}");
            }
            Ok(resp.replies)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Ask whether `method` is registered on the server. Any failure reads as "no".
    pub async fn discover(&self, method: &str) -> bool {
        self.try_discover(method).await.unwrap_or(false)
    }

    /// Like [`Client::discover`] but keeps the reason a lookup failed.
    pub async fn try_discover(&self, method: &str) -> Result<bool> {
        async {
            let resp = self.round_trip(|seq| Request::discover(seq, method)).await?;
            if !resp.is_ok() {
                tracing::warn!(method, error = %resp.err, "rpc client: client receive");
                return Err(RpcError::Remote(resp.err));
            }
            tracing::debug!(method, "rpc client: client discover success");
            let registered = resp.is_registered();
            if registered {
                tracing::info!("The function {method} has been registered!");
            } else {
                tracing::info!("The function {method} has not been registered!");
            }
            Ok(registered)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Close the connection. Waits for any call in progress to finish first.
    pub async fn close(self) -> Result<()> {
        let span = self.span;
        let mut conn = self.conn.into_inner();
        let res = conn.codec.close().await;
        if let Err(e) = &res {
            span.in_scope(|| tracing::warn!(error = %e, "rpc client: close"));
        }
        res
    }

    async fn round_trip(&self, build: impl FnOnce(u64) -> Request) -> Result<Response> {
        let mut conn = self.conn.lock().await;
        conn.next_seq += 1;
        let req = build(conn.next_seq);

        match timeout(self.config.write_timeout, conn.codec.write_request(&req)).await {
            Err(_) => {
                tracing::warn!(
                    method = %req.method,
                    "rpc client: WriteRequest timeout: expect within {:?}",
                    self.config.write_timeout
                );
                return Err(RpcError::WriteTimeout(self.config.write_timeout));
            }
            Ok(Err(e)) => {
                tracing::warn!(method = %req.method, error = %e, "rpc client: client send");
                return Err(e);
            }
            Ok(Ok(())) => {}
        }

        // One deadline for the whole read, however many stale frames get skipped.
        let deadline = Instant::now() + self.config.read_timeout;
        loop {
            let resp = match timeout_at(deadline, conn.codec.read_response()).await {
                Err(_) => {
                    tracing::warn!(
                        method = %req.method,
                        "rpc client: ReadResponse timeout: expect within {:?}",
                        self.config.read_timeout
                    );
                    return Err(RpcError::ReadTimeout(self.config.read_timeout));
                }
                Ok(Err(e)) => {
                    tracing::warn!(method = %req.method, error = %e, "rpc client: client receive");
                    return Err(e);
                }
                Ok(Ok(resp)) => resp,
            };
            if resp.seq < req.seq {
                // Reply to a call whose caller already gave up.
                tracing::debug!(seq = resp.seq, "rpc client: discarding stale response");
                continue;
            }
            if resp.seq > req.seq {
                conn.codec.poison();
                tracing::warn!(
                    expected = req.seq,
                    got = resp.seq,
                    "rpc client: response out of order"
                );
                return Err(RpcError::UnexpectedSeq {
                    expected: req.seq,
                    got: resp.seq,
                });
            }
            return Ok(resp);
        }
    }
}
