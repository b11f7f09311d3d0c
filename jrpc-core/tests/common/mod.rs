//! Stub jRPC server shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jrpc_core::wire::{decode_frame, encode_frame, FrameDecodeError};
use jrpc_core::{ClientConfig, Request, Response, Value, REGISTERED_SENTINEL};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tokio::net::TcpListener;

pub const NOT_REGISTERED: &str = "The function has not been registered!";

/// Methods the stub knows:
/// - `rev`: replies are the args reversed
/// - `add`: one reply, the sum of the int args
/// - `echo`: replies are the args
/// - `slow`: waits `delay`, then replies `"late"`
/// - `fail`: error response that still carries a reply
/// - `mute`: never answers
#[derive(Clone)]
pub struct Stub {
    registry: Arc<HashSet<String>>,
    delay: Duration,
    discover_err: Option<String>,
    pub seen: Arc<Mutex<Vec<Request>>>,
}

impl Stub {
    pub fn new(registry: &[&str]) -> Self {
        Self {
            registry: Arc::new(registry.iter().map(|s| s.to_string()).collect()),
            delay: Duration::ZERO,
            discover_err: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn all() -> Self {
        Self::new(&["rev", "add", "echo", "slow", "fail", "mute"])
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answer every discovery with a server error that still carries the sentinel.
    pub fn failing_discovery(mut self, err: &str) -> Self {
        self.discover_err = Some(err.to_string());
        self
    }

    pub fn seen(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }

    /// Serve TCP connections on an ephemeral loopback port.
    pub async fn listen(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let stub = self.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(stub.clone().serve(stream));
            }
        });
        addr
    }

    /// Serve one in-memory pipe; returns the client end.
    pub fn pipe(&self) -> DuplexStream {
        let (client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(self.clone().serve(server));
        client
    }

    pub async fn serve<S>(self, mut stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            let req: Request = loop {
                match decode_frame::<Request>(&buf) {
                    Ok((req, used)) => {
                        buf.drain(..used);
                        break req;
                    }
                    Err(FrameDecodeError::NeedMore) => {}
                    Err(_) => return,
                }
                match stream.read_buf(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(_) => {}
                }
            };
            self.seen.lock().unwrap().push(req.clone());
            let Some(resp) = self.handle(&req).await else {
                continue;
            };
            if stream.write_all(&encode_frame(&resp).unwrap()).await.is_err() {
                return;
            }
        }
    }

    async fn handle(&self, req: &Request) -> Option<Response> {
        if let Some(name) = req.discover_target() {
            let reply = if self.registry.contains(name) {
                REGISTERED_SENTINEL
            } else {
                NOT_REGISTERED
            };
            let mut resp = Response::ok(req.seq, vec![Value::from(reply)]);
            if let Some(err) = &self.discover_err {
                resp.err = err.clone();
            }
            return Some(resp);
        }
        if !self.registry.contains(&req.method) {
            return Some(Response::error(
                req.seq,
                format!("rpc server: can't find method {}", req.method),
            ));
        }
        let resp = match req.method.as_str() {
            "rev" => Response::ok(req.seq, req.args.iter().rev().cloned().collect()),
            "add" => {
                let sum = req.args.iter().filter_map(Value::as_int).sum::<i64>();
                Response::ok(req.seq, vec![Value::Int(sum)])
            }
            "slow" => {
                tokio::time::sleep(self.delay).await;
                Response::ok(req.seq, vec![Value::from("late")])
            }
            "fail" => Response {
                seq: req.seq,
                replies: vec![Value::Int(1)],
                err: "division by zero".to_string(),
            },
            "mute" => return None,
            _ => Response::ok(req.seq, req.args.clone()),
        };
        Some(resp)
    }
}

pub fn short_config() -> ClientConfig {
    ClientConfig::default()
        .connect_timeout(Duration::from_millis(500))
        .write_timeout(Duration::from_millis(400))
        .read_timeout(Duration::from_millis(400))
}
