//! Synchronous client: same semantics as [`crate::Client`], driven by a private
//! current-thread runtime. Don't use from inside another tokio runtime.

use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::protocol::Value;

pub struct Client {
    rt: Runtime,
    inner: crate::client::Client<TcpStream>,
}

impl Client {
    /// Dial `addr` under the connect deadline; blocks until connected or failed.
    pub fn connect(addr: &str, config: ClientConfig) -> Result<Self> {
        let rt = runtime()?;
        let inner = rt.block_on(crate::client::Client::connect(addr, config))?;
        Ok(Self { rt, inner })
    }

    /// Wrap an already-open std connection.
    pub fn new(stream: std::net::TcpStream, config: ClientConfig) -> Result<Self> {
        let rt = runtime()?;
        stream.set_nonblocking(true)?;
        let stream = {
            let _guard = rt.enter();
            TcpStream::from_std(stream)?
        };
        Ok(Self {
            rt,
            inner: crate::client::Client::new(stream, config),
        })
    }

    pub fn call(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        self.rt.block_on(self.inner.call(method, args))
    }

    pub fn discover(&self, method: &str) -> bool {
        self.rt.block_on(self.inner.discover(method))
    }

    pub fn try_discover(&self, method: &str) -> Result<bool> {
        self.rt.block_on(self.inner.try_discover(method))
    }

    pub fn close(self) -> Result<()> {
        self.rt.block_on(self.inner.close())
    }
}

fn runtime() -> Result<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
