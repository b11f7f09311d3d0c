//! jRPC client: sends a method call over one established connection and waits for the
//! matching reply, with hard deadlines on connect, write and read.
//! Also asks the server whether a method is registered ("discover") without calling it.

pub mod blocking;
pub mod client;
pub mod codec;
pub mod config;
pub mod connector;
pub mod error;
pub mod protocol;
pub mod wire;

pub use client::Client;
pub use config::ClientConfig;
pub use connector::dial;
pub use error::{Result, RpcError};
pub use protocol::{Request, Response, Value, DISCOVER_PREFIX, REGISTERED_SENTINEL};

/// Build a `Vec<Value>` argument list from mixed expressions: `args![1, "x", true]`.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
