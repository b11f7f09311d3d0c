//! jRPC wire messages: request, response and the opaque argument/reply value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix that turns a method name into a registry lookup instead of an invocation.
pub const DISCOVER_PREFIX: &str = "Discover:";

/// First reply of a discovery response when the method is registered. Compared byte-for-byte.
pub const REGISTERED_SENTINEL: &str = "The function has been registered!";

/// Opaque argument or reply value. Variants are tagged on the wire; bincode is not
/// self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Method invocation. `seq` correlates the reply; the server echoes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub seq: u64,
    pub method: String,
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(seq: u64, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            seq,
            method: method.into(),
            args,
        }
    }

    /// Registry lookup for `method`: prefixed name, no arguments.
    pub fn discover(seq: u64, method: &str) -> Self {
        Self {
            seq,
            method: format!("{DISCOVER_PREFIX}{method}"),
            args: Vec::new(),
        }
    }

    /// Method name with the discovery marker stripped, if this is a lookup.
    pub fn discover_target(&self) -> Option<&str> {
        self.method.strip_prefix(DISCOVER_PREFIX)
    }
}

/// Reply to a [`Request`]. A non-empty `err` means the server failed the call and
/// `replies` must not be interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub seq: u64,
    pub replies: Vec<Value>,
    pub err: String,
}

impl Response {
    pub fn ok(seq: u64, replies: Vec<Value>) -> Self {
        Self {
            seq,
            replies,
            err: String::new(),
        }
    }

    pub fn error(seq: u64, err: impl Into<String>) -> Self {
        Self {
            seq,
            replies: Vec::new(),
            err: err.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_empty()
    }

    /// True only if the first reply is exactly the registration sentinel.
    pub fn is_registered(&self) -> bool {
        self.is_ok()
            && matches!(self.replies.first(), Some(Value::Str(s)) if s == REGISTERED_SENTINEL)
    }
}
