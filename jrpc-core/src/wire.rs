//! One jRPC message per frame: a little-endian `u32` byte count, then the bincode body.
//! Requests go out and responses come back in the same layout.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) const LEN_SIZE: usize = 4;
/// Largest body either side will accept (16 MiB).
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Serialize a request or response and prepend its length.
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<Vec<u8>, FrameEncodeError> {
    let body_len = bincode::serialized_size(msg)?;
    let len = u32::try_from(body_len)
        .ok()
        .filter(|&n| n <= MAX_FRAME_LEN)
        .ok_or(FrameEncodeError::TooLarge(body_len))?;
    let mut out = Vec::with_capacity(LEN_SIZE + len as usize);
    out.extend_from_slice(&len.to_le_bytes());
    bincode::serialize_into(&mut out, msg)?;
    Ok(out)
}

/// Why an outgoing message could not be framed.
#[derive(Debug, thiserror::Error)]
pub enum FrameEncodeError {
    #[error("serialize message: {0}")]
    Encode(#[from] bincode::Error),
    #[error("frame too large: {0} bytes")]
    TooLarge(u64),
}

/// Pull the first complete message off `bytes`, returning it with the frame's total size.
/// `NeedMore` means the frame is still arriving; keep the bytes and read again.
pub fn decode_frame<T: DeserializeOwned>(bytes: &[u8]) -> Result<(T, usize), FrameDecodeError> {
    let Some((head, rest)) = bytes.split_first_chunk::<LEN_SIZE>() else {
        return Err(FrameDecodeError::NeedMore);
    };
    let len = u32::from_le_bytes(*head);
    if len > MAX_FRAME_LEN {
        return Err(FrameDecodeError::TooLarge(len));
    }
    let body = rest.get(..len as usize).ok_or(FrameDecodeError::NeedMore)?;
    Ok((bincode::deserialize(body)?, LEN_SIZE + body.len()))
}

/// Why the bytes at the front of a buffer did not yield a message.
#[derive(Debug, thiserror::Error)]
pub enum FrameDecodeError {
    #[error("frame incomplete")]
    NeedMore,
    #[error("frame too large: {0} bytes")]
    TooLarge(u32),
    #[error("malformed message body: {0}")]
    Decode(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Request, Response, Value};

    fn sample_request() -> Request {
        Request::new(
            3,
            "rev",
            vec![Value::Int(1), Value::from("two"), Value::List(vec![Value::Bool(true)])],
        )
    }

    #[test]
    fn roundtrip_request() {
        let req = sample_request();
        let frame = encode_frame(&req).unwrap();
        let (decoded, n): (Request, usize) = decode_frame(&frame).unwrap();
        assert_eq!(n, frame.len());
        assert_eq!(decoded, req);
    }

    #[test]
    fn partial_read_need_more() {
        let frame = encode_frame(&sample_request()).unwrap();
        assert!(matches!(
            decode_frame::<Request>(&frame[..2]),
            Err(FrameDecodeError::NeedMore)
        ));
        assert!(matches!(
            decode_frame::<Request>(&frame[..LEN_SIZE]),
            Err(FrameDecodeError::NeedMore)
        ));
        assert!(matches!(
            decode_frame::<Request>(&frame[..frame.len() - 1]),
            Err(FrameDecodeError::NeedMore)
        ));
    }

    #[test]
    fn oversized_length_rejected() {
        let mut bytes = (MAX_FRAME_LEN + 1).to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 8]);
        assert!(matches!(
            decode_frame::<Response>(&bytes),
            Err(FrameDecodeError::TooLarge(_))
        ));
    }

    #[test]
    fn oversized_body_refused_on_encode() {
        let big = Request::new(1, "blob", vec![Value::Bytes(vec![0; MAX_FRAME_LEN as usize])]);
        assert!(matches!(
            encode_frame(&big),
            Err(FrameEncodeError::TooLarge(n)) if n > MAX_FRAME_LEN as u64
        ));
    }

    #[test]
    fn multiple_messages() {
        let a = sample_request();
        let b = Response::error(4, "no such method");
        let fa = encode_frame(&a).unwrap();
        let fb = encode_frame(&b).unwrap();
        let mut buf = Vec::new();
        buf.extend_from_slice(&fa);
        buf.extend_from_slice(&fb);
        let (m1, n1): (Request, usize) = decode_frame(&buf).unwrap();
        assert_eq!(n1, fa.len());
        let (m2, n2): (Response, usize) = decode_frame(&buf[n1..]).unwrap();
        assert_eq!(n2, fb.len());
        assert_eq!(m1.method, "rev");
        assert!(!m2.is_ok());
    }
}
