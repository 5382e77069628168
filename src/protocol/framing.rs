//! Framing codec
//!
//! Every message on the wire is `LEN || BODY`, where `LEN` is exactly four
//! ASCII decimal digits (zero-padded) giving the byte length of `BODY`.
//! The same framing is used in both directions.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::FrameError;

/// Largest body the 4-digit length field can describe.
pub const MAX_BODY_LEN: usize = 9999;

const LEN_DIGITS: usize = 4;

/// Encode a body into a complete frame.
///
/// Bodies longer than [`MAX_BODY_LEN`] are rejected rather than misencoded.
pub fn encode(body: &str) -> Result<Vec<u8>, FrameError> {
    if body.len() > MAX_BODY_LEN {
        return Err(FrameError::TooLarge(body.len()));
    }
    let mut frame = Vec::with_capacity(LEN_DIGITS + body.len());
    frame.extend_from_slice(format!("{:04}", body.len()).as_bytes());
    frame.extend_from_slice(body.as_bytes());
    Ok(frame)
}

/// Parse the 4-digit length field.
pub fn decode_length(field: &[u8; LEN_DIGITS]) -> Result<usize, FrameError> {
    let mut length = 0usize;
    for byte in field {
        if !byte.is_ascii_digit() {
            return Err(FrameError::BadLength(*field));
        }
        length = length * 10 + usize::from(byte - b'0');
    }
    Ok(length)
}

/// Read exactly one frame and return its body.
///
/// Returns `Ok(None)` when the peer disconnected cleanly before sending any
/// length byte, and for a zero-length frame; the protocol treats both as an
/// implicit exit. EOF after the frame has begun is reported as
/// [`FrameError::Incomplete`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<String>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut field = [0u8; LEN_DIGITS];
    let mut filled = 0;
    while filled < LEN_DIGITS {
        let n = reader.read(&mut field[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::Incomplete);
        }
        filled += n;
    }

    let length = decode_length(&field)?;
    if length == 0 {
        return Ok(None);
    }

    // The length field caps the body at 9999 bytes, so the peer-supplied
    // value never sizes an unbounded allocation.
    let mut body = vec![0u8; length];
    if let Err(e) = reader.read_exact(&mut body).await {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Err(FrameError::Incomplete);
        }
        return Err(FrameError::IoError(e));
    }

    match String::from_utf8(body) {
        Ok(text) => Ok(Some(text)),
        Err(_) => Err(FrameError::InvalidUtf8),
    }
}

/// Frame a body and write it out completely.
pub async fn write_frame<W>(writer: &mut W, body: &str) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode(body)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
