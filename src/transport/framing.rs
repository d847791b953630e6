//! Length-prefixed message framing.
//!
//! Wire format: a 4-byte big-endian payload length followed by the payload,
//! a UTF-8 JSON object (see `protocol.rs`). The raw `read_frame`/`write_frame`
//! pair never looks inside the payload so the relay can forward frames
//! verbatim; `send`/`recv` add the JSON encoding on top for clients.
//!
//! End of stream is reported as `Ok(None)`, whether the peer closed between
//! frames or in the middle of one. A truncated frame is never surfaced as a
//! partial message.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::Message;
use crate::transport::ChannelError;

/// Largest accepted payload. Real messages are well under 200 bytes.
pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024;

/// Write one frame as a single buffer.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let len = payload.len();
    if len == 0 || len > MAX_MESSAGE_SIZE as usize {
        return Err(ChannelError::Protocol(format!(
            "refusing to send a {len} byte frame (max {MAX_MESSAGE_SIZE})"
        )));
    }
    let mut frame = Vec::with_capacity(4 + len);
    frame.extend_from_slice(&(len as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, or `None` if the stream ended first.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, ChannelError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut len_buf = [0u8; 4];
    if !read_exact_or_eof(reader, &mut len_buf).await? {
        return Ok(None);
    }
    let len = u32::from_be_bytes(len_buf);
    if len == 0 {
        return Err(ChannelError::Protocol("zero-length frame".into()));
    }
    if len > MAX_MESSAGE_SIZE {
        return Err(ChannelError::Protocol(format!(
            "frame too large: {len} bytes (max {MAX_MESSAGE_SIZE})"
        )));
    }
    let mut payload = vec![0u8; len as usize];
    if !read_exact_or_eof(reader, &mut payload).await? {
        return Ok(None);
    }
    Ok(Some(payload))
}

/// Fill `buf` completely. Returns `false` if the stream closed first.
async fn read_exact_or_eof<R>(reader: &mut R, buf: &mut [u8]) -> Result<bool, ChannelError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    match reader.read_exact(buf).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Encode and write one message.
pub async fn send<W>(writer: &mut W, msg: &Message) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let payload = msg
        .to_payload()
        .map_err(|e| ChannelError::Protocol(format!("encode {}: {e}", msg.kind())))?;
    write_frame(writer, &payload).await
}

/// Read and decode one message, or `None` at end of stream.
pub async fn recv<R>(reader: &mut R) -> Result<Option<Message>, ChannelError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let Some(payload) = read_frame(reader).await? else {
        return Ok(None);
    };
    Message::from_payload(&payload)
        .map(Some)
        .map_err(|e| ChannelError::Protocol(format!("malformed payload: {e}")))
}
