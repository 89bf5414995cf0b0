//! Length-prefixed framing primitive shared by file spools and queue messages.
//! A frame is a 4-byte big-endian length followed by that many payload bytes;
//! the payload itself is opaque to this module.

use std::io::{self, ErrorKind, Read, Write};

use crate::error::{Error, Result};

/// Sanity cap on a single frame's payload, to bound recovery work on corrupted
/// input. Chosen, not negotiated: nothing below ever allocates a buffer before
/// validating a decoded length against this cap.
pub const MAX_FRAME_LEN: u32 = 1 << 30;

/// Writes `htonl(bytes.len())` followed by `bytes` to `sink`.
///
/// On partial write `sink` is left corrupted: callers must not retry appends to
/// it without truncating first.
pub fn write_frame<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| Error::PayloadTooLarge {
        len: bytes.len(),
        max: MAX_FRAME_LEN as usize,
    })?;
    if len > MAX_FRAME_LEN {
        return Err(Error::PayloadTooLarge {
            len: bytes.len(),
            max: MAX_FRAME_LEN as usize,
        });
    }
    sink.write_all(&len.to_be_bytes()).map_err(Error::IoBare)?;
    sink.write_all(bytes).map_err(Error::IoBare)?;
    Ok(())
}

/// Reads the next frame from `source`.
///
/// Returns `Ok(None)` when `source` reports clean EOF before any length byte
/// (the natural end-of-stream case). Returns `CorruptedFrame` when EOF falls
/// between the length and the payload, or when the decoded length exceeds
/// [`MAX_FRAME_LEN`].
pub fn read_frame<R: Read>(source: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match read_exact_or_eof(source, &mut len_bytes)? {
        FillOutcome::Empty => return Ok(None),
        FillOutcome::Partial => return Err(Error::CorruptedFrame("truncated length prefix")),
        FillOutcome::Full => {}
    }

    let len = u32::from_be_bytes(len_bytes);
    if len > MAX_FRAME_LEN {
        return Err(Error::CorruptedFrame("length prefix exceeds sanity cap"));
    }

    let mut payload = vec![0u8; len as usize];
    source
        .read_exact(&mut payload)
        .map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => Error::CorruptedFrame("truncated frame payload"),
            _ => Error::IoBare(err),
        })?;
    Ok(Some(payload))
}

enum FillOutcome {
    /// Nothing at all was read: the source was at a clean boundary.
    Empty,
    /// Some but not all of the buffer was filled before EOF.
    Partial,
    Full,
}

fn read_exact_or_eof<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<FillOutcome> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::IoBare(err)),
        }
    }
    Ok(if filled == 0 {
        FillOutcome::Empty
    } else if filled < buf.len() {
        FillOutcome::Partial
    } else {
        FillOutcome::Full
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_then_end() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello").unwrap();

        let mut cursor = Cursor::new(buf);
        let frame = read_frame(&mut cursor).unwrap();
        assert_eq!(frame, Some(b"hello".to_vec()));

        let end = read_frame(&mut cursor).unwrap();
        assert_eq!(end, None);
    }

    #[test]
    fn empty_payload_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_frame(&mut cursor).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn oversized_length_prefix_is_corrupted_without_allocating() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_FRAME_LEN + 1).to_be_bytes());
        // No payload bytes follow: if the reader allocated the buffer before
        // checking the cap it would hang or OOM rather than error quickly.
        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, Error::CorruptedFrame(_)));
    }

    #[test]
    fn truncation_between_length_and_payload_is_corrupted() {
        let mut full = Vec::new();
        write_frame(&mut full, b"0123456789").unwrap();

        for cut in 1..full.len() {
            let mut cursor = Cursor::new(full[..cut].to_vec());
            let result = read_frame(&mut cursor);
            assert!(
                matches!(result, Err(Error::CorruptedFrame(_))),
                "truncation at {cut} should be CorruptedFrame, got {result:?}"
            );
        }
    }

    #[test]
    fn multiple_frames_concatenate() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"one").unwrap();
        write_frame(&mut buf, b"two").unwrap();
        write_frame(&mut buf, b"three").unwrap();

        let mut cursor = Cursor::new(buf);
        let mut frames = Vec::new();
        while let Some(frame) = read_frame(&mut cursor).unwrap() {
            frames.push(frame);
        }
        assert_eq!(frames, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }
}
