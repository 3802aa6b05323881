//! Splitting an encoded icon into fixed-size image frames

use xldeck_transport::protocol::{
    ImageFrameHeader, FRAME_HEADER_SIZE, FRAME_PAYLOAD_SIZE, FRAME_SIZE,
};
use zerocopy::IntoBytes;

/// One 1024-byte output report
pub type Frame = [u8; FRAME_SIZE];

/// Lazily yields the frames for one key image
///
/// Sequence numbers start at 0 and are contiguous, only the final frame has
/// `is_last` set, and the payload lengths sum to the input length. Unused
/// payload space is zero-filled.
pub struct FrameChunker<'a> {
    key: u8,
    payload: &'a [u8],
    cursor: usize,
    sequence: u16,
}

impl<'a> FrameChunker<'a> {
    pub fn new(key: u8, payload: &'a [u8]) -> Self {
        Self {
            key,
            payload,
            cursor: 0,
            sequence: 0,
        }
    }

    /// Number of frames needed for `len` payload bytes
    pub fn frame_count(len: usize) -> usize {
        len.div_ceil(FRAME_PAYLOAD_SIZE)
    }
}

impl Iterator for FrameChunker<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let remaining = self.payload.len() - self.cursor;
        if remaining == 0 {
            return None;
        }

        let chunk_len = remaining.min(FRAME_PAYLOAD_SIZE);
        let is_last = remaining <= FRAME_PAYLOAD_SIZE;
        let header = ImageFrameHeader::new(self.key, is_last, chunk_len as u16, self.sequence);

        let mut frame = [0u8; FRAME_SIZE];
        frame[..FRAME_HEADER_SIZE].copy_from_slice(header.as_bytes());
        frame[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + chunk_len]
            .copy_from_slice(&self.payload[self.cursor..self.cursor + chunk_len]);

        self.cursor += chunk_len;
        self.sequence = self.sequence.wrapping_add(1);
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = Self::frame_count(self.payload.len() - self.cursor);
        (n, Some(n))
    }
}

impl ExactSizeIterator for FrameChunker<'_> {}
