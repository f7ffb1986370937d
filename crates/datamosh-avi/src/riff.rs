//! Generic RIFF chunk framing.
//!
//! A chunk is an 8-byte header (four-character tag followed by a little-endian
//! `u32` payload size) and then the payload, padded to an even length. `LIST`
//! chunks carry a second four-character code (the list type) as the first four
//! payload bytes, followed by nested chunks.
//!
//! Nothing here knows about AVI semantics; the locator simply scans a byte
//! buffer for a tag and decodes the framing around it.

use crate::{Error, Result};
use std::ops::Range;

/// Size of a chunk header (tag + size).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Four-character chunk code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const RIFF: Self = Self(*b"RIFF");
    pub const LIST: Self = Self(*b"LIST");
    pub const JUNK: Self = Self(*b"JUNK");
    pub const AVI: Self = Self(*b"AVI ");
    pub const HDRL: Self = Self(*b"hdrl");
    pub const AVIH: Self = Self(*b"avih");
    pub const STRL: Self = Self(*b"strl");
    pub const STRH: Self = Self(*b"strh");
    pub const STRF: Self = Self(*b"strf");
    pub const MOVI: Self = Self(*b"movi");
    pub const IDX1: Self = Self(*b"idx1");
    pub const VIDS: Self = Self(*b"vids");
    /// Compressed video frame of stream 0.
    pub const COMPRESSED_VIDEO: Self = Self(*b"00dc");

    /// Read a code at `offset`, if the buffer is long enough.
    pub fn read(data: &[u8], offset: usize) -> Option<Self> {
        let bytes = data.get(offset..offset.checked_add(4)?)?;
        Some(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Get the code as a string.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl std::fmt::Display for FourCc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view `[offset, offset + size)` over the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteSpan {
    pub offset: usize,
    pub size: usize,
}

impl ByteSpan {
    pub fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    /// First byte past the span.
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// A chunk header found in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk tag.
    pub tag: FourCc,
    /// Offset of the tag.
    pub offset: usize,
    /// Declared payload size (excluding header and pad byte).
    pub size: u32,
}

impl Chunk {
    /// Offset where the payload starts.
    pub fn data_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_SIZE
    }

    /// First byte past the declared payload.
    pub fn data_end(&self) -> usize {
        self.data_offset() + self.size as usize
    }

    /// Span covering header, payload and pad byte.
    pub fn span(&self) -> ByteSpan {
        ByteSpan::new(self.offset, CHUNK_HEADER_SIZE + padded(self.size as usize))
    }

    /// First byte past the padded chunk.
    pub fn end(&self) -> usize {
        self.span().end()
    }

    /// Borrow the declared payload, if it lies within `data`.
    pub fn data<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        data.get(self.data_offset()..self.data_end())
    }

    /// List type of a `LIST` (or `RIFF`) chunk.
    pub fn list_type(&self, data: &[u8]) -> Option<FourCc> {
        FourCc::read(data, self.data_offset())
    }

    /// Offset of the first nested chunk of a `LIST` (or `RIFF`) chunk.
    pub fn children_offset(&self) -> usize {
        self.data_offset() + 4
    }
}

/// Round a payload size up to the RIFF word alignment.
pub fn padded(size: usize) -> usize {
    size + (size & 1)
}

/// Read a little-endian `u16` at `offset`.
pub fn read_u16_le(data: &[u8], offset: usize) -> Option<u16> {
    let b = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

/// Read a little-endian `u32` at `offset`.
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
    let b = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Read a little-endian `i32` at `offset`.
pub fn read_i32_le(data: &[u8], offset: usize) -> Option<i32> {
    read_u32_le(data, offset).map(|v| v as i32)
}

/// Find the first chunk tagged `tag` at or after `from`.
///
/// This is a plain byte scan: the first occurrence of the tag whose size
/// field is readable is taken as the chunk. The declared size is not checked
/// against the buffer length; callers decide whether an overrun is fatal.
pub fn find(data: &[u8], tag: FourCc, from: usize) -> Result<Chunk> {
    let not_found = || Error::ChunkNotFound { tag, from };
    let start = from.min(data.len());

    let pos = data[start..]
        .windows(4)
        .position(|w| w == tag.0)
        .map(|p| p + start)
        .ok_or_else(not_found)?;

    let size = read_u32_le(data, pos + 4).ok_or_else(not_found)?;

    Ok(Chunk {
        tag,
        offset: pos,
        size,
    })
}

/// Find the first `LIST` chunk of type `list_type` at or after `from`.
pub fn find_list(data: &[u8], list_type: FourCc, from: usize) -> Result<Chunk> {
    let mut cursor = from;
    loop {
        let list = find(data, FourCc::LIST, cursor).map_err(|_| Error::ChunkNotFound {
            tag: list_type,
            from,
        })?;
        if list.list_type(data) == Some(list_type) {
            return Ok(list);
        }
        cursor = list.offset + 4;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_chunk() {
        let data = b"xxxxJUNK\x03\x00\x00\x00abc\x00avih\x04\x00\x00\x00wxyz";
        let chunk = find(data, FourCc::AVIH, 0).unwrap();
        assert_eq!(chunk.offset, 16);
        assert_eq!(chunk.size, 4);
        assert_eq!(chunk.data(data), Some(&b"wxyz"[..]));
        assert_eq!(chunk.end(), data.len());
    }

    #[test]
    fn test_find_respects_start_offset() {
        let data = b"00dc\x00\x00\x00\x0000dc\x02\x00\x00\x00ab";
        let first = find(data, FourCc::COMPRESSED_VIDEO, 0).unwrap();
        assert_eq!(first.offset, 0);
        let second = find(data, FourCc::COMPRESSED_VIDEO, first.end()).unwrap();
        assert_eq!(second.offset, 8);
        assert_eq!(second.size, 2);
    }

    #[test]
    fn test_find_missing_tag() {
        let data = b"RIFF\x04\x00\x00\x00AVI ";
        let err = find(data, FourCc::IDX1, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::ChunkNotFound { tag, from: 0 } if tag == FourCc::IDX1
        ));
    }

    #[test]
    fn test_find_tag_without_size_field() {
        // Tag present but the buffer ends before its size field.
        let data = b"abcdidx1\x01\x00";
        assert!(find(data, FourCc::IDX1, 0).is_err());
    }

    #[test]
    fn test_find_past_end() {
        let data = b"avih\x00\x00\x00\x00";
        assert!(find(data, FourCc::AVIH, 100).is_err());
    }

    #[test]
    fn test_odd_chunk_span_is_padded() {
        let chunk = Chunk {
            tag: FourCc::COMPRESSED_VIDEO,
            offset: 10,
            size: 5,
        };
        assert_eq!(chunk.data_end(), 23);
        assert_eq!(chunk.span(), ByteSpan::new(10, 14));
        assert_eq!(chunk.end(), 24);
    }

    #[test]
    fn test_find_list_skips_other_list_types() {
        let mut data = Vec::new();
        data.extend_from_slice(b"LIST\x04\x00\x00\x00INFO");
        data.extend_from_slice(b"LIST\x04\x00\x00\x00movi");
        let list = find_list(&data, FourCc::MOVI, 0).unwrap();
        assert_eq!(list.offset, 12);
        assert_eq!(list.children_offset(), 24);
        assert!(find_list(&data, FourCc::HDRL, 0).is_err());
    }

    #[test]
    fn test_read_helpers() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xff];
        assert_eq!(read_u16_le(&data, 0), Some(0x0201));
        assert_eq!(read_u32_le(&data, 0), Some(0x04030201));
        assert_eq!(read_u32_le(&data, 2), None);
        assert_eq!(read_i32_le(&[0xff, 0xff, 0xff, 0xff], 0), Some(-1));
        assert_eq!(FourCc::read(&data, 3), None);
    }

    #[test]
    fn test_fourcc_display() {
        assert_eq!(FourCc::COMPRESSED_VIDEO.to_string(), "00dc");
        assert_eq!(FourCc([0xff, 0, 0, 0]).as_str(), "????");
    }
}
