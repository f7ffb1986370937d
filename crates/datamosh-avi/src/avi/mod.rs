//! AVI container parsing.
//!
//! Three independent views are derived from one immutable buffer: the header
//! group, the frame catalog of the `movi` list, and the trailing `idx1` index.

mod catalog;
mod header;
mod index;

pub use catalog::{FrameCatalog, FrameKind, FrameRecord};
pub use header::{ContainerHeader, MainHeader, StreamFormat, StreamHeader};
pub use index::{FrameIndex, IndexEntry};

use crate::riff::{self, Chunk, FourCc};
use crate::Result;
use std::path::Path;

/// The `movi` list holding the frame chunks.
#[derive(Debug, Clone, Copy)]
pub struct FrameStream {
    pub list: Chunk,
}

impl FrameStream {
    /// Offset of the first chunk inside `movi`.
    pub fn payload_start(&self) -> usize {
        self.list.children_offset()
    }
}

/// Parsed views over an AVI buffer. Holds offsets only, never the bytes.
#[derive(Debug, Clone)]
pub struct AviFile {
    pub header: ContainerHeader,
    pub stream: FrameStream,
    pub catalog: FrameCatalog,
    pub index: FrameIndex,
    /// Length of the buffer the views were derived from.
    pub source_len: usize,
}

impl AviFile {
    /// Parse all views from `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = ContainerHeader::read(data)?;
        let list = riff::find_list(data, FourCc::MOVI, header.hdrl.end())?;
        let stream = FrameStream { list };

        let index_chunk = FrameIndex::locate(data, &list)?;
        let catalog = FrameCatalog::build(
            data,
            stream.payload_start(),
            header.total_frames(),
            index_chunk.offset,
        )?;
        let index = FrameIndex::read(data, index_chunk);

        tracing::debug!(
            "parsed AVI: {} frames ({} sync, {} delta), {} index entries",
            catalog.len(),
            catalog.count(FrameKind::Sync),
            catalog.count(FrameKind::Delta),
            index.len()
        );

        Ok(Self {
            header,
            stream,
            catalog,
            index,
            source_len: data.len(),
        })
    }

    /// Offset where the frame region ends and the index chunk begins.
    pub fn stream_end(&self) -> usize {
        self.index.chunk.offset
    }
}

/// An AVI buffer together with its parsed views.
#[derive(Debug, Clone)]
pub struct AviSource {
    pub data: Vec<u8>,
    pub file: AviFile,
}

impl AviSource {
    /// Read and parse the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Parse an in-memory buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let file = AviFile::parse(&data)?;
        Ok(Self { data, file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AviBuilder, Error};

    #[test]
    fn test_parse_views() {
        let data = AviBuilder::new()
            .frame(FrameKind::Sync, 20)
            .frame(FrameKind::Delta, 9)
            .frame(FrameKind::Other, 0)
            .build();
        let avi = AviFile::parse(&data).unwrap();

        assert_eq!(avi.catalog.len(), 3);
        assert_eq!(avi.index.len(), 3);
        assert_eq!(avi.source_len, data.len());
        assert_eq!(avi.catalog.frames[0].span.offset, avi.stream.payload_start());
        assert_eq!(avi.stream_end(), avi.stream.list.end());
        // idx1 offsets are relative to the movi list type
        let base = avi.stream.list.data_offset() as u32;
        for (entry, frame) in avi.index.entries.iter().zip(avi.catalog.iter()) {
            assert_eq!(base + entry.offset, frame.span.offset as u32);
        }
    }

    #[test]
    fn test_parse_without_index() {
        let data = AviBuilder::new()
            .frame(FrameKind::Sync, 8)
            .without_index()
            .build();
        let err = AviFile::parse(&data).unwrap_err();
        assert!(matches!(err, Error::ChunkNotFound { tag, .. } if tag == FourCc::IDX1));
    }

    #[test]
    fn test_open_missing_file() {
        let err = AviSource::open("/nonexistent/clip.avi").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
