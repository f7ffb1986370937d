//! Frame catalog: every video frame chunk in `movi`, in display order.

use crate::riff::{self, ByteSpan, FourCc};
use crate::{Error, Result};

/// Encoded flavor of a frame, read from the start code in its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameKind {
    /// Self-contained keyframe.
    Sync,
    /// Frame predicted from the previous decoded frame.
    Delta,
    /// Anything else: empty drop frames, unknown start codes.
    Other,
}

impl FrameKind {
    /// Payload offset of the marker byte (the fourth byte of the first
    /// MPEG-4 Part 2 start code, `00 00 01 xx`).
    pub const MARKER_OFFSET: usize = 3;

    /// Visual object sequence start code; the encoder emits it ahead of
    /// every keyframe.
    pub const SYNC_MARKER: u8 = 0xb0;
    /// Video object plane start code.
    pub const DELTA_MARKER: u8 = 0xb6;

    /// Classify a marker byte. Unrecognized values map to [`FrameKind::Other`].
    pub fn from_marker(marker: u8) -> Self {
        match marker {
            Self::SYNC_MARKER => Self::Sync,
            Self::DELTA_MARKER => Self::Delta,
            _ => Self::Other,
        }
    }

    /// Classify a frame payload.
    pub fn classify(payload: &[u8]) -> Self {
        payload
            .get(Self::MARKER_OFFSET)
            .copied()
            .map_or(Self::Other, Self::from_marker)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Delta => "delta",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame chunk: its padded span in the file and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameRecord {
    pub span: ByteSpan,
    pub kind: FrameKind,
}

impl FrameRecord {
    /// Borrow the frame's raw chunk bytes (header, payload, pad).
    pub fn bytes<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.span.range()]
    }
}

/// Ordered frame records; index = display order.
#[derive(Debug, Clone, Default)]
pub struct FrameCatalog {
    pub frames: Vec<FrameRecord>,
}

impl FrameCatalog {
    /// Walk the frame stream from `start`, collecting exactly `total_frames`
    /// compressed video chunks.
    ///
    /// Frame boundaries come only from declared sizes: after each frame the
    /// search resumes right after its padded span. The walk fails with
    /// [`Error::TruncatedStream`] if a frame is missing, overruns the buffer,
    /// or reaches `boundary` (the offset of the trailing index chunk).
    pub fn build(data: &[u8], start: usize, total_frames: u32, boundary: usize) -> Result<Self> {
        let limit = boundary.min(data.len());
        // Every frame needs at least a chunk header, so the region bounds how
        // many records can exist regardless of the declared count.
        let fits = limit.saturating_sub(start) / riff::CHUNK_HEADER_SIZE;
        let mut frames = Vec::with_capacity(fits.min(total_frames as usize));
        let mut cursor = start;

        for found in 0..total_frames {
            let truncated = |offset: usize| Error::TruncatedStream {
                expected: total_frames,
                found,
                offset,
            };

            let chunk = riff::find(data, FourCc::COMPRESSED_VIDEO, cursor)
                .map_err(|_| truncated(cursor))?;
            if chunk.offset >= limit || chunk.end() > limit {
                return Err(truncated(chunk.offset));
            }

            let kind = chunk
                .data(data)
                .map_or(FrameKind::Other, FrameKind::classify);

            frames.push(FrameRecord {
                span: chunk.span(),
                kind,
            });
            cursor = chunk.end();
        }

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.frames.iter()
    }

    /// Number of frames of the given kind.
    pub fn count(&self, kind: FrameKind) -> usize {
        self.frames.iter().filter(|f| f.kind == kind).count()
    }

    /// Indices of all sync frames.
    pub fn sync_indices(&self) -> Vec<u32> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind == FrameKind::Sync)
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Frame kinds in order.
    pub fn kinds(&self) -> Vec<FrameKind> {
        self.frames.iter().map(|f| f.kind).collect()
    }
}
