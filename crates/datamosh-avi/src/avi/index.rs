//! Legacy AVI index (`idx1`).

use crate::riff::{self, read_u32_le, Chunk, FourCc};
use crate::Result;
use bytes::{BufMut, BytesMut};

/// One 16-byte `idx1` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexEntry {
    /// Chunk id of the indexed chunk (e.g. `00dc`).
    pub tag: FourCc,
    pub flags: u32,
    /// Offset of the chunk, relative to the `movi` list type.
    pub offset: u32,
    /// Payload size of the chunk.
    pub size: u32,
}

impl IndexEntry {
    /// Entry stride in bytes.
    pub const SIZE: usize = 16;
    /// `AVIIF_KEYFRAME`.
    pub const FLAG_KEYFRAME: u32 = 0x10;

    fn parse(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            tag: FourCc::read(bytes, 0)?,
            flags: read_u32_le(bytes, 4)?,
            offset: read_u32_le(bytes, 8)?,
            size: read_u32_le(bytes, 12)?,
        })
    }

    /// Serialize the entry in on-disk layout.
    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.tag.0);
        buf.put_u32_le(self.flags);
        buf.put_u32_le(self.offset);
        buf.put_u32_le(self.size);
    }

    pub fn is_keyframe(&self) -> bool {
        self.flags & Self::FLAG_KEYFRAME != 0
    }
}

/// The index chunk and its decoded entries, in on-disk order.
#[derive(Debug, Clone)]
pub struct FrameIndex {
    /// The `idx1` chunk header.
    pub chunk: Chunk,
    pub entries: Vec<IndexEntry>,
}

impl FrameIndex {
    /// Locate the index chunk belonging to the `movi` list.
    ///
    /// The chunk normally starts right where `movi` ends. When that position
    /// holds something else (for instance after a rewrite that left the
    /// `movi` size stale) the index is found by scanning forward from the
    /// first `movi` child.
    ///
    /// The scan takes the first `idx1` tag whose declared payload fits in the
    /// buffer, falling back to the first tag seen if none does. A frame payload
    /// that happens to spell `idx1` followed by a plausible size is still
    /// mistaken for the index.
    pub fn locate(data: &[u8], movi: &Chunk) -> Result<Chunk> {
        let expected = movi.end();
        if FourCc::read(data, expected) == Some(FourCc::IDX1) {
            return riff::find(data, FourCc::IDX1, expected);
        }

        let first = riff::find(data, FourCc::IDX1, movi.children_offset())?;
        let mut candidate = first;
        loop {
            if candidate.data_end() <= data.len() {
                return Ok(candidate);
            }
            match riff::find(data, FourCc::IDX1, candidate.offset + 4) {
                Ok(next) => candidate = next,
                Err(_) => break,
            }
        }

        tracing::warn!(
            "no idx1 chunk fits in the file; using the one at offset {}",
            first.offset
        );
        Ok(first)
    }

    /// Decode `chunk` as a run of 16-byte entries.
    ///
    /// Trailing bytes that do not fill a whole entry are ignored, as are
    /// entries that would extend past the end of the buffer.
    pub fn read(data: &[u8], chunk: Chunk) -> Self {
        let declared = chunk.size as usize / IndexEntry::SIZE;
        let available = data.len().saturating_sub(chunk.data_offset()) / IndexEntry::SIZE;
        let count = declared.min(available);
        if count < declared {
            tracing::warn!(
                "index declares {} entries but only {} fit in the file",
                declared,
                count
            );
        }

        let base = chunk.data_offset();
        let entries = (0..count)
            .filter_map(|i| {
                let at = base + i * IndexEntry::SIZE;
                IndexEntry::parse(&data[at..at + IndexEntry::SIZE])
            })
            .collect();

        Self { chunk, entries }
    }

    /// First byte after the last decoded entry.
    pub fn entries_end(&self) -> usize {
        self.chunk.data_offset() + self.entries.len() * IndexEntry::SIZE
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries flagged as keyframes.
    pub fn keyframe_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_keyframe()).count()
    }
}
