//! Minimal single-stream AVI writer.
//!
//! Produces files in the same profile the transcoding step emits (one
//! `vids` stream, `00dc` frame chunks, `idx1` index), with synthetic MPEG-4
//! style payloads. Used to build fixtures for tests and benchmarks.

use crate::avi::{FrameKind, IndexEntry, MainHeader};
use crate::riff::FourCc;
use bytes::{BufMut, BytesMut};

/// Start code marker written for [`FrameKind::Other`] frames (user data).
const OTHER_MARKER: u8 = 0xb2;

#[derive(Debug, Clone)]
struct FramePlan {
    kind: FrameKind,
    payload: Vec<u8>,
    junk_after: usize,
}

/// Builder for synthetic AVI files.
#[derive(Debug, Clone)]
pub struct AviBuilder {
    width: u32,
    height: u32,
    microsec_per_frame: u32,
    frames: Vec<FramePlan>,
    declared_frames: Option<u32>,
    with_index: bool,
    trailing: Vec<u8>,
}

impl Default for AviBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AviBuilder {
    pub fn new() -> Self {
        Self {
            width: 640,
            height: 360,
            microsec_per_frame: 41_708,
            frames: Vec::new(),
            declared_frames: None,
            with_index: true,
            trailing: Vec::new(),
        }
    }

    /// Set frame dimensions.
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the frame period.
    pub fn microsec_per_frame(mut self, us: u32) -> Self {
        self.microsec_per_frame = us;
        self
    }

    /// Append a frame of `kind`: a start code followed by `filler` bytes.
    pub fn frame(mut self, kind: FrameKind, filler: usize) -> Self {
        let marker = match kind {
            FrameKind::Sync => FrameKind::SYNC_MARKER,
            FrameKind::Delta => FrameKind::DELTA_MARKER,
            FrameKind::Other => OTHER_MARKER,
        };
        let n = self.frames.len();
        let mut payload = vec![0x00, 0x00, 0x01, marker];
        // High-bit filler never spells an ASCII chunk tag.
        payload.extend((0..filler).map(|i| 0x80 | ((n + i) as u8 & 0x7f)));
        self.frames.push(FramePlan {
            kind,
            payload,
            junk_after: 0,
        });
        self
    }

    /// Append frames for each kind in order, with a fixed filler size.
    pub fn frames(self, kinds: &[FrameKind], filler: usize) -> Self {
        kinds.iter().fold(self, |b, &kind| b.frame(kind, filler))
    }

    /// Append an empty (drop) frame.
    pub fn drop_frame(mut self) -> Self {
        self.frames.push(FramePlan {
            kind: FrameKind::Other,
            payload: Vec::new(),
            junk_after: 0,
        });
        self
    }

    /// Insert a `JUNK` chunk of `len` payload bytes after the last frame added.
    pub fn junk(mut self, len: usize) -> Self {
        if let Some(last) = self.frames.last_mut() {
            last.junk_after = len;
        }
        self
    }

    /// Declare a frame count different from the number of frames written.
    pub fn declared_frames(mut self, count: u32) -> Self {
        self.declared_frames = Some(count);
        self
    }

    /// Omit the `idx1` chunk.
    pub fn without_index(mut self) -> Self {
        self.with_index = false;
        self
    }

    /// Append raw bytes after the index.
    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    /// Serialize the file.
    pub fn build(self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(4096);

        buf.put_slice(&FourCc::RIFF.0);
        buf.put_u32_le(0); // placeholder size
        buf.put_slice(&FourCc::AVI.0);

        self.write_hdrl(&mut buf);
        let entries = self.write_movi(&mut buf);

        if self.with_index {
            buf.put_slice(&FourCc::IDX1.0);
            buf.put_u32_le((entries.len() * IndexEntry::SIZE) as u32);
            for entry in &entries {
                entry.write(&mut buf);
            }
        }

        let riff_size = (buf.len() - 8) as u32;
        buf[4..8].copy_from_slice(&riff_size.to_le_bytes());

        buf.put_slice(&self.trailing);
        buf.to_vec()
    }

    fn begin_list(buf: &mut BytesMut, list_type: FourCc) -> usize {
        let start = buf.len();
        buf.put_slice(&FourCc::LIST.0);
        buf.put_u32_le(0);
        buf.put_slice(&list_type.0);
        start
    }

    fn end_list(buf: &mut BytesMut, start: usize) {
        let size = (buf.len() - start - 8) as u32;
        buf[start + 4..start + 8].copy_from_slice(&size.to_le_bytes());
    }

    fn write_hdrl(&self, buf: &mut BytesMut) {
        let total = self
            .declared_frames
            .unwrap_or(self.frames.len() as u32);
        let max_frame = self
            .frames
            .iter()
            .map(|f| f.payload.len())
            .max()
            .unwrap_or(0) as u32;
        let flags = if self.with_index {
            MainHeader::FLAG_HAS_INDEX
        } else {
            0
        };

        let hdrl = Self::begin_list(buf, FourCc::HDRL);

        // avih
        buf.put_slice(&FourCc::AVIH.0);
        buf.put_u32_le(56);
        buf.put_u32_le(self.microsec_per_frame);
        buf.put_u32_le(0); // max bytes per sec
        buf.put_u32_le(0); // padding granularity
        buf.put_u32_le(flags);
        buf.put_u32_le(total);
        buf.put_u32_le(0); // initial frames
        buf.put_u32_le(1); // streams
        buf.put_u32_le(max_frame);
        buf.put_u32_le(self.width);
        buf.put_u32_le(self.height);
        buf.put_bytes(0, 16); // reserved

        let strl = Self::begin_list(buf, FourCc::STRL);

        // strh
        buf.put_slice(&FourCc::STRH.0);
        buf.put_u32_le(56);
        buf.put_slice(&FourCc::VIDS.0);
        buf.put_slice(b"XVID");
        buf.put_u32_le(0); // flags
        buf.put_u16_le(0); // priority
        buf.put_u16_le(0); // language
        buf.put_u32_le(0); // initial frames
        buf.put_u32_le(self.microsec_per_frame); // scale
        buf.put_u32_le(1_000_000); // rate
        buf.put_u32_le(0); // start
        buf.put_u32_le(total); // length
        buf.put_u32_le(max_frame);
        buf.put_u32_le(u32::MAX); // quality: default
        buf.put_u32_le(0); // sample size
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        buf.put_u16_le(self.width as u16);
        buf.put_u16_le(self.height as u16);

        // strf (BITMAPINFOHEADER)
        buf.put_slice(&FourCc::STRF.0);
        buf.put_u32_le(40);
        buf.put_u32_le(40);
        buf.put_i32_le(self.width as i32);
        buf.put_i32_le(self.height as i32);
        buf.put_u16_le(1); // planes
        buf.put_u16_le(24); // bit count
        buf.put_slice(b"XVID");
        buf.put_u32_le(self.width * self.height * 3);
        buf.put_bytes(0, 16);

        Self::end_list(buf, strl);
        Self::end_list(buf, hdrl);
    }

    fn write_movi(&self, buf: &mut BytesMut) -> Vec<IndexEntry> {
        let movi = Self::begin_list(buf, FourCc::MOVI);
        let movi_type = movi + 8;
        let mut entries = Vec::with_capacity(self.frames.len());

        for frame in &self.frames {
            let offset = buf.len();
            buf.put_slice(&FourCc::COMPRESSED_VIDEO.0);
            buf.put_u32_le(frame.payload.len() as u32);
            buf.put_slice(&frame.payload);
            if frame.payload.len() % 2 == 1 {
                buf.put_u8(0);
            }

            entries.push(IndexEntry {
                tag: FourCc::COMPRESSED_VIDEO,
                flags: if frame.kind == FrameKind::Sync {
                    IndexEntry::FLAG_KEYFRAME
                } else {
                    0
                },
                offset: (offset - movi_type) as u32,
                size: frame.payload.len() as u32,
            });

            if frame.junk_after > 0 {
                buf.put_slice(&FourCc::JUNK.0);
                buf.put_u32_le(frame.junk_after as u32);
                buf.put_bytes(0xee, frame.junk_after);
                if frame.junk_after % 2 == 1 {
                    buf.put_u8(0);
                }
            }
        }

        Self::end_list(buf, movi);
        entries
    }
}
