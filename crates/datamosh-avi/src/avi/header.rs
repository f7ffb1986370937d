//! AVI header group (`LIST hdrl`) decoding.
//!
//! Layout of the structural prefix this reader resolves:
//!
//! ```text
//! RIFF <size> 'AVI '
//!   LIST <size> 'hdrl'
//!     avih <size> MainAVIHeader
//!     LIST <size> 'strl'
//!       strh <size> AVIStreamHeader
//!       strf <size> BITMAPINFOHEADER
//! ```
//!
//! Each sub-chunk is searched for starting at its parent's start offset and
//! must lie inside the parent, which keeps payload bytes that happen to spell
//! a tag from being mistaken for structure.

use crate::riff::{self, read_i32_le, read_u16_le, read_u32_le, ByteSpan, Chunk, FourCc};
use crate::{Error, Result};

/// Main AVI header (`avih`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MainHeader {
    pub microsec_per_frame: u32,
    pub max_bytes_per_sec: u32,
    pub padding_granularity: u32,
    pub flags: u32,
    pub total_frames: u32,
    pub initial_frames: u32,
    pub streams: u32,
    pub suggested_buffer_size: u32,
    pub width: u32,
    pub height: u32,
}

impl MainHeader {
    /// Bytes of `avih` payload that carry the fields above.
    pub const MIN_SIZE: usize = 40;
    /// Payload offset of the total frame count.
    pub const TOTAL_FRAMES_OFFSET: usize = 16;

    /// Flag: the file has an `idx1` index.
    pub const FLAG_HAS_INDEX: u32 = 0x10;

    fn parse(payload: &[u8]) -> Option<Self> {
        let field = |i: usize| read_u32_le(payload, i * 4);
        Some(Self {
            microsec_per_frame: field(0)?,
            max_bytes_per_sec: field(1)?,
            padding_granularity: field(2)?,
            flags: field(3)?,
            total_frames: field(4)?,
            initial_frames: field(5)?,
            streams: field(6)?,
            suggested_buffer_size: field(7)?,
            width: field(8)?,
            height: field(9)?,
        })
    }

    /// Frames per second derived from the frame period.
    pub fn fps(&self) -> f64 {
        if self.microsec_per_frame == 0 {
            0.0
        } else {
            1_000_000.0 / self.microsec_per_frame as f64
        }
    }

    /// Whether the header advertises an `idx1` index.
    pub fn has_index(&self) -> bool {
        self.flags & Self::FLAG_HAS_INDEX != 0
    }
}

/// Stream header (`strh`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamHeader {
    pub fcc_type: FourCc,
    pub fcc_handler: FourCc,
    pub flags: u32,
    pub priority: u16,
    pub language: u16,
    pub initial_frames: u32,
    pub scale: u32,
    pub rate: u32,
    pub start: u32,
    pub length: u32,
    pub suggested_buffer_size: u32,
    pub quality: u32,
    pub sample_size: u32,
}

impl StreamHeader {
    pub const MIN_SIZE: usize = 48;

    fn parse(payload: &[u8]) -> Option<Self> {
        Some(Self {
            fcc_type: FourCc::read(payload, 0)?,
            fcc_handler: FourCc::read(payload, 4)?,
            flags: read_u32_le(payload, 8)?,
            priority: read_u16_le(payload, 12)?,
            language: read_u16_le(payload, 14)?,
            initial_frames: read_u32_le(payload, 16)?,
            scale: read_u32_le(payload, 20)?,
            rate: read_u32_le(payload, 24)?,
            start: read_u32_le(payload, 28)?,
            length: read_u32_le(payload, 32)?,
            suggested_buffer_size: read_u32_le(payload, 36)?,
            quality: read_u32_le(payload, 40)?,
            sample_size: read_u32_le(payload, 44)?,
        })
    }

    pub fn is_video(&self) -> bool {
        self.fcc_type == FourCc::VIDS
    }

    /// Stream frame rate (`rate / scale`).
    pub fn frame_rate(&self) -> Option<f64> {
        (self.scale != 0).then(|| self.rate as f64 / self.scale as f64)
    }
}

/// Leading fields of the video stream format (`strf`, a `BITMAPINFOHEADER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamFormat {
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: FourCc,
}

impl StreamFormat {
    pub const MIN_SIZE: usize = 20;

    fn parse(payload: &[u8]) -> Option<Self> {
        // payload[0..4] is biSize
        Some(Self {
            width: read_i32_le(payload, 4)?,
            height: read_i32_le(payload, 8)?,
            planes: read_u16_le(payload, 12)?,
            bit_count: read_u16_le(payload, 14)?,
            compression: FourCc::read(payload, 16)?,
        })
    }
}

/// Everything decoded from the structural prefix of an AVI file.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerHeader {
    /// Declared `RIFF` payload size.
    pub file_size: u32,
    /// RIFF form type, `AVI ` for the supported profile.
    pub file_type: FourCc,
    pub main: MainHeader,
    pub stream: StreamHeader,
    pub format: StreamFormat,
    /// Spans of the located chunks, in nesting order.
    pub hdrl: ByteSpan,
    pub avih: ByteSpan,
    pub strl: ByteSpan,
    pub strh: ByteSpan,
    pub strf: ByteSpan,
}

impl ContainerHeader {
    /// Decode the header group of `data`.
    pub fn read(data: &[u8]) -> Result<Self> {
        let riff = riff::find(data, FourCc::RIFF, 0)?;
        let file_type = riff
            .list_type(data)
            .ok_or_else(|| Error::malformed_header("RIFF chunk has no form type"))?;

        let hdrl = riff::find_list(data, FourCc::HDRL, riff.children_offset())?;

        let avih = child(data, &hdrl, FourCc::AVIH)?;
        let main = MainHeader::parse(payload(data, &avih, MainHeader::MIN_SIZE)?)
            .ok_or_else(|| Error::malformed_header("avih chunk too short"))?;

        let strl = match riff::find_list(data, FourCc::STRL, hdrl.children_offset()) {
            Ok(strl) if within(&hdrl, &strl) => strl,
            _ => return Err(Error::malformed_header("missing strl list in hdrl")),
        };

        let strh = child(data, &strl, FourCc::STRH)?;
        let stream = StreamHeader::parse(payload(data, &strh, StreamHeader::MIN_SIZE)?)
            .ok_or_else(|| Error::malformed_header("strh chunk too short"))?;

        let strf = child(data, &strl, FourCc::STRF)?;
        let format = StreamFormat::parse(payload(data, &strf, StreamFormat::MIN_SIZE)?)
            .ok_or_else(|| Error::malformed_header("strf chunk too short"))?;

        if !stream.is_video() {
            tracing::warn!(
                "first stream is '{}', not a video stream; continuing",
                stream.fcc_type
            );
        }

        Ok(Self {
            file_size: riff.size,
            file_type,
            main,
            stream,
            format,
            hdrl: hdrl.span(),
            avih: avih.span(),
            strl: strl.span(),
            strh: strh.span(),
            strf: strf.span(),
        })
    }

    /// Declared frame count.
    pub fn total_frames(&self) -> u32 {
        self.main.total_frames
    }

    /// Absolute file offset of the total frame count field.
    pub fn frame_count_offset(&self) -> usize {
        self.avih.offset + riff::CHUNK_HEADER_SIZE + MainHeader::TOTAL_FRAMES_OFFSET
    }

    /// Clip duration in microseconds.
    pub fn duration_us(&self) -> u64 {
        self.main.microsec_per_frame as u64 * self.main.total_frames as u64
    }
}

fn within(parent: &Chunk, chunk: &Chunk) -> bool {
    chunk.offset >= parent.children_offset() && chunk.end() <= parent.end()
}

/// Locate a sub-chunk of `parent`, anchored at the parent's first child.
fn child(data: &[u8], parent: &Chunk, tag: FourCc) -> Result<Chunk> {
    let parent_type = parent.list_type(data).unwrap_or(parent.tag);
    match riff::find(data, tag, parent.children_offset()) {
        Ok(chunk) if within(parent, &chunk) => Ok(chunk),
        _ => Err(Error::malformed_header(format!(
            "missing {} chunk in {}",
            tag, parent_type
        ))),
    }
}

/// Borrow a chunk payload that must hold at least `min` bytes.
fn payload<'a>(data: &'a [u8], chunk: &Chunk, min: usize) -> Result<&'a [u8]> {
    match chunk.data(data) {
        Some(bytes) if bytes.len() >= min => Ok(bytes),
        Some(bytes) => Err(Error::malformed_header(format!(
            "{} chunk is {} bytes, need {}",
            chunk.tag,
            bytes.len(),
            min
        ))),
        None => Err(Error::malformed_header(format!(
            "{} chunk overruns the file",
            chunk.tag
        ))),
    }
}
