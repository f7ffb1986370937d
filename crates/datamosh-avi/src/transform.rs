//! Keyframe suppression ("datamoshing") over a parsed AVI buffer.
//!
//! The rewrite is one forward pass over the frame catalog that appends to a
//! fresh buffer:
//!
//! 1. everything before the first frame is copied verbatim;
//! 2. each frame is dropped, replaced, or copied according to the request,
//!    and the bytes between it and the next frame are copied verbatim;
//! 3. the index chunk is re-emitted entry by entry, unchanged and in order,
//!    followed by every trailing byte;
//! 4. the main header frame count is patched in the output to match the
//!    number of frames written.
//!
//! The index is deliberately not recomputed against the new offsets.

use crate::avi::{AviFile, AviSource, FrameKind};
use crate::{Error, Result};
use bytes::{BufMut, BytesMut};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Inclusive run of frame indices in which sync frames are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EditWindow {
    pub start: u32,
    pub end: u32,
}

impl EditWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Whether `frame` lies in `[start, end]`.
    pub fn contains(&self, frame: u32) -> bool {
        self.start <= frame && frame <= self.end
    }
}

impl FromStr for EditWindow {
    type Err = String;

    /// Parse `START:END` (inclusive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("expected START:END, got '{}'", s))?;
        let start: u32 = start
            .trim()
            .parse()
            .map_err(|_| format!("invalid window start '{}'", start))?;
        let end: u32 = end
            .trim()
            .parse()
            .map_err(|_| format!("invalid window end '{}'", end))?;
        if start > end {
            return Err(format!("window start {} is after end {}", start, end));
        }
        Ok(Self { start, end })
    }
}

impl std::fmt::Display for EditWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// What to do to the frame stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EditRequest {
    /// Suppression windows; may overlap.
    pub windows: Vec<EditWindow>,
    /// Frames dropped outright. Takes precedence over windows.
    pub transitions: BTreeSet<u32>,
    /// Extra copies of the substitute written per suppressed sync frame.
    pub duplication_count: u32,
}

impl EditRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(mut self, start: u32, end: u32) -> Self {
        self.windows.push(EditWindow::new(start, end));
        self
    }

    pub fn transition(mut self, frame: u32) -> Self {
        self.transitions.insert(frame);
        self
    }

    pub fn duplication_count(mut self, count: u32) -> Self {
        self.duplication_count = count;
        self
    }

    /// Whether `frame` lies inside any window.
    pub fn in_window(&self, frame: u32) -> bool {
        self.windows.iter().any(|w| w.contains(frame))
    }

    /// Whether the request leaves every frame untouched.
    pub fn is_identity(&self) -> bool {
        self.windows.is_empty() && self.transitions.is_empty()
    }
}

/// Frame bookkeeping of one rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformReport {
    pub original_frames: u32,
    pub new_frame_count: u32,
    /// Hard skips minus extra duplicates; negative when more frames were
    /// added than dropped.
    pub skipped_frames: i64,
    /// Sync frames replaced by a delta frame.
    pub substituted: u32,
    /// Extra substitute copies written beyond the first.
    pub duplicated: u32,
    /// Frames dropped as transitions.
    pub transitions_skipped: u32,
}

/// Output of a rewrite.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub data: Vec<u8>,
    pub report: TransformReport,
}

/// Rewrite `data` (already parsed into `avi`) according to `request`.
///
/// Fails with [`Error::NoReferenceFrame`] if a sync frame inside a window
/// comes before any delta frame. Nothing is written anywhere on failure; the
/// output only exists as the returned buffer.
pub fn transform(data: &[u8], avi: &AviFile, request: &EditRequest) -> Result<Transformed> {
    if data.len() != avi.source_len {
        return Err(Error::malformed_header(format!(
            "buffer is {} bytes but was parsed as {}",
            data.len(),
            avi.source_len
        )));
    }

    let frames = &avi.catalog.frames;
    let stream_end = avi.stream_end();
    let mut out = BytesMut::with_capacity(data.len());

    let first = frames.first().map_or(stream_end, |f| f.span.offset);
    out.put_slice(&data[..first]);

    let mut report = TransformReport {
        original_frames: frames.len() as u32,
        ..Default::default()
    };
    let mut last_delta: Option<&[u8]> = None;
    // diagnostic only
    let mut suppressing = false;

    for (i, frame) in frames.iter().enumerate() {
        let index = i as u32;
        let bytes = frame.bytes(data);

        if request.transitions.contains(&index) {
            tracing::debug!("skipping frame {} for transition", index);
            report.skipped_frames += 1;
            report.transitions_skipped += 1;
        } else if request.in_window(index) {
            if !suppressing {
                tracing::info!("suppressing sync frames from frame {}", index);
                suppressing = true;
            }
            if frame.kind == FrameKind::Sync {
                let substitute = last_delta.ok_or(Error::NoReferenceFrame { frame: index })?;
                tracing::debug!("replacing sync frame {}", index);
                out.put_slice(substitute);
                for _ in 0..request.duplication_count {
                    out.put_slice(substitute);
                    report.skipped_frames -= 1;
                }
                report.substituted += 1;
                report.duplicated += request.duplication_count;
            } else {
                out.put_slice(bytes);
            }
        } else {
            if suppressing {
                tracing::info!("resuming sync frames at frame {}", index);
                suppressing = false;
            }
            out.put_slice(bytes);
        }

        // Track the source decode chain, not what was written.
        if frame.kind == FrameKind::Delta {
            last_delta = Some(bytes);
        }

        let gap_end = frames.get(i + 1).map_or(stream_end, |next| next.span.offset);
        out.put_slice(&data[frame.span.end()..gap_end]);
    }

    let index = &avi.index;
    out.put_slice(&data[index.chunk.offset..index.chunk.data_offset()]);
    for entry in &index.entries {
        entry.write(&mut out);
    }
    out.put_slice(&data[index.entries_end()..]);

    let new_count = report.original_frames as i64 - report.skipped_frames;
    report.new_frame_count =
        u32::try_from(new_count).map_err(|_| Error::FrameCountOverflow(new_count))?;
    patch_frame_count(&mut out, avi, report.new_frame_count);

    tracing::info!(
        "old frame count: {}, new frame count: {}",
        report.original_frames,
        report.new_frame_count
    );

    Ok(Transformed {
        data: out.to_vec(),
        report,
    })
}

impl AviSource {
    /// Rewrite this source according to `request`.
    pub fn datamosh(&self, request: &EditRequest) -> Result<Transformed> {
        transform(&self.data, &self.file, request)
    }
}

/// Overwrite the main header frame count in an already-written buffer.
///
/// The header group precedes every frame and is copied unchanged, so its
/// offset is the same in input and output.
fn patch_frame_count(out: &mut BytesMut, avi: &AviFile, count: u32) {
    let at = avi.header.frame_count_offset();
    out[at..at + 4].copy_from_slice(&count.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AviBuilder;

    fn parse(data: &[u8]) -> AviFile {
        AviFile::parse(data).unwrap()
    }

    #[test]
    fn test_window_parse() {
        assert_eq!("10:70".parse::<EditWindow>(), Ok(EditWindow::new(10, 70)));
        assert_eq!(" 3 : 3 ".parse::<EditWindow>(), Ok(EditWindow::new(3, 3)));
        assert!("70:10".parse::<EditWindow>().is_err());
        assert!("10".parse::<EditWindow>().is_err());
        assert!("a:b".parse::<EditWindow>().is_err());
        assert_eq!(EditWindow::new(4, 9).to_string(), "4:9");
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let w = EditWindow::new(2, 4);
        assert!(!w.contains(1));
        assert!(w.contains(2));
        assert!(w.contains(4));
        assert!(!w.contains(5));
    }

    #[test]
    fn test_identity() {
        let data = AviBuilder::new()
            .frame(FrameKind::Sync, 40)
            .frame(FrameKind::Delta, 11)
            .frame(FrameKind::Delta, 12)
            .build();
        let avi = parse(&data);
        let out = transform(&data, &avi, &EditRequest::new()).unwrap();
        assert_eq!(out.data, data);
        assert_eq!(out.report.new_frame_count, 3);
        assert_eq!(out.report.skipped_frames, 0);
    }

    #[test]
    fn test_sync_replaced_by_last_delta() {
        let data = AviBuilder::new()
            .frame(FrameKind::Sync, 40)
            .frame(FrameKind::Delta, 10)
            .frame(FrameKind::Sync, 40)
            .frame(FrameKind::Delta, 12)
            .build();
        let avi = parse(&data);
        let request = EditRequest::new().window(1, 3);
        let out = transform(&data, &avi, &request).unwrap();

        let rewritten = parse(&out.data);
        assert_eq!(rewritten.catalog.len(), 4);
        assert_eq!(
            rewritten.catalog.frames[2].bytes(&out.data),
            avi.catalog.frames[1].bytes(&data)
        );
        assert_eq!(out.report.substituted, 1);
        assert_eq!(out.report.new_frame_count, 4);
    }

    #[test]
    fn test_transition_takes_precedence() {
        let data = AviBuilder::new()
            .frame(FrameKind::Sync, 8)
            .frame(FrameKind::Delta, 8)
            .frame(FrameKind::Sync, 8)
            .build();
        let avi = parse(&data);
        // Frame 0 is a sync frame inside the window with no prior delta, but
        // it is a transition, so it is dropped instead of failing.
        let request = EditRequest::new().window(0, 2).transition(0);
        let out = transform(&data, &avi, &request).unwrap();
        assert_eq!(out.report.transitions_skipped, 1);
        assert_eq!(out.report.new_frame_count, 2);
    }

    #[test]
    fn test_no_reference_frame() {
        let data = AviBuilder::new()
            .frame(FrameKind::Sync, 8)
            .frame(FrameKind::Delta, 8)
            .build();
        let avi = parse(&data);
        let err = transform(&data, &avi, &EditRequest::new().window(0, 1)).unwrap_err();
        assert!(matches!(err, Error::NoReferenceFrame { frame: 0 }));
    }

    #[test]
    fn test_mismatched_buffer_rejected() {
        let data = AviBuilder::new().frame(FrameKind::Sync, 8).build();
        let avi = parse(&data);
        let err = transform(&data[..data.len() - 1], &avi, &EditRequest::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn test_request_builders() {
        let request = EditRequest::new()
            .window(5, 10)
            .window(8, 20)
            .transition(7)
            .duplication_count(2);
        assert!(request.in_window(20));
        assert!(!request.in_window(21));
        assert!(!request.is_identity());
        assert!(EditRequest::new().duplication_count(3).is_identity());
    }
}
