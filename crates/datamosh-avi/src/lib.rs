//! Datamosh-AVI: AVI container walking and keyframe-suppressing rewrites
//!
//! This crate is the binary engine behind datamosh. It reads an uncompressed
//! frame container (single-stream AVI as produced by an Xvid transcode),
//! classifies every frame, and rewrites the frame stream so that keyframes
//! inside chosen windows are replaced by copies of the previous delta frame.
//! Decoders then keep predicting from stale image state, which is the glitch.
//!
//! # Modules
//!
//! - `riff` - generic chunk locator and little-endian field readers
//! - `avi` - header group, frame catalog and `idx1` index views
//! - `transform` - the single-pass rewrite and frame count patch
//! - `builder` - writer for synthetic single-stream AVI files
//!
//! # Example
//!
//! ```
//! use datamosh_avi::{transform, AviBuilder, AviFile, EditRequest, FrameKind};
//!
//! let data = AviBuilder::new()
//!     .frames(&[FrameKind::Sync, FrameKind::Delta, FrameKind::Sync, FrameKind::Delta], 16)
//!     .build();
//! let avi = AviFile::parse(&data)?;
//!
//! let request = EditRequest::new().window(1, 3);
//! let moshed = transform(&data, &avi, &request)?;
//! assert_eq!(moshed.report.substituted, 1);
//! # Ok::<(), datamosh_avi::Error>(())
//! ```

pub mod avi;
pub mod builder;
pub mod error;
pub mod riff;
pub mod transform;

pub use avi::{
    AviFile, AviSource, ContainerHeader, FrameCatalog, FrameIndex, FrameKind, FrameRecord,
    FrameStream, IndexEntry, MainHeader, StreamFormat, StreamHeader,
};
pub use builder::AviBuilder;
pub use error::{Error, Result};
pub use riff::{ByteSpan, Chunk, FourCc};
pub use transform::{transform, EditRequest, EditWindow, TransformReport, Transformed};
