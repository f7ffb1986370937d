//! # datamosh-av
//!
//! External transcoder plumbing for datamosh.
//!
//! The frame rewrite in `datamosh-avi` works on one container profile only:
//! a single video stream of MPEG-4 part 2 frames in an AVI with an `idx1`
//! index. This crate gets arbitrary input into that shape by shelling out to
//! ffmpeg with the Xvid encoder, and reports which tools are installed.
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use datamosh_av::{normalize_to_avi, TranscodeOptions};
//! use std::path::Path;
//!
//! normalize_to_avi(
//!     Path::new("/path/to/clip.mp4"),
//!     Path::new("/path/to/clip.avi"),
//!     &TranscodeOptions::default(),
//! )?;
//! # Ok::<(), datamosh_av::Error>(())
//! ```

mod error;
pub mod tools;
pub mod transcode;
pub mod workspace;

// Re-exports
pub use error::{Error, Result};
pub use tools::{check_tool, check_tools, get_tool_path, has_encoder, require_tool, ToolInfo};
pub use transcode::{normalize_in_workspace, normalize_to_avi, TranscodeOptions, QUALITY_RANGE};
pub use workspace::Workspace;
