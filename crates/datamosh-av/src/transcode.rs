//! Normalization of arbitrary input video into the Xvid AVI profile.
//!
//! The frame rewrite only understands single-stream AVI files with MPEG-4
//! part 2 payloads, so anything else is first pushed through ffmpeg:
//!
//! ```text
//! ffmpeg -i INPUT -y -c:v libxvid -q:v 3 -an OUTPUT.avi
//! ```

use crate::tools::{get_tool_path, FFMPEG};
use crate::{Error, Result, Workspace};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Valid range of the `-q:v` quantizer for MPEG-4 part 2 encoders.
pub const QUALITY_RANGE: std::ops::RangeInclusive<u8> = 1..=31;

/// Encoder settings for the normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// Video encoder passed to `-c:v`.
    pub video_codec: String,
    /// Constant quantizer passed to `-q:v`; lower is better.
    pub quality: u8,
    /// Drop audio streams (`-an`).
    pub strip_audio: bool,
    /// Explicit ffmpeg binary; PATH lookup when `None`.
    pub ffmpeg_path: Option<PathBuf>,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            video_codec: "libxvid".to_string(),
            quality: 3,
            strip_audio: true,
            ffmpeg_path: None,
        }
    }
}

impl TranscodeOptions {
    /// Override the quantizer.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Resolve the ffmpeg binary: the configured path if it exists,
    /// otherwise `ffmpeg` on PATH.
    pub fn program(&self) -> Result<PathBuf> {
        get_tool_path(FFMPEG, self.ffmpeg_path.as_deref())
    }

    /// Build the ffmpeg argument list.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            input.into(),
            "-y".into(),
            "-c:v".into(),
            self.video_codec.as_str().into(),
            "-q:v".into(),
            self.quality.to_string().into(),
        ];
        if self.strip_audio {
            args.push("-an".into());
        }
        args.push(output.into());
        args
    }

    fn validate(&self) -> Result<()> {
        if !QUALITY_RANGE.contains(&self.quality) {
            return Err(Error::InvalidInput(format!(
                "quality {} is outside {}..={}",
                self.quality,
                QUALITY_RANGE.start(),
                QUALITY_RANGE.end()
            )));
        }
        if self.video_codec.is_empty() {
            return Err(Error::InvalidInput("video codec is empty".to_string()));
        }
        Ok(())
    }
}

/// Transcode `input` into an Xvid AVI at `output`.
///
/// # Errors
///
/// Fails if the input does not exist, the options are invalid, ffmpeg cannot
/// be spawned, ffmpeg exits unsuccessfully, or no output file was produced.
pub fn normalize_to_avi(input: &Path, output: &Path, options: &TranscodeOptions) -> Result<()> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }
    options.validate()?;

    let program = options.program()?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Normalizing {:?} -> {:?} ({} q={})",
        input,
        output,
        options.video_codec,
        options.quality
    );

    let result = Command::new(&program)
        .args(options.args(input, output))
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(program.to_string_lossy())
            } else {
                Error::Io(e)
            }
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(Error::tool_failed(FFMPEG, stderr.trim().to_string()));
    }

    if !output.exists() {
        return Err(Error::tool_failed(
            FFMPEG,
            format!("no output written to {}", output.display()),
        ));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Normalization complete: {:?}", output);

    Ok(())
}

/// Normalize the workspace input into [`Workspace::normalized_path`].
pub fn normalize_in_workspace(workspace: &Workspace, options: &TranscodeOptions) -> Result<PathBuf> {
    let output = workspace.normalized_path();
    normalize_to_avi(workspace.input(), &output, options)?;
    Ok(output)
}
