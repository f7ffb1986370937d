//! Error types for datamosh-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while transcoding input video into the Xvid AVI profile.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// ffmpeg is neither at the configured path nor on PATH.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// ffmpeg ran but exited unsuccessfully or produced no output file.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// The input video does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Spawning ffmpeg or touching the scratch files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoder settings outside what ffmpeg accepts (quantizer, codec name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The scratch directory for the normalized AVI could not be set up.
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    /// ffmpeg (or another named binary) could not be located.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// The transcoder exited with `message` on stderr.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// The input video at `path` is missing.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_transcoder() {
        let err = Error::tool_failed("ffmpeg", "Unknown encoder 'libxvid'");
        assert_eq!(
            err.to_string(),
            "tool execution failed: ffmpeg: Unknown encoder 'libxvid'"
        );
        assert_eq!(
            Error::tool_not_found("ffmpeg").to_string(),
            "tool not found: ffmpeg"
        );
        assert_eq!(
            Error::file_not_found("/in/clip.mp4").to_string(),
            "file not found: /in/clip.mp4"
        );
    }
}
