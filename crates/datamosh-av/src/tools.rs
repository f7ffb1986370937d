//! External tool discovery.
//!
//! Only ffmpeg is required; ffprobe is reported for diagnostics.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// The transcoder binary.
pub const FFMPEG: &str = "ffmpeg";
/// ffmpeg's stream inspector, reported by `check-tools`.
pub const FFPROBE: &str = "ffprobe";

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// First line of the tool's version banner.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check whether an ffmpeg-family tool runs, and report its version banner.
///
/// `program` may be a bare name (resolved on PATH) or a path.
pub fn check_tool(program: &Path) -> ToolInfo {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string());

    match Command::new(program).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name,
                available: true,
                version,
                path: which::which(program).ok(),
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check ffmpeg (at the configured path, if any) and ffprobe.
pub fn check_tools(ffmpeg_path: Option<&Path>) -> Vec<ToolInfo> {
    vec![
        check_tool(ffmpeg_path.unwrap_or(Path::new(FFMPEG))),
        check_tool(Path::new(FFPROBE)),
    ]
}

/// Whether `ffmpeg -encoders` lists `encoder`.
pub fn has_encoder(ffmpeg: &Path, encoder: &str) -> bool {
    let output = match Command::new(ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return false,
    };

    encoder_listed(&String::from_utf8_lossy(&output.stdout), encoder)
}

/// Scan `ffmpeg -encoders` output for an encoder name.
///
/// Lines look like ` V....D libxvid              libxvidcore MPEG-4 part 2`.
fn encoder_listed(listing: &str, encoder: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|name| name == encoder)
}

/// Require that a tool is available on PATH, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(
            "configured {} path {:?} does not exist, falling back to PATH",
            name,
            path
        );
    }

    require_tool(name)
}
