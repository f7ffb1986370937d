use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub transcode: TranscodeConfig,

    #[serde(default)]
    pub mosh: MoshConfig,
}

/// Settings for the ffmpeg normalization pass.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    /// Explicit ffmpeg binary (PATH lookup when unset)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Constant quantizer, 1 (best) to 31
    #[serde(default = "default_quality")]
    pub quality: u8,

    #[serde(default = "default_true")]
    pub strip_audio: bool,
}

fn default_video_codec() -> String {
    "libxvid".to_string()
}
fn default_quality() -> u8 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            video_codec: default_video_codec(),
            quality: default_quality(),
            strip_audio: true,
        }
    }
}

impl TranscodeConfig {
    pub fn to_options(&self) -> datamosh_av::TranscodeOptions {
        datamosh_av::TranscodeOptions {
            video_codec: self.video_codec.clone(),
            quality: self.quality,
            strip_audio: self.strip_audio,
            ffmpeg_path: self.ffmpeg_path.clone(),
        }
    }
}

/// How clip placements turn into edit windows.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoshConfig {
    /// Extra copies of each substitute frame
    #[serde(default)]
    pub duplication_count: u32,

    /// Frames before a transition where suppression starts
    #[serde(default = "default_lead_frames")]
    pub lead_frames: u32,

    /// Frames after a transition where suppression ends
    #[serde(default = "default_trail_frames")]
    pub trail_frames: u32,

    /// Clip starts at or below this frame are ignored
    #[serde(default = "default_min_clip_frame")]
    pub min_clip_frame: u32,
}

fn default_lead_frames() -> u32 {
    10
}
fn default_trail_frames() -> u32 {
    60
}
fn default_min_clip_frame() -> u32 {
    11
}

impl Default for MoshConfig {
    fn default() -> Self {
        Self {
            duplication_count: 0,
            lead_frames: default_lead_frames(),
            trail_frames: default_trail_frames(),
            min_clip_frame: default_min_clip_frame(),
        }
    }
}
