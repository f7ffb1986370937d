use clap::{Parser, Subcommand};
use datamosh_avi::EditWindow;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datamosh")]
#[command(author, version, about = "Keyframe-suppressing AVI rewriter")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Suppress keyframes in an AVI file and write the glitched result
    Mosh {
        /// Input file (an Xvid AVI, or anything ffmpeg reads with --normalize)
        #[arg(required = true)]
        input: PathBuf,

        /// Output file (default: <stem>_glitched.avi next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Inclusive frame window START:END in which keyframes are suppressed
        #[arg(short, long = "window", value_name = "START:END", value_parser = parse_window)]
        windows: Vec<EditWindow>,

        /// Frame index to drop entirely
        #[arg(short, long = "transition", value_name = "FRAME")]
        transitions: Vec<u32>,

        /// Clip start frame; derives a transition and a window around it
        #[arg(long = "clip", value_name = "FRAME")]
        clips: Vec<u32>,

        /// Extra copies written per suppressed keyframe (overrides config)
        #[arg(short, long)]
        duplicate: Option<u32>,

        /// Transcode the input to Xvid AVI with ffmpeg first
        #[arg(short, long)]
        normalize: bool,
    },

    /// Parse an AVI file and display its structure
    Inspect {
        /// File to inspect
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transcode a video into the Xvid AVI profile without rewriting it
    Normalize {
        /// Input video
        #[arg(required = true)]
        input: PathBuf,

        /// Output AVI
        #[arg(required = true)]
        output: PathBuf,

        /// Constant quantizer, 1 (best) to 31 (overrides config)
        #[arg(short, long)]
        quality: Option<u8>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn parse_window(s: &str) -> Result<EditWindow, String> {
    s.parse()
}
