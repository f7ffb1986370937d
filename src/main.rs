mod cli;

use datamosh::{
    config,
    pipeline::{self, MoshJob},
    plan::EditPlan,
};
use datamosh_avi::{AviFile, ContainerHeader, FrameKind, FrameRecord, IndexEntry};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Frames and index entries listed by `inspect`.
const INSPECT_PREVIEW: usize = 16;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "datamosh=trace,datamosh_avi=trace,datamosh_av=trace".to_string()
        } else {
            "datamosh=info,datamosh_avi=info,datamosh_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Mosh {
            input,
            output,
            windows,
            transitions,
            clips,
            duplicate,
            normalize,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let mut plan = EditPlan::from_clip_starts(&clips, &config.mosh)
                .with_windows(windows)
                .with_transitions(transitions);
            if let Some(count) = duplicate {
                plan = plan.with_duplication_count(count);
            }
            let output = output.unwrap_or_else(|| pipeline::default_output_path(&input));
            let normalize = normalize.then(|| config.transcode.to_options());
            mosh_file(&input, &output, plan, normalize)
        }
        Commands::Inspect { file, json } => inspect_file(&file, json),
        Commands::Normalize {
            input,
            output,
            quality,
        } => normalize_file(&input, &output, cli.config.as_deref(), quality),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("datamosh {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn mosh_file(
    input: &Path,
    output: &Path,
    plan: EditPlan,
    normalize: Option<datamosh_av::TranscodeOptions>,
) -> Result<()> {
    tracing::info!("Processing file: {:?}", input);
    let mut job = MoshJob::new(input, output, plan.into_request());
    if let Some(options) = normalize {
        job = job.with_normalization(options);
    }
    let outcome = job.execute()?;
    let report = outcome.report;

    println!("Output: {}", outcome.output.display());
    println!(
        "Frames: {} -> {}",
        report.original_frames, report.new_frame_count
    );
    println!("Keyframes substituted: {}", report.substituted);
    if report.duplicated > 0 {
        println!("Extra copies: {}", report.duplicated);
    }
    if report.transitions_skipped > 0 {
        println!("Transition frames dropped: {}", report.transitions_skipped);
    }

    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    file: PathBuf,
    file_len: usize,
    header: &'a ContainerHeader,
    frame_count: usize,
    sync_frames: usize,
    delta_frames: usize,
    other_frames: usize,
    index_entries: usize,
    index_keyframes: usize,
    frames: &'a [FrameRecord],
    index: &'a [IndexEntry],
}

fn inspect_file(file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let data = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let avi = AviFile::parse(&data).with_context(|| format!("Failed to parse {:?}", file))?;
    let catalog = &avi.catalog;
    let index = &avi.index;

    if json {
        let report = InspectReport {
            file: file.to_path_buf(),
            file_len: data.len(),
            header: &avi.header,
            frame_count: catalog.len(),
            sync_frames: catalog.count(FrameKind::Sync),
            delta_frames: catalog.count(FrameKind::Delta),
            other_frames: catalog.count(FrameKind::Other),
            index_entries: index.len(),
            index_keyframes: index.keyframe_count(),
            frames: &catalog.frames,
            index: &index.entries,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let header = &avi.header;
    let main = &header.main;
    println!("File: {}", file.display());
    println!("Size: {} bytes", data.len());
    println!("Type: {}", header.file_type);
    println!(
        "Video: {} {}x{}, {:.3} fps",
        header.format.compression,
        main.width,
        main.height,
        main.fps()
    );
    let secs = header.duration_us() / 1_000_000;
    println!(
        "Duration: {:02}:{:02}:{:02}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    );
    print!("Stream: {} {}", header.stream.fcc_type, header.stream.fcc_handler);
    if let Some(rate) = header.stream.frame_rate() {
        print!(", {:.3} fps", rate);
    }
    println!(" ({} total)", main.streams);
    if !main.has_index() {
        println!("Note: main header does not advertise an index");
    }

    println!(
        "\nFrames: {} ({} sync, {} delta, {} other)",
        catalog.len(),
        catalog.count(FrameKind::Sync),
        catalog.count(FrameKind::Delta),
        catalog.count(FrameKind::Other)
    );
    for (i, frame) in catalog.iter().take(INSPECT_PREVIEW).enumerate() {
        println!(
            "  [{}] {} @ {} ({} bytes)",
            i, frame.kind, frame.span.offset, frame.span.size
        );
    }
    if catalog.len() > INSPECT_PREVIEW {
        println!("  ...");
    }
    let sync = catalog.sync_indices();
    if !sync.is_empty() {
        println!("Sync frames at: {:?}", sync);
    }

    println!(
        "\nIndex: {} entries ({} keyframes)",
        index.len(),
        index.keyframe_count()
    );
    for (i, entry) in index.entries.iter().take(INSPECT_PREVIEW).enumerate() {
        println!(
            "  [{}] {} flags=0x{:02x} offset={} size={}",
            i, entry.tag, entry.flags, entry.offset, entry.size
        );
    }
    if index.len() > INSPECT_PREVIEW {
        println!("  ...");
    }

    Ok(())
}

fn normalize_file(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    quality: Option<u8>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let mut options = config.transcode.to_options();
    if let Some(q) = quality {
        options = options.with_quality(q);
    }

    datamosh_av::normalize_to_avi(input, output, &options)?;
    println!("Output: {}", output.display());
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ffmpeg_path = config.transcode.ffmpeg_path.as_deref();

    println!("Checking external tools...\n");

    let tools = datamosh_av::check_tools(ffmpeg_path);

    for tool in &tools {
        let status = if tool.available { "✓" } else { "✗" };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    let ffmpeg_ok = tools.first().is_some_and(|t| t.available);
    if ffmpeg_ok {
        let ffmpeg = datamosh_av::get_tool_path(datamosh_av::tools::FFMPEG, ffmpeg_path)?;
        let codec = &config.transcode.video_codec;
        let status = if datamosh_av::has_encoder(&ffmpeg, codec) {
            "✓"
        } else {
            "✗"
        };
        println!("{} encoder {}", status, codec);
    }

    println!();
    if ffmpeg_ok {
        println!("ffmpeg is available; --normalize will work.");
    } else {
        println!("ffmpeg is missing. Only pre-encoded Xvid AVI input can be processed.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let transcode = &config.transcode;
    println!(
        "  Transcode: {} q={} strip_audio={}",
        transcode.video_codec, transcode.quality, transcode.strip_audio
    );
    if let Some(ref ffmpeg) = transcode.ffmpeg_path {
        println!("  ffmpeg: {}", ffmpeg.display());
    }
    let mosh = &config.mosh;
    println!(
        "  Mosh: lead={} trail={} min_clip_frame={} duplicates={}",
        mosh.lead_frames, mosh.trail_frames, mosh.min_clip_frame, mosh.duplication_count
    );

    Ok(())
}
