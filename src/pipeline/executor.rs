use anyhow::{Context, Result};
use datamosh_av::{TranscodeOptions, Workspace};
use datamosh_avi::{AviSource, EditRequest, TransformReport};
use std::path::{Path, PathBuf};

/// Result of a finished job.
#[derive(Debug, Clone)]
pub struct MoshOutcome {
    pub output: PathBuf,
    pub report: TransformReport,
}

/// One input file rewritten into one output file.
///
/// The whole input is read, parsed and rewritten in memory; the output file
/// is only created once the rewrite has succeeded.
pub struct MoshJob {
    input: PathBuf,
    output: PathBuf,
    request: EditRequest,
    normalize: Option<TranscodeOptions>,
}

impl MoshJob {
    pub fn new(input: &Path, output: &Path, request: EditRequest) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            request,
            normalize: None,
        }
    }

    /// Transcode the input with ffmpeg before rewriting it.
    pub fn with_normalization(mut self, options: TranscodeOptions) -> Self {
        self.normalize = Some(options);
        self
    }

    fn report_progress(&self, progress: f32, step: &str) {
        tracing::info!("[{:.0}%] {}", progress, step);
    }

    pub fn execute(self) -> Result<MoshOutcome> {
        if !self.input.exists() {
            anyhow::bail!("Input file does not exist: {:?}", self.input);
        }
        if same_file(&self.input, &self.output) {
            anyhow::bail!(
                "Output path must differ from the input: {:?}",
                self.output
            );
        }

        if self.request.is_identity() {
            tracing::warn!("No windows or transitions given; output will match the input");
        }

        let data = match self.normalize {
            Some(ref options) => {
                self.report_progress(0.0, "Normalizing input");
                let workspace = Workspace::new(&self.input)?;
                let normalized = datamosh_av::normalize_in_workspace(&workspace, options)
                    .with_context(|| format!("Failed to normalize {:?}", self.input))?;
                let data = std::fs::read(&normalized)
                    .with_context(|| format!("Failed to read {:?}", normalized))?;
                workspace.cleanup();
                data
            }
            None => std::fs::read(&self.input)
                .with_context(|| format!("Failed to read {:?}", self.input))?,
        };

        self.report_progress(40.0, "Parsing container");
        let source = AviSource::from_bytes(data)
            .with_context(|| format!("Failed to parse {:?}", self.input))?;

        self.report_progress(60.0, "Rewriting frame stream");
        let moshed = source
            .datamosh(&self.request)
            .context("Failed to rewrite frame stream")?;

        self.report_progress(90.0, "Writing output");
        std::fs::write(&self.output, &moshed.data)
            .with_context(|| format!("Failed to write {:?}", self.output))?;

        self.report_progress(100.0, "Done");
        Ok(MoshOutcome {
            output: self.output,
            report: moshed.report,
        })
    }
}

/// `<dir>/<stem>_glitched.avi` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_glitched.avi", stem))
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
