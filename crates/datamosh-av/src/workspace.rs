//! Scratch space for intermediate files.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory tied to one input file.
///
/// The normalized AVI lives here until the rewrite has read it; dropping the
/// workspace removes it.
///
/// # Example
///
/// ```no_run
/// use datamosh_av::{normalize_in_workspace, TranscodeOptions, Workspace};
///
/// let workspace = Workspace::new("/path/to/clip.mp4")?;
/// let avi = normalize_in_workspace(&workspace, &TranscodeOptions::default())?;
/// let bytes = std::fs::read(&avi)?;
/// workspace.cleanup();
/// # Ok::<(), datamosh_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    input_path: PathBuf,
    stem: String,
}

impl Workspace {
    /// Create a workspace for `input`.
    pub fn new<P: AsRef<Path>>(input: P) -> Result<Self> {
        let input = input.as_ref();
        let stem = input
            .file_stem()
            .ok_or_else(|| Error::InvalidInput(format!("invalid input path: {:?}", input)))?
            .to_string_lossy()
            .to_string();
        let temp_dir = TempDir::new().map_err(|e| Error::Workspace(e.to_string()))?;

        Ok(Self {
            temp_dir,
            input_path: input.to_path_buf(),
            stem,
        })
    }

    /// Get the input file path.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Where the normalized copy of the input is written.
    pub fn normalized_path(&self) -> PathBuf {
        self.temp_file(&format!("{}_normalized.avi", self.stem))
    }

    /// Remove the workspace and everything in it.
    pub fn cleanup(self) {
        drop(self.temp_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_workspace_paths() {
        let input = NamedTempFile::new().unwrap();
        let workspace = Workspace::new(input.path()).unwrap();

        assert_eq!(workspace.input(), input.path());
        assert!(workspace.temp_dir().is_dir());
        let normalized = workspace.normalized_path();
        assert!(normalized.starts_with(workspace.temp_dir()));
        assert!(normalized.to_string_lossy().ends_with("_normalized.avi"));
    }

    #[test]
    fn test_cleanup_removes_dir() {
        let workspace = Workspace::new("/videos/clip.mp4").unwrap();
        let dir = workspace.temp_dir().to_path_buf();
        std::fs::write(workspace.temp_file("scratch.bin"), b"x").unwrap();
        workspace.cleanup();
        assert!(!dir.exists());
    }

    #[test]
    fn test_rejects_path_without_name() {
        assert!(matches!(
            Workspace::new("/"),
            Err(Error::InvalidInput(_))
        ));
    }
}
