//! Local preview copies of the selected resume.
//!
//! A preview is a temporary file a viewer can open while the user decides whether
//! to submit. At most one preview is live per store: staging a new file deletes
//! the previous copy, and dropping the store deletes the last one.

use crate::error::Result;
use crate::types::ResumeFile;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// Owner of the current preview copy
#[derive(Debug, Default)]
pub struct PreviewStore {
    dir: Option<PathBuf>,
    current: Option<TempPath>,
}

impl PreviewStore {
    /// Store previews in the system temp directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Store previews in `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            current: None,
        }
    }

    /// Write a preview copy of `file`, releasing the previous one
    pub fn stage(&mut self, file: &ResumeFile) -> Result<PathBuf> {
        self.release();

        let suffix = Path::new(&file.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix("resume-preview-").suffix(&suffix);
        let mut temp = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        temp.write_all(&file.content)?;
        temp.flush()?;

        let path = temp.into_temp_path();
        let staged = path.to_path_buf();
        tracing::debug!(path = %staged.display(), size_bytes = file.len(), "staged preview");
        self.current = Some(path);
        Ok(staged)
    }

    /// Path of the live preview, if any
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Delete the live preview, if any
    pub fn release(&mut self) {
        if let Some(path) = self.current.take() {
            let shown = path.to_path_buf();
            match path.close() {
                Ok(()) => tracing::debug!(path = %shown.display(), "released preview"),
                Err(e) => {
                    tracing::warn!(path = %shown.display(), error = %e, "failed to delete preview")
                }
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SAMPLE_PDF;
    use tempfile::tempdir;

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn staging_replaces_previous_copy() {
        let dir = tempdir().unwrap();
        let mut store = PreviewStore::in_dir(dir.path());

        let first = store
            .stage(&ResumeFile::new("first.pdf", SAMPLE_PDF))
            .unwrap();
        assert!(first.exists());
        assert_eq!(first.extension().unwrap(), "pdf");
        assert_eq!(std::fs::read(&first).unwrap(), SAMPLE_PDF);

        let second = store
            .stage(&ResumeFile::new("second.docx", b"PK\x03\x04".to_vec()))
            .unwrap();
        assert!(!first.exists(), "superseded preview must be deleted");
        assert!(second.exists());
        assert_eq!(store.current(), Some(second.as_path()));
        assert_eq!(files_in(dir.path()), 1);
    }

    #[test]
    fn repeated_selection_does_not_accumulate_files() {
        let dir = tempdir().unwrap();
        let mut store = PreviewStore::in_dir(dir.path());
        for i in 0..20 {
            store
                .stage(&ResumeFile::new(format!("cv-{i}.pdf"), SAMPLE_PDF))
                .unwrap();
        }
        assert_eq!(files_in(dir.path()), 1);
    }

    #[test]
    fn release_and_drop_delete_the_copy() {
        let dir = tempdir().unwrap();
        let mut store = PreviewStore::in_dir(dir.path());
        let path = store.stage(&ResumeFile::new("cv.pdf", SAMPLE_PDF)).unwrap();
        store.release();
        assert!(!path.exists());
        assert!(store.current().is_none());
        // releasing twice is a no-op
        store.release();

        let path = store.stage(&ResumeFile::new("cv.pdf", SAMPLE_PDF)).unwrap();
        drop(store);
        assert!(!path.exists());
    }
}
