//! Turning picked or dropped files into [`ResumeFile`]s.
//!
//! The declared media type is derived from the extension, the same way a browser
//! file input fills in `File.type`. Content is not inspected here; that is the
//! validator's job.

use crate::error::Result;
use crate::types::{MediaType, ResumeFile};
use std::path::{Path, PathBuf};

/// Read a file chosen with a file picker
pub async fn read_resume(path: impl AsRef<Path>) -> Result<ResumeFile> {
    let path = path.as_ref();
    let content = tokio::fs::read(path).await?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("resume")
        .to_string();

    let mut file = ResumeFile::new(name, content);
    if let Some(media_type) = declared_type_for(path) {
        file = file.with_declared_type(media_type.mime());
    }

    tracing::debug!(
        path = %path.display(),
        size_bytes = file.len(),
        declared_type = ?file.declared_type,
        "read resume from disk"
    );
    Ok(file)
}

/// Pick the resume out of a drag-and-drop payload
///
/// Only the first regular file counts; directories and entries that vanished
/// between the drop and the read are skipped. Returns `None` when nothing usable
/// was dropped.
pub async fn resume_from_drop(paths: &[PathBuf]) -> Result<Option<ResumeFile>> {
    for path in paths {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => return read_resume(path).await.map(Some),
            Ok(_) => {
                tracing::debug!(path = %path.display(), "skipping dropped directory");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable dropped entry");
            }
        }
    }
    Ok(None)
}

fn declared_type_for(path: &Path) -> Option<MediaType> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(MediaType::from_extension)
}
