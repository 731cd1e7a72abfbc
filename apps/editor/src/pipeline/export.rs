use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::info;

use crate::backend::ExportFormat;

/// A downloaded export, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub format: ExportFormat,
    pub bytes: Bytes,
}

impl ExportArtifact {
    pub fn new(title: &str, format: ExportFormat, bytes: Bytes) -> Self {
        Self {
            file_name: file_name(title, format),
            content_type: format.content_type(),
            format,
            bytes,
        }
    }

    /// Writes the artifact into `dir` and returns the full path.
    pub async fn save_into(&self, dir: &Path) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// `<title>.<ext>`, with path-hostile characters replaced.
pub fn file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "resume" } else { stem.as_str() };
    format!("{stem}.{}", format.extension())
}
