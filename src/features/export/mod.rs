//! # Export Feature
//!
//! Saves the active chat to disk either as a plain transcript or as a
//! paginated, markdown-free document.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Paginated document format
//! - 1.0.0: Plain transcript

pub mod document;
pub mod text;

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

pub use document::{PaginatedDocument, PAGE_LINES, PAGE_WIDTH};
pub use text::{export_filename, format_chat_text, message_body};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Document,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Document => "doc.txt",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "doc" | "pdf" | "document" => Ok(Self::Document),
            other => Err(anyhow::anyhow!("Unknown export format '{other}' (use txt or doc)")),
        }
    }
}

/// Write `contents` to `dir/file_name`, creating the directory if needed
pub async fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Exported chat to {}", path.display());
    Ok(path)
}
