pub mod export;

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

pub use export::{export_all_users, export_user, ExportDocument};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Explicit format first, then the path extension, then text.
pub fn resolve_format(explicit: Option<&str>, path: Option<&str>) -> OutputFormat {
    explicit
        .and_then(OutputFormat::parse)
        .or_else(|| path.and_then(infer_format_from_path))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export document: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid export file name: {filename}")]
    InvalidFilename { filename: String },

    #[error("failed to create output directory: {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open output file: {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output file: {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file name is accepted only when it is a single plain path component.
fn is_plain_file_name(filename: &str) -> bool {
    if filename.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Writes `doc` into `dir`, replacing an existing file of the same name.
pub async fn save_document(dir: &Path, doc: &ExportDocument) -> Result<PathBuf, ExportError> {
    if !is_plain_file_name(&doc.filename) {
        return Err(ExportError::InvalidFilename {
            filename: doc.filename.clone(),
        });
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ExportError::CreateDir {
            path: dir.display().to_string(),
            source: e,
        })?;
    let path = dir.join(&doc.filename);
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .await
        .map_err(|e| ExportError::FileOpen {
            path: path.display().to_string(),
            source: e,
        })?;
    outfile
        .write_all(&doc.contents)
        .await
        .map_err(|e| ExportError::FileWrite {
            path: path.display().to_string(),
            source: e,
        })?;
    outfile
        .flush()
        .await
        .map_err(|e| ExportError::FileWrite {
            path: path.display().to_string(),
            source: e,
        })?;
    Ok(path)
}
