use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtitleError {
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("Invalid manifest {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    #[error("ffmpeg failed ({}): {diagnostics}", describe_status(*status))]
    Compositing {
        status: Option<i32>,
        diagnostics: String,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SubtitleError {
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        SubtitleError::NotFound {
            what,
            path: path.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        SubtitleError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Fails with `NotFound` unless `path` exists.
    pub fn ensure_exists(what: &'static str, path: &Path) -> Result<(), Self> {
        if path.exists() {
            Ok(())
        } else {
            Err(Self::not_found(what, path))
        }
    }
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
