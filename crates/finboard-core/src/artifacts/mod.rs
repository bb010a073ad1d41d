//! Downloadable renditions of generated insight text
//!
//! Each artifact is written to its own temporary file (kept on disk so it can
//! be offered for download after the call returns) and also carried in memory.

mod pdf;
mod speech;

pub use pdf::{pdf_file_name, PdfReport, PDF_TITLE};
pub use speech::{
    speech_chunks, synthesize_artifact, GoogleTranslateTts, MockSpeech, SpeechSynthesizer,
    MAX_SPEECH_CHUNK,
};

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const PDF_MIME: &str = "application/pdf";
pub const MP3_MIME: &str = "audio/mpeg";

/// A generated file
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    /// Temporary file holding `bytes`
    pub path: PathBuf,
    /// Suggested download name
    pub file_name: String,
    pub mime: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write `bytes` to a fresh temporary file and describe it
    pub fn write_temp(file_name: &str, mime: &'static str, bytes: Vec<u8>) -> Result<Self> {
        let suffix = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("finboard-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&bytes)?;
        let (_, path) = file.keep().map_err(|e| Error::Io(e.error))?;

        debug!(path = %path.display(), size = bytes.len(), "Artifact written");

        Ok(Self {
            path,
            file_name: file_name.to_string(),
            mime,
            bytes,
        })
    }

    /// Copy the artifact to `dest`
    pub fn save_to(&self, dest: &Path) -> Result<()> {
        std::fs::write(dest, &self.bytes)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
