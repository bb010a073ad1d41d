//! Text-to-speech for insight text

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Language;

use super::{Artifact, MP3_MIME};

/// Longest text the translate endpoint accepts per request
pub const MAX_SPEECH_CHUNK: usize = 100;

const GOOGLE_TRANSLATE_HOST: &str = "https://translate.google.com";

/// Turns text into MP3 audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Synthesize `text` and write it to a temporary MP3 file
pub async fn synthesize_artifact(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    language: Language,
) -> Result<Artifact> {
    let audio = synth.synthesize(text, language).await?;
    if audio.is_empty() {
        return Err(Error::Speech("synthesizer returned no audio".into()));
    }
    let file_name = format!("savings_insights_{}.mp3", language.code());
    Artifact::write_temp(&file_name, MP3_MIME, audio)
}

/// Split text into word-bounded pieces of at most `MAX_SPEECH_CHUNK` characters
pub fn speech_chunks(text: &str) -> Vec<String> {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    textwrap::wrap(&flattened, MAX_SPEECH_CHUNK)
        .into_iter()
        .map(|chunk| chunk.into_owned())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Google Translate speech endpoint
///
/// Each chunk is fetched separately; MP3 frames concatenate into a valid
/// stream, so the pieces are joined byte for byte.
#[derive(Clone)]
pub struct GoogleTranslateTts {
    http_client: Client,
    base_url: String,
}

impl GoogleTranslateTts {
    pub fn new() -> Self {
        Self::with_base_url(GOOGLE_TRANSLATE_HOST)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: Language,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let total = total.to_string();
        let idx_param = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .http_client
            .get(format!("{}/translate_tts", self.base_url))
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language.code()),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", idx_param.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Speech(format!(
                "speech service returned {} for chunk {}",
                status, idx
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for GoogleTranslateTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        let chunks = speech_chunks(text);
        if chunks.is_empty() {
            return Err(Error::Speech("no text to speak".into()));
        }

        debug!(chunks = chunks.len(), language = language.code(), "Speech synthesis");

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, language, idx, chunks.len()).await?);
        }
        Ok(audio)
    }

    fn name(&self) -> &str {
        "google-translate"
    }
}

/// Offline synthesizer for tests and development
#[derive(Clone, Default)]
pub struct MockSpeech {
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Speech("mock speech failure".into()));
        }
        let mut audio = b"ID3".to_vec();
        audio.extend(language.code().as_bytes());
        audio.extend(text.as_bytes());
        Ok(audio)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
