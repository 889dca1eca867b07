//! Shared fakes for the integration tests: a deterministic keyword
//! embedder, a completer that records its prompts, and a minimal PDF
//! builder.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use lectern::notebook::{Notebook, NotebookSettings};
use lectern::transcribe::Transcriber;
use lectern_core::completion::{CompletionSettings, Completer};
use lectern_core::embedding::Embedder;
use lectern_core::store::memory::InMemoryStore;
use parking_lot::Mutex;

/// Topic words; every other word maps to the last dimension.
const VOCABULARY: &[&str] = &[
    "photosynthesis",
    "chlorophyll",
    "volcano",
    "magma",
    "rome",
    "emperor",
];

/// Embeds text as normalized counts of [`VOCABULARY`] words, so passages
/// about the same topic land next to each other.
pub struct KeywordEmbedder {
    pub fail: bool,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keywords"
    }

    fn dims(&self) -> usize {
        VOCABULARY.len() + 1
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            bail!("embedding service unavailable");
        }
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

fn keyword_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; VOCABULARY.len() + 1];
    for word in text.split_whitespace() {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        match VOCABULARY.iter().position(|w| *w == word) {
            Some(i) => v[i] += 1.0,
            None => v[VOCABULARY.len()] += 0.1,
        }
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

/// Records every prompt and replies with a canned answer.
pub struct RecordingCompleter {
    pub reply: String,
    pub fail: bool,
    pub calls: Mutex<Vec<(String, CompletionSettings)>>,
}

impl RecordingCompleter {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn last(&self) -> Option<(String, CompletionSettings)> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl Completer for RecordingCompleter {
    fn model_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, prompt: &str, settings: CompletionSettings) -> Result<String> {
        self.calls.lock().push((prompt.to_string(), settings));
        if self.fail {
            bail!("429 Too Many Requests");
        }
        Ok(self.reply.clone())
    }
}

pub struct EchoTranscriber;

#[async_trait]
impl Transcriber for EchoTranscriber {
    async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> Result<String> {
        Ok(format!("{} ({} bytes)", file_name, audio.len()))
    }
}

/// A notebook over an empty in-memory store with the fakes above.
pub fn notebook_with(
    embedder: KeywordEmbedder,
    completer: Arc<RecordingCompleter>,
    settings: NotebookSettings,
) -> Notebook {
    Notebook::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(embedder),
        completer,
        settings,
    )
    .with_transcriber(Arc::new(EchoTranscriber))
}

/// Minimal valid single-page PDF whose only text is `phrase`.
///
/// Builds the body, then the xref table with correct byte offsets so
/// pdf-extract can parse it. `phrase` must not contain parentheses or
/// backslashes.
pub fn minimal_pdf_with_phrase(phrase: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", phrase);
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            content.len(),
            content
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}
