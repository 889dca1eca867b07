//! The notebook service: upload documents, then ask, summarize or quiz.
//!
//! [`Notebook`] wires the core pieces together (chunker, store, retriever,
//! composer) with the external collaborators (embedding model, language
//! model, speech-to-text). The HTTP server and the CLI are thin layers on
//! top of it.
//!
//! # Operations
//!
//! | Method | Result |
//! |--------|--------|
//! | [`ingest`](Notebook::ingest) | extract, chunk, embed and register a PDF |
//! | [`list_documents`](Notebook::list_documents) | every document in upload order |
//! | [`ask`](Notebook::ask) | an answer plus the passages it was drawn from |
//! | [`summarize`](Notebook::summarize) | one summary covering the selected documents |
//! | [`generate_quiz`](Notebook::generate_quiz) | a multiple-choice quiz over the selection |
//! | [`transcribe`](Notebook::transcribe) | text of a spoken question |

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::anyhow;
use serde::Serialize;
use tracing::{debug, info, warn};

use lectern_core::chunk::chunk_text;
use lectern_core::completion::{CompletionSettings, Completer};
use lectern_core::compose::{
    answer_prompt, group_by_document, pack_documents, quiz_plan, quiz_prompt, summary_prompt,
    DocumentPassages, PackedDocument, NO_CONTENT_ANSWER, NO_RELEVANT_ANSWER,
};
use lectern_core::embedding::Embedder;
use lectern_core::models::DocumentSummary;
use lectern_core::retrieve::{retrieve, RetrieveError, RetrieveParams, RetrieveRequest};
use lectern_core::store::memory::InMemoryStore;
use lectern_core::store::{NewDocument, Store};

use crate::completion::ChatCompletionClient;
use crate::config::{Config, TasksConfig};
use crate::embedding::create_embedder;
use crate::error::{NotebookError, NotebookResult};
use crate::extract::{detect_content_type, extract_text, ExtractError, MIME_PDF};
use crate::transcribe::{Transcriber, WhisperClient};

/// Tuning knobs taken from [`Config`].
#[derive(Debug, Clone)]
pub struct NotebookSettings {
    pub max_words: usize,
    pub retrieval: RetrieveParams,
    pub context_passages: usize,
    pub tasks: TasksConfig,
}

impl NotebookSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_words: config.chunking.max_words,
            retrieval: config.retrieval.params(),
            context_passages: config.retrieval.context_passages,
            tasks: config.tasks.clone(),
        }
    }
}

impl Default for NotebookSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of [`Notebook::ask`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
    /// Passages retrieved for the question, closest first. Empty when the
    /// answer is one of the "nothing found" sentences.
    pub supporting_passages: Vec<String>,
}

impl Answer {
    fn sentinel(text: &str) -> Self {
        Self {
            answer: text.to_string(),
            supporting_passages: Vec::new(),
        }
    }
}

pub struct Notebook {
    store: Arc<dyn Store>,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
    transcriber: Option<Arc<dyn Transcriber>>,
    settings: NotebookSettings,
}

impl Notebook {
    pub fn new(
        store: Arc<dyn Store>,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        settings: NotebookSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            completer,
            transcriber: None,
            settings,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Build a notebook with the backends named in `config` and an empty
    /// in-memory store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let embedder = create_embedder(&config.embedding)?;
        let store: Arc<dyn Store> = match embedder.dims() {
            0 => Arc::new(InMemoryStore::new()),
            dims => Arc::new(InMemoryStore::with_dims(dims)),
        };
        let completer = Arc::new(ChatCompletionClient::new(&config.llm)?);
        let transcriber = Arc::new(WhisperClient::new(&config.llm, &config.transcription)?);

        info!(
            embedding_model = embedder.model_name(),
            dims = embedder.dims(),
            llm_model = completer.model_name(),
            "notebook ready"
        );

        Ok(Self::new(
            store,
            embedder,
            completer,
            NotebookSettings::from_config(config),
        )
        .with_transcriber(transcriber))
    }

    /// Extract text from an uploaded PDF and add it to the notebook.
    ///
    /// `declared` is the content type the client sent, if any. Uploads
    /// that are not PDF by declared type, extension or magic header are
    /// rejected before extraction.
    pub async fn ingest(
        &self,
        name: &str,
        declared: Option<&str>,
        bytes: Vec<u8>,
    ) -> NotebookResult<DocumentSummary> {
        if name.trim().is_empty() {
            return Err(NotebookError::input("No selected file"));
        }
        if bytes.is_empty() {
            return Err(NotebookError::input("Uploaded file is empty"));
        }

        let content_type = detect_content_type(name, declared, &bytes);
        if content_type != MIME_PDF {
            warn!(document = name, content_type = %content_type, "upload rejected");
            return Err(ExtractError::UnsupportedContentType(content_type).into());
        }

        let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &content_type))
            .await
            .map_err(|e| NotebookError::Internal(e.into()))??;

        self.ingest_text(name, &text).await
    }

    /// Chunk, embed and register already-extracted text.
    pub async fn ingest_text(&self, name: &str, text: &str) -> NotebookResult<DocumentSummary> {
        let passages = chunk_text(text, self.settings.max_words);
        if passages.is_empty() {
            return Err(NotebookError::EmptyDocument(name.to_string()));
        }

        let vectors = self.embedder.embed(&passages).await.map_err(|e| {
            warn!(document = name, error = %e, "embedding failed during ingest");
            NotebookError::upstream("embedding failed", e)
        })?;

        let summary = self
            .store
            .register(NewDocument {
                name: name.to_string(),
                text: text.to_string(),
                passages,
                vectors,
            })
            .await
            .map_err(NotebookError::Internal)?;

        let corpus_passages = self
            .store
            .passage_count()
            .await
            .map_err(NotebookError::Internal)?;
        info!(
            document = %summary.name,
            id = %summary.id,
            passages = summary.passage_count,
            corpus_passages,
            "document ingested"
        );
        Ok(summary)
    }

    pub async fn list_documents(&self) -> NotebookResult<Vec<DocumentSummary>> {
        self.store
            .list_documents()
            .await
            .map_err(NotebookError::Internal)
    }

    /// Answer `question` from the passages of the selected documents.
    ///
    /// A missing question is reported before a missing selection. A
    /// selection with no passages, or no relevant ones, yields a fixed
    /// "nothing found" answer rather than an error.
    pub async fn ask(&self, question: &str, document_ids: &[String]) -> NotebookResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(NotebookError::input("Question required"));
        }
        let allowed = selection(document_ids)?;

        info!(selected = allowed.len(), "question received");

        let req = RetrieveRequest {
            question,
            allowed: &allowed,
            params: self.settings.retrieval,
        };
        let hits = match retrieve(self.store.as_ref(), self.embedder.as_ref(), &req).await {
            Ok(hits) => hits,
            Err(RetrieveError::EmptySelection) => {
                info!("selection holds no passages");
                return Ok(Answer::sentinel(NO_CONTENT_ANSWER));
            }
            Err(RetrieveError::Embedding(e)) => {
                warn!(error = %e, "embedding failed for question");
                return Err(NotebookError::upstream("embedding failed", e));
            }
            Err(RetrieveError::Store(e)) => return Err(NotebookError::Internal(e)),
        };

        info!(kept = hits.len(), "retrieval finished");
        if hits.is_empty() {
            return Ok(Answer::sentinel(NO_RELEVANT_ANSWER));
        }

        let supporting_passages: Vec<String> =
            hits.into_iter().map(|hit| hit.passage.text).collect();
        let context: Vec<&str> = supporting_passages
            .iter()
            .take(self.settings.context_passages)
            .map(String::as_str)
            .collect();

        let prompt = answer_prompt(question, &context);
        let answer = self
            .complete(&prompt, self.settings.tasks.answer_max_tokens)
            .await?;

        Ok(Answer {
            answer,
            supporting_passages,
        })
    }

    /// Summarize the selected documents, giving each an equal share of the
    /// context budget.
    pub async fn summarize(&self, document_ids: &[String]) -> NotebookResult<String> {
        let allowed = selection(document_ids)?;
        info!(selected = allowed.len(), "summary requested");

        let groups = self.selected_groups(&allowed).await?;
        let packed = pack_documents(&groups, self.settings.tasks.summary_char_budget);
        log_packing("summary", &packed);

        let prompt = summary_prompt(&packed);
        self.complete(&prompt, self.settings.tasks.summary_max_tokens)
            .await
    }

    /// Generate a multiple-choice quiz over the selected documents.
    pub async fn generate_quiz(&self, document_ids: &[String]) -> NotebookResult<String> {
        let allowed = selection(document_ids)?;
        info!(selected = allowed.len(), "quiz requested");

        let groups = self.selected_groups(&allowed).await?;
        let packed = pack_documents(&groups, self.settings.tasks.quiz_char_budget);
        log_packing("quiz", &packed);

        let plan = quiz_plan(self.settings.tasks.quiz_target_questions, packed.len());
        info!(
            documents = packed.len(),
            per_document = plan.per_document,
            total = plan.total,
            "quiz plan"
        );

        let prompt = quiz_prompt(&packed, plan.total);
        self.complete(&prompt, self.settings.tasks.quiz_max_tokens)
            .await
    }

    /// Turn a recorded question into text.
    pub async fn transcribe(&self, file_name: &str, audio: Vec<u8>) -> NotebookResult<String> {
        if audio.is_empty() {
            return Err(NotebookError::input("No audio file"));
        }
        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or_else(|| NotebookError::Internal(anyhow!("no transcriber configured")))?;

        transcriber
            .transcribe(file_name, audio)
            .await
            .map_err(|e| {
                warn!(error = %e, "transcription failed");
                NotebookError::upstream("transcription failed", e)
            })
    }

    async fn selected_groups(
        &self,
        allowed: &HashSet<String>,
    ) -> NotebookResult<Vec<DocumentPassages>> {
        let documents = self
            .store
            .documents(allowed)
            .await
            .map_err(NotebookError::Internal)?;
        let passages = self
            .store
            .passages_for(allowed)
            .await
            .map_err(NotebookError::Internal)?;
        debug!(passages = passages.len(), "passages gathered");

        let groups = group_by_document(&documents, passages);
        if groups.is_empty() {
            return Err(NotebookError::input("No content found in selected sources"));
        }
        Ok(groups)
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> NotebookResult<String> {
        let settings = CompletionSettings {
            max_tokens,
            temperature: self.settings.tasks.temperature,
        };
        self.completer
            .complete(prompt, settings)
            .await
            .map_err(|e| {
                warn!(model = self.completer.model_name(), error = %e, "completion failed");
                NotebookError::upstream("completion failed", e)
            })
    }
}

fn selection(document_ids: &[String]) -> NotebookResult<HashSet<String>> {
    if document_ids.is_empty() {
        return Err(NotebookError::input("No documents selected"));
    }
    Ok(document_ids.iter().cloned().collect())
}

fn log_packing(task: &str, packed: &[PackedDocument<'_>]) {
    for doc in packed {
        info!(
            task,
            document = doc.name,
            passages = doc.passages.len(),
            chars = doc.chars,
            "context packed"
        );
    }
}
