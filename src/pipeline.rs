//! Retrieval pipeline orchestration.
//!
//! Wires the chunker, embedding provider, vector index, and (optionally) a
//! chat client into the two flows the application exposes:
//!
//! - ingestion: extract → clean/chunk → embed → address → store;
//! - query: embed(question) → top-k search → answer composition.
//!
//! Ingestion and query block the caller until completion; embedding for one
//! document is submitted as a single batch.

use std::path::Path;

use tracing::info;

use crate::chat::ChatClient;
use crate::chunk::{ChunkStrategy, MarkdownChunker, SlidingWindowChunker};
use crate::config::Config;
use crate::embedding::{create_provider, EmbeddingProvider};
use crate::error::Result;
use crate::extract::extract_pdf_text;
use crate::index::VectorIndex;
use crate::models::{Answer, Chunk, Document, Source};

/// Fallback preamble when no chat provider is configured.
const FALLBACK_PREAMBLE: &str = "Here are the relevant passages from the documents:";

enum Chunker {
    Markdown(MarkdownChunker),
    Window(SlidingWindowChunker),
}

impl Chunker {
    fn chunk(&self, text: &str, source_id: &str) -> Vec<Chunk> {
        match self {
            Chunker::Markdown(c) => c.chunk_text(text, source_id),
            Chunker::Window(c) => c.chunk_text(text, source_id),
        }
    }
}

/// End-to-end ingestion and question answering over a vector index.
pub struct RetrievalPipeline {
    chunker: Chunker,
    provider: Box<dyn EmbeddingProvider>,
    index: VectorIndex,
    chat: Option<ChatClient>,
    top_k: usize,
}

impl RetrievalPipeline {
    /// Construct the pipeline from configuration.
    ///
    /// Opens (or creates) the index in the configured storage directory and
    /// builds the configured embedding provider and chat client. Missing
    /// credentials for a configured remote service fail here, not at first
    /// use.
    pub fn new(config: &Config) -> Result<Self> {
        let chunker = match config.chunking.strategy {
            ChunkStrategy::Markdown => Chunker::Markdown(MarkdownChunker::new(
                config.chunking.min_chunk_size,
                config.chunking.max_chunk_size,
            )?),
            ChunkStrategy::Window => Chunker::Window(SlidingWindowChunker::new(
                config.chunking.window_size,
                config.chunking.window_overlap,
            )?),
        };

        let provider = create_provider(&config.embedding)?;
        let index = VectorIndex::open(&config.storage.dir)?;
        let chat = if config.chat.is_enabled() {
            Some(ChatClient::new(&config.chat)?)
        } else {
            None
        };

        Ok(Self {
            chunker,
            provider,
            index,
            chat,
            top_k: config.retrieval.top_k,
        })
    }

    /// Extract a PDF and ingest its text. Returns the number of chunks
    /// stored.
    pub async fn ingest_file(&mut self, path: &Path) -> Result<usize> {
        let text = extract_pdf_text(path)?;
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.ingest_document(&Document { source_id, text }).await
    }

    /// Chunk, embed, and store a document's text. Returns the number of
    /// chunks stored.
    pub async fn ingest_document(&mut self, document: &Document) -> Result<usize> {
        let chunks = self
            .chunker
            .chunk(&document.text, &document.source_id);
        let stored = self.index.upsert(&chunks, self.provider.as_ref()).await?;

        info!(
            source = %document.source_id,
            chunks = stored,
            "ingested document"
        );
        Ok(stored)
    }

    /// Answer a question from the top-k most similar chunks.
    ///
    /// With a chat client configured, answer composition is delegated to
    /// it; otherwise the fallback concatenates a fixed preamble with the
    /// retrieved sources. Either way, `sources` carries the retrieval
    /// results.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let retrieved = self
            .index
            .query(question, self.provider.as_ref(), self.top_k)
            .await?;

        let sources: Vec<Source> = retrieved
            .iter()
            .map(|chunk| Source {
                filename: chunk.metadata.source_id.clone(),
                chunk_index: chunk.metadata.chunk_index,
                text: chunk.text.clone(),
            })
            .collect();

        let answer = match &self.chat {
            Some(chat) => chat.answer(question, &retrieved, &[]).await?,
            None => {
                let listing = sources
                    .iter()
                    .map(|s| format!("- {} (Chunk {})", s.filename, s.chunk_index))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{}\n{}", FALLBACK_PREAMBLE, listing)
            }
        };

        info!(question, results = sources.len(), "answered question");
        Ok(Answer { answer, sources })
    }

    /// Number of entries currently stored in the index.
    pub fn indexed_entries(&self) -> usize {
        self.index.len()
    }
}
