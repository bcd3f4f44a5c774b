//! End-to-end pipeline tests using the offline hash provider and a
//! temporary storage directory.

use std::path::Path;

use tempfile::TempDir;

use docvec::chunk::ChunkStrategy;
use docvec::config::Config;
use docvec::models::Document;
use docvec::pipeline::RetrievalPipeline;

fn offline_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.dir = dir.to_path_buf();
    config.embedding.dims = 256;
    config
}

fn doc(source_id: &str, text: &str) -> Document {
    Document {
        source_id: source_id.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn ingest_then_answer_returns_matching_source() {
    let tmp = TempDir::new().unwrap();
    let mut pipeline = RetrievalPipeline::new(&offline_config(tmp.path())).unwrap();

    pipeline
        .ingest_document(&doc(
            "rust.pdf",
            "# Rust\n\nOwnership and borrowing keep memory safe without garbage collection.",
        ))
        .await
        .unwrap();
    pipeline
        .ingest_document(&doc(
            "cooking.pdf",
            "# Cooking\n\nSlow roasting vegetables concentrates their flavor.",
        ))
        .await
        .unwrap();

    let answer = pipeline
        .answer("Ownership and borrowing keep memory safe")
        .await
        .unwrap();

    assert!(!answer.sources.is_empty());
    assert_eq!(answer.sources[0].filename, "rust.pdf");
    assert!(answer
        .answer
        .starts_with("Here are the relevant passages from the documents:"));
}

#[tokio::test]
async fn reingesting_a_document_does_not_duplicate_entries() {
    let tmp = TempDir::new().unwrap();
    let mut pipeline = RetrievalPipeline::new(&offline_config(tmp.path())).unwrap();

    let document = doc("guide.pdf", "A short guide to semantic retrieval.");
    pipeline.ingest_document(&document).await.unwrap();
    let after_first = pipeline.indexed_entries();

    pipeline.ingest_document(&document).await.unwrap();
    assert_eq!(pipeline.indexed_entries(), after_first);
}

#[tokio::test]
async fn index_survives_pipeline_restart() {
    let tmp = TempDir::new().unwrap();
    let config = offline_config(tmp.path());

    {
        let mut pipeline = RetrievalPipeline::new(&config).unwrap();
        pipeline
            .ingest_document(&doc("notes.pdf", "Vector indexes rank chunks by similarity."))
            .await
            .unwrap();
    }

    // A fresh pipeline over the same storage directory sees the entries.
    let pipeline = RetrievalPipeline::new(&config).unwrap();
    assert_eq!(pipeline.indexed_entries(), 1);

    let answer = pipeline
        .answer("Vector indexes rank chunks by similarity")
        .await
        .unwrap();
    assert_eq!(answer.sources[0].filename, "notes.pdf");
}

#[tokio::test]
async fn window_strategy_produces_positional_chunks() {
    let tmp = TempDir::new().unwrap();
    let mut config = offline_config(tmp.path());
    config.chunking.strategy = ChunkStrategy::Window;
    config.chunking.window_size = 40;
    config.chunking.window_overlap = 10;

    let mut pipeline = RetrievalPipeline::new(&config).unwrap();
    let text = "raw extracted text without structure ".repeat(5);
    let stored = pipeline.ingest_document(&doc("scan.pdf", &text)).await.unwrap();
    assert!(stored > 1);

    let answer = pipeline.answer("raw extracted text").await.unwrap();
    assert!(!answer.sources.is_empty());
    // Chunk indices from the window strategy are positional.
    let max_index = answer
        .sources
        .iter()
        .map(|s| s.chunk_index)
        .max()
        .unwrap();
    assert!(max_index < stored);
}

#[tokio::test]
async fn answering_with_nothing_ingested_is_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let pipeline = RetrievalPipeline::new(&offline_config(tmp.path())).unwrap();

    let answer = pipeline.answer("is anyone there").await.unwrap();
    assert!(answer.sources.is_empty());
}
