mod common;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use batch_markdown::orchestrator::download_page;
use batch_markdown::services::{ExtractionClient, PersistenceStep};
use batch_markdown::{ItemError, ItemErrorKind};
use common::{Behavior, FakeContext, MemoryStorage};

#[tokio::test]
async fn test_download_open_page_asks_for_destination() {
    let page = FakeContext::new(
        "tab-1",
        Behavior::article("Rust 2024 Edition"),
        Arc::new(AtomicUsize::new(0)),
    );
    let storage = MemoryStorage::default();
    let mut persistence = PersistenceStep::new(storage.clone());

    let filename = download_page(
        &page,
        "https://blog.example/rust",
        &ExtractionClient::new(),
        &mut persistence,
    )
    .await
    .unwrap();

    assert_eq!(filename, "rust-2024-edition.md");
    let saved = storage.saved.lock().unwrap().clone();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].prompted);
    assert!(saved[0].content.starts_with("# Rust 2024 Edition"));
}

#[tokio::test]
async fn test_download_page_without_article() {
    let page = FakeContext::new("tab-2", Behavior::NoArticle, Arc::new(AtomicUsize::new(0)));
    let storage = MemoryStorage::default();
    let mut persistence = PersistenceStep::new(storage.clone());

    let err = download_page(&page, "tab-2", &ExtractionClient::new(), &mut persistence)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ItemError::ExtractionSemantic {
            message: "Could not extract article".into()
        }
    );
    assert_eq!(err.kind(), ItemErrorKind::ExtractionSemanticError);
    assert!(storage.filenames().is_empty());
}
