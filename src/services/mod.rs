pub mod extraction_client;
pub mod filename_registry;
pub mod page_loader;
pub mod persistence;
pub mod storage;

pub use extraction_client::ExtractionClient;
pub use filename_registry::{slugify, FilenameRegistry};
pub use page_loader::PageLoader;
pub use persistence::PersistenceStep;
pub use storage::{ensure_output_dir, DestinationPrompt, FileStorage, StdinPrompt, Storage};
