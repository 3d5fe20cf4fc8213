pub mod batch;
pub mod event;
pub mod loaders;

pub use batch::{BatchJob, BatchSettings, ExtractedPage, ItemResult};
pub use event::BatchEvent;
pub use loaders::{load_url_file, parse_urls, validate_urls};
