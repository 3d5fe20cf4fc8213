pub mod url_loader;

pub use url_loader::{load_url_file, parse_urls, validate_urls};
