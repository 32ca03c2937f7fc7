pub mod docs_client;

pub use docs_client::{DocService, DocsError, HttpDocsClient};
