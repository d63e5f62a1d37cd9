#![allow(clippy::too_many_arguments)]

// Re-export modules
pub mod backend;
pub mod config;
pub mod content;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod parsers;
pub mod render;
pub mod store;
pub mod view;

// Re-export commonly used types for convenience
pub use backend::{Backend, LocalBackend, RemoteBackend};
pub use config::AppConfig;
pub use content::{ContentNode, LinkItem, ParseResponse, ParsedDocument, SaveEntry, SaveId};
pub use error::{Error, Result};
pub use render::{ContentRenderer, DocumentView};
pub use view::ViewState;
