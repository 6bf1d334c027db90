//! Document source resolution and caching

pub mod cache;
pub mod resolver;

pub use cache::DocumentCache;
pub use resolver::{resolve_base64, resolve_cache, resolve_path, ResolvedDocument};
