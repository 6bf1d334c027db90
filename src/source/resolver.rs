//! Document source resolution

use crate::error::{Error, Result};
use crate::pdf::has_pdf_signature;
use crate::source::DocumentCache;
use base64::Engine;
use std::path::Path;
use std::sync::Arc;

/// Document bytes plus a display name for reports
pub struct ResolvedDocument {
    pub data: Arc<Vec<u8>>,
    pub source_name: String,
}

fn check_size(size: u64, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        return Err(Error::FileTooLarge {
            size,
            max_size: max_bytes,
        });
    }
    Ok(())
}

fn check_signature(data: &[u8]) -> Result<()> {
    if !has_pdf_signature(data) {
        return Err(Error::InvalidPdf {
            reason: "File does not start with PDF header".to_string(),
        });
    }
    Ok(())
}

/// Read a PDF from disk, refusing files above `max_bytes`
pub fn resolve_path<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<ResolvedDocument> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    check_size(std::fs::metadata(path)?.len(), max_bytes)?;
    let data = std::fs::read(path)?;
    check_signature(&data)?;

    Ok(ResolvedDocument {
        data: Arc::new(data),
        source_name: path.display().to_string(),
    })
}

/// Decode an inline base64 upload
pub fn resolve_base64(encoded: &str, max_bytes: u64) -> Result<ResolvedDocument> {
    // base64 expands 3 bytes to 4 characters
    check_size((encoded.len() as u64 / 4) * 3, max_bytes)?;

    let data = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
    check_size(data.len() as u64, max_bytes)?;
    check_signature(&data)?;

    Ok(ResolvedDocument {
        data: Arc::new(data),
        source_name: "<base64>".to_string(),
    })
}

/// Fetch a previously cached upload
pub fn resolve_cache(cache_key: &str, cache: &DocumentCache) -> Result<ResolvedDocument> {
    let data = cache
        .get(cache_key)
        .ok_or_else(|| Error::CacheKeyNotFound {
            key: cache_key.to_string(),
        })?;

    Ok(ResolvedDocument {
        data,
        source_name: format!("<cache:{}>", cache_key),
    })
}
