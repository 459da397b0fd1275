//! Loading wrap documents from disk.
//!
//! The header (`apiVersion`, `kind`) is sniffed first so that unrelated YAML
//! files in a wraps folder are skipped quietly: they load as `Ok(None)`.

use std::path::{Path, PathBuf};

use krapper_core::{API_VERSION, WRAP_KIND};
use serde::Deserialize;
use tracing::debug;

use crate::error::GroomError;
use crate::raw::RawWrap;
use crate::wrap::{groom, Wrap};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("decoding {}: {source}", .path.display())]
    Decode { path: PathBuf, source: serde_yaml::Error },
    #[error("{}: template and templateFile are mutually exclusive", .path.display())]
    TemplateConflict { path: PathBuf },
    #[error("reading template file {} for {}: {source}", .template.display(), .path.display())]
    Template { path: PathBuf, template: PathBuf, source: std::io::Error },
    #[error("{}: {source}", .path.display())]
    Groom { path: PathBuf, source: GroomError },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Header {
    api_version: String,
    kind: String,
}

// Only the first document of a multi-document stream is considered.
fn first_document(text: &str) -> Option<serde_yaml::Deserializer<'_>> { serde_yaml::Deserializer::from_str(text).next() }

/// Load and groom the wrap stored at `path`.
pub fn load(path: &Path) -> Result<Option<Wrap>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read { path: path.to_path_buf(), source })?;
    load_str(&text, path)
}

/// Same as [`load`] for text already in memory; `origin` locates the
/// document (template files resolve against its directory).
pub fn load_str(text: &str, origin: &Path) -> Result<Option<Wrap>, LoadError> {
    match first_document(text).map(Header::deserialize) {
        Some(Ok(h)) if h.api_version == API_VERSION && h.kind == WRAP_KIND => {}
        _ => {
            debug!(path = %origin.display(), "not a wrap document");
            return Ok(None);
        }
    }
    let decode = |source| LoadError::Decode { path: origin.to_path_buf(), source };
    let doc = first_document(text).ok_or_else(|| decode(serde::de::Error::custom("empty document")))?;
    let mut raw = RawWrap::deserialize(doc).map_err(decode)?;

    if !raw.template_file.is_empty() {
        if !raw.template.is_empty() {
            return Err(LoadError::TemplateConflict { path: origin.to_path_buf() });
        }
        let base = origin.parent().unwrap_or_else(|| Path::new("."));
        let template = base.join(&raw.template_file);
        raw.template = std::fs::read_to_string(&template)
            .map_err(|source| LoadError::Template { path: origin.to_path_buf(), template, source })?;
        raw.template_file.clear();
    }

    let wrap = groom(raw).map_err(|source| LoadError::Groom { path: origin.to_path_buf(), source })?;
    Ok(Some(wrap))
}
