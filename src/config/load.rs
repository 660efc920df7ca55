use super::node::ConfigNode;
use crate::error::{DispatchError, DispatchResult};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Attribute that turns a section into a pointer to another document.
pub const REF_ATTR: &str = "ref";

/// Load a configuration document from disk.
///
/// `.json` files are parsed as JSON, anything else as YAML.
pub fn load_document(path: &Path) -> DispatchResult<ConfigNode> {
    let content = std::fs::read_to_string(path).map_err(|e| document_error(path, &e))?;
    parse_document(&content, is_json(path)).map_err(|message| DispatchError::Document {
        path: path.display().to_string(),
        message,
    })
}

/// Parse document text into a configuration tree.
pub fn parse_document(content: &str, json: bool) -> Result<ConfigNode, String> {
    let value: serde_yaml::Value = if json {
        serde_json::from_str(content).map_err(|e| e.to_string())?
    } else {
        serde_yaml::from_str(content).map_err(|e| e.to_string())?
    };
    Ok(ConfigNode::new(value))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn document_error(path: &Path, err: &io::Error) -> DispatchError {
    DispatchError::Document {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Resolves top-level sections of a document, following one level of `ref`
///
/// A section written as `{ ref: other.yaml }` is replaced by the same-named
/// section of `other.yaml`, resolved against the directory of the main
/// document. Referenced sections are loaded on first use and memoized by
/// section name for the lifetime of the resolver.
#[derive(Debug)]
pub struct SectionResolver {
    root: ConfigNode,
    base_dir: PathBuf,
    cache: Mutex<HashMap<String, ConfigNode>>,
}

impl SectionResolver {
    pub fn new(root: ConfigNode, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            root,
            base_dir: base_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// Directory `ref` paths are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Section by name. An absent section resolves to a null node.
    pub fn resolve(&self, name: &str) -> DispatchResult<ConfigNode> {
        let Some(section) = self.root.child(name) else {
            return Ok(ConfigNode::null());
        };
        let Some(reference) = section.attr(REF_ATTR) else {
            return Ok(section);
        };

        if let Some(cached) = self.cached(name) {
            return Ok(cached);
        }

        let path = self.base_dir.join(&reference);
        debug!(section = name, document = %path.display(), "loading referenced section");
        let document = match load_document(&path) {
            Ok(doc) => doc,
            Err(DispatchError::Document { message, .. }) if !path.exists() => {
                return Err(DispatchError::configuration(format!(
                    "referenced document not found for section '{}': {} ({})",
                    name,
                    path.display(),
                    message
                )));
            }
            Err(other) => return Err(other),
        };

        let resolved = document.child(name).ok_or_else(|| {
            DispatchError::configuration(format!(
                "referenced document {} has no '{}' section",
                path.display(),
                name
            ))
        })?;
        if resolved.attr(REF_ATTR).is_some() {
            return Err(DispatchError::configuration(format!(
                "section '{}' in {} is itself a ref; only one level of indirection is supported",
                name,
                path.display()
            )));
        }

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(name.to_string(), resolved.clone());
        }
        Ok(resolved)
    }

    fn cached(&self, name: &str) -> Option<ConfigNode> {
        self.cache.lock().ok().and_then(|c| c.get(name).cloned())
    }

    /// Number of referenced sections loaded so far.
    #[must_use]
    pub fn cached_sections(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}
