//! Document sources feeding the property store.
//!
//! The store does not care where documents live; it only needs to list them
//! and read their properties. [`InMemoryVault`] backs tests and embedders,
//! [`FsVault`] reads a directory of Markdown files with YAML front matter.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::{
    convert::{json_to_value, yaml_to_value},
    value::Map,
    Value,
};

/// A document's front-matter properties.
pub type Properties = Map;

/// Errors raised while listing or reading documents.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot walk vault: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Trait for document sets that can be indexed by the property store.
///
/// Document paths are `/`-separated and relative to the vault root, e.g.
/// `projects/budget.md`; the path is both the document's identity and its
/// position in the folder hierarchy.
pub trait DocumentSource {
    /// List every document path, in the order they should be indexed.
    fn documents(&self) -> Result<Vec<String>, SourceError>;

    /// Read one document's properties.
    ///
    /// A document without front matter has empty properties.
    fn properties(&self, path: &str) -> Result<Properties, SourceError>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn documents(&self) -> Result<Vec<String>, SourceError> {
        (**self).documents()
    }

    fn properties(&self, path: &str) -> Result<Properties, SourceError> {
        (**self).properties(path)
    }
}

/// In-memory document set, indexed in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryVault {
    documents: IndexMap<String, Properties>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document's properties.
    pub fn insert(&mut self, path: &str, properties: Properties) {
        self.documents.insert(path.to_string(), properties);
    }

    /// Insert a document from a JSON object; non-objects give empty properties.
    pub fn insert_json(&mut self, path: &str, properties: serde_json::Value) {
        let properties = match json_to_value(properties) {
            Value::Object(map) => map,
            _ => Properties::new(),
        };
        self.insert(path, properties);
    }

    pub fn remove(&mut self, path: &str) -> Option<Properties> {
        self.documents.shift_remove(path)
    }
}

impl DocumentSource for InMemoryVault {
    fn documents(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn properties(&self, path: &str) -> Result<Properties, SourceError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }
}

/// A directory of Markdown documents.
///
/// Only `.md` files are indexed. Hidden entries (names starting with `.`,
/// which covers the editor's `.obsidian` folder) are skipped.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsVault { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// Read a document's full text.
    pub fn read_body(&self, path: &str) -> Result<String, SourceError> {
        let absolute = self.absolute(path);
        fs::read_to_string(&absolute).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_string()),
            _ => SourceError::Io {
                path: absolute.clone(),
                source,
            },
        })
    }

    /// Replace a document's full text.
    pub fn write_body(&self, path: &str, contents: &str) -> Result<(), SourceError> {
        let absolute = self.absolute(path);
        fs::write(&absolute, contents).map_err(|source| SourceError::Io {
            path: absolute,
            source,
        })
    }

    fn relative(&self, entry: &DirEntry) -> Option<String> {
        let relative = entry.path().strip_prefix(&self.root).ok()?;
        let segments: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "md")
}

impl DocumentSource for FsVault {
    fn documents(&self) -> Result<Vec<String>, SourceError> {
        let mut documents = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry?;
            if is_markdown(&entry)
                && let Some(path) = self.relative(&entry)
            {
                documents.push(path);
            }
        }
        Ok(documents)
    }

    fn properties(&self, path: &str) -> Result<Properties, SourceError> {
        let body = self.read_body(path)?;
        parse_front_matter(&body).map_err(|source| SourceError::FrontMatter {
            path: path.to_string(),
            source,
        })
    }
}

/// Returns the YAML block between a leading `---` line and the next `---` line.
pub fn front_matter(text: &str) -> Option<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parses a document's front matter into properties.
///
/// Missing, empty or non-mapping front matter yields empty properties.
pub fn parse_front_matter(text: &str) -> Result<Properties, serde_yaml::Error> {
    let Some(yaml) = front_matter(text) else {
        return Ok(Properties::new());
    };
    if yaml.trim().is_empty() {
        return Ok(Properties::new());
    }
    let parsed: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    Ok(match yaml_to_value(parsed) {
        Value::Object(map) => map,
        _ => Properties::new(),
    })
}
