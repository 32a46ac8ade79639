//! The property store: an index of every document's properties.
//!
//! The store walks a [`DocumentSource`] and builds a [`PropertyTree`] that
//! mirrors the folder hierarchy, with each document's front matter at the
//! leaves. Lookups come in two scopes:
//!
//! - **local**: property paths inside the active document (`total`,
//!   `owner.name`)
//! - **global**: the whole vault, prefixed by the document path
//!   (`projects/budget.md/total`)
//!
//! Local paths shadow global ones, so a query can refer to its own document
//! without a prefix and still reach across the vault when it needs to.
//!
//! The tree is never patched. [`PropertyStore::refresh`] builds a new tree and
//! swaps it in, so a caller holding a [`PropertyStore::snapshot`] keeps a
//! complete, consistent view.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    functions::EvaluationContext,
    output::{stringify, truncate},
    path,
    settings::CustomFunction,
    source::{DocumentSource, Properties, SourceError},
    Value,
};

/// Maximum number of characters shown by [`PropertyStore::preview_of`].
pub const PREVIEW_LENGTH: usize = 50;

/// Returned by [`PropertyStore::preview_of`] when a path has no value.
pub const NO_VALUE: &str = "no value";

/// A node of the property tree: a folder or a document.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNode {
    Folder(PropertyTree),
    Document(Properties),
}

/// Folder hierarchy of the vault with document properties at the leaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTree {
    entries: IndexMap<String, PropertyNode>,
}

impl PropertyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from a complete document set.
    ///
    /// A document whose properties cannot be read is indexed with empty
    /// properties so one broken file does not hide the rest of the vault.
    pub fn build<S: DocumentSource>(source: &S) -> Result<Self, SourceError> {
        let mut tree = PropertyTree::new();
        for document in source.documents()? {
            let properties = match source.properties(&document) {
                Ok(properties) => properties,
                Err(e) => {
                    warn!(document = %document, error = %e, "skipping unreadable properties");
                    Properties::new()
                }
            };
            tree.insert(&document, properties);
        }
        Ok(tree)
    }

    /// Places a document's properties at its `/`-separated path.
    pub fn insert(&mut self, document: &str, properties: Properties) {
        let segments: Vec<&str> = document.split('/').filter(|s| !s.is_empty()).collect();
        let Some((name, folders)) = segments.split_last() else {
            return;
        };

        let mut current = self;
        for folder in folders {
            let node = current
                .entries
                .entry(folder.to_string())
                .or_insert_with(|| PropertyNode::Folder(PropertyTree::new()));
            if !matches!(node, PropertyNode::Folder(_)) {
                *node = PropertyNode::Folder(PropertyTree::new());
            }
            current = match node {
                PropertyNode::Folder(tree) => tree,
                PropertyNode::Document(_) => return,
            };
        }
        current
            .entries
            .insert(name.to_string(), PropertyNode::Document(properties));
    }

    /// Returns the properties of the document at `document`, if any.
    pub fn document(&self, document: &str) -> Option<&Properties> {
        match self.node(document)? {
            PropertyNode::Document(properties) => Some(properties),
            PropertyNode::Folder(_) => None,
        }
    }

    fn node(&self, path: &str) -> Option<&PropertyNode> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let mut node = self.entries.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                PropertyNode::Folder(tree) => tree.entries.get(segment)?,
                PropertyNode::Document(_) => return None,
            };
        }
        Some(node)
    }

    /// Resolves a global path: folders and a document joined by `/`, then an
    /// optional property path inside that document.
    ///
    /// A bare document path yields all of its properties as an object. Folders
    /// have no value.
    pub fn get(&self, global_path: &str) -> Option<Value> {
        let mut tree = self;
        let mut rest = global_path;
        loop {
            let (segment, remainder) = match rest.split_once('/') {
                Some((segment, remainder)) => (segment, Some(remainder)),
                None => (rest, None),
            };
            match (tree.entries.get(segment)?, remainder) {
                (PropertyNode::Folder(child), Some(remainder)) => {
                    tree = child;
                    rest = remainder;
                }
                (PropertyNode::Document(properties), Some(property)) => {
                    return path::lookup(properties, property).cloned();
                }
                (PropertyNode::Document(properties), None) => {
                    return Some(Value::Object(properties.clone()));
                }
                (PropertyNode::Folder(_), None) => return None,
            }
        }
    }

    /// Lists every global path in pre-order: folders, documents, then each
    /// document's flattened property paths.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths("", &mut out);
        out
    }

    fn collect_paths(&self, parent: &str, out: &mut Vec<String>) {
        for (name, node) in &self.entries {
            let full = if parent.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", parent, name)
            };
            out.push(full.clone());
            match node {
                PropertyNode::Folder(tree) => tree.collect_paths(&full, out),
                PropertyNode::Document(properties) => {
                    out.extend(
                        path::flatten(properties)
                            .into_iter()
                            .map(|(property, _)| format!("{}/{}", full, property)),
                    );
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A suggestion entry: a path and its stringified value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
}

/// Indexes a document source and answers scoped property lookups.
pub struct PropertyStore<S> {
    source: S,
    tree: Arc<PropertyTree>,
    active: Option<String>,
    local: Option<Properties>,
    local_paths: Vec<String>,
    all_paths: Vec<String>,
}

impl<S: DocumentSource> PropertyStore<S> {
    /// Creates a store and builds its first tree.
    pub fn new(source: S) -> Result<Self, SourceError> {
        let mut store = PropertyStore {
            source,
            tree: Arc::new(PropertyTree::new()),
            active: None,
            local: None,
            local_paths: Vec::new(),
            all_paths: Vec::new(),
        };
        store.refresh()?;
        Ok(store)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Rebuilds the whole tree from the source and swaps it in.
    ///
    /// On error the previous tree stays in place.
    pub fn refresh(&mut self) -> Result<(), SourceError> {
        let tree = PropertyTree::build(&self.source)?;
        self.tree = Arc::new(tree);
        self.reindex();
        debug!(
            paths = self.all_paths.len(),
            local = self.local_paths.len(),
            "property tree rebuilt"
        );
        Ok(())
    }

    /// Makes `document` the local scope, then rebuilds.
    pub fn refresh_for(&mut self, document: &str) -> Result<(), SourceError> {
        self.active = Some(document.to_string());
        self.refresh()
    }

    fn reindex(&mut self) {
        self.local = self
            .active
            .as_deref()
            .and_then(|document| self.tree.document(document))
            .cloned();
        self.local_paths = self
            .local
            .as_ref()
            .map(|properties| path::flatten(properties).into_iter().map(|(p, _)| p).collect())
            .unwrap_or_default();
        self.all_paths = self.local_paths.clone();
        self.all_paths.extend(self.tree.paths());
    }

    /// The document currently used as local scope.
    pub fn active_document(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The current tree. Holding the `Arc` keeps this version alive across
    /// later refreshes.
    pub fn snapshot(&self) -> Arc<PropertyTree> {
        Arc::clone(&self.tree)
    }

    pub fn tree(&self) -> &PropertyTree {
        &self.tree
    }

    /// Narrows the tree to the properties owned by one document.
    pub fn resolve_local(&self, document: &str) -> Option<&Properties> {
        self.tree.document(document)
    }

    /// Properties of the active document.
    pub fn local_properties(&self) -> Option<&Properties> {
        self.local.as_ref()
    }

    /// Looks `path` up in the active document first, then globally.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.local
            .as_ref()
            .and_then(|local| path::lookup(local, path))
            .cloned()
            .or_else(|| self.tree.get(path))
    }

    /// All known paths containing `needle`, local paths first.
    pub fn find_paths_containing(&self, needle: &str) -> Vec<String> {
        filter_paths(&self.all_paths, |p| p.contains(needle))
    }

    /// All known paths starting with `prefix`, local paths first.
    pub fn find_paths_starting_with(&self, prefix: &str) -> Vec<String> {
        filter_paths(&self.all_paths, |p| p.starts_with(prefix))
    }

    /// Local paths containing `needle`.
    pub fn find_local_paths_containing(&self, needle: &str) -> Vec<String> {
        filter_paths(&self.local_paths, |p| p.contains(needle))
    }

    /// Paths containing `needle` together with their stringified values.
    pub fn find_properties_containing(&self, needle: &str) -> Vec<Property> {
        self.to_properties(self.find_paths_containing(needle))
    }

    /// Local paths containing `needle` together with their stringified values.
    pub fn find_local_properties_containing(&self, needle: &str) -> Vec<Property> {
        self.to_properties(self.find_local_paths_containing(needle))
    }

    fn to_properties(&self, keys: Vec<String>) -> Vec<Property> {
        keys.into_iter()
            .map(|key| {
                let value = self.get(&key).map(|v| stringify(&v)).unwrap_or_default();
                Property { key, value }
            })
            .collect()
    }

    /// Short display form of a path's value, or [`NO_VALUE`].
    pub fn preview_of(&self, path: &str) -> String {
        match self.get(path) {
            None | Some(Value::Null) => NO_VALUE.to_string(),
            Some(value) => truncate(&stringify(&value), PREVIEW_LENGTH),
        }
    }

    /// Builds an evaluation context over the current snapshot.
    pub fn context<'a>(
        &'a self,
        current_document: &'a str,
        custom_functions: &'a [CustomFunction],
    ) -> EvaluationContext<'a> {
        EvaluationContext::new(current_document, &self.tree).with_custom_functions(custom_functions)
    }
}

fn filter_paths(paths: &[String], keep: impl Fn(&str) -> bool) -> Vec<String> {
    paths.iter().filter(|p| keep(p)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryVault;
    use serde_json::json;

    fn vault() -> InMemoryVault {
        let mut vault = InMemoryVault::new();
        vault.insert_json("home.md", json!({"title": "Home"}));
        vault.insert_json("projects/budget.md", json!({"total": 10, "items": [1, 2]}));
        vault
    }

    #[test]
    fn builds_folder_hierarchy() {
        let tree = PropertyTree::build(&vault()).unwrap();
        assert!(tree.document("projects/budget.md").is_some());
        assert!(tree.document("projects").is_none());
        assert_eq!(tree.get("projects/budget.md/items[1]"), Some(Value::Integer(2)));
        assert_eq!(
            tree.get("projects/budget.md"),
            Some(Value::Object(tree.document("projects/budget.md").unwrap().clone()))
        );
        assert_eq!(tree.get("projects"), None);
        assert_eq!(tree.get("projects/missing.md/total"), None);
    }

    #[test]
    fn lists_global_paths_in_pre_order() {
        let tree = PropertyTree::build(&vault()).unwrap();
        assert_eq!(
            tree.paths(),
            vec![
                "home.md",
                "home.md/title",
                "projects",
                "projects/budget.md",
                "projects/budget.md/total",
                "projects/budget.md/items",
                "projects/budget.md/items[0]",
                "projects/budget.md/items[1]",
            ]
        );
    }

    #[test]
    fn snapshot_survives_refresh() {
        let mut store = PropertyStore::new(vault()).unwrap();
        let before = store.snapshot();
        store.refresh().unwrap();
        assert!(!Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(*before, *store.snapshot());
    }

    #[test]
    fn preview_is_capped() {
        let mut vault = vault();
        vault.insert_json("long.md", json!({"text": "x".repeat(80)}));
        let mut store = PropertyStore::new(vault).unwrap();
        store.refresh_for("long.md").unwrap();
        assert_eq!(store.preview_of("text"), format!("{}...", "x".repeat(50)));
        assert_eq!(store.preview_of("nothing"), NO_VALUE);
    }
}
