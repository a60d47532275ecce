//! Document loaders that yield typed records.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::record::{Entity, NodeLabel};

/// A lazy stream of decoded records. Per-document failures are yielded in place.
pub type LoadStream<'a, T> = Box<dyn Iterator<Item = LoadResult<T>> + Send + 'a>;

/// Source of typed records.
pub trait Loader {
    /// Stream every document of `T`'s kind, in stable order.
    ///
    /// The outer error is fatal (the collection cannot be listed); inner
    /// errors are scoped to a single document.
    fn load<T: Entity>(&self) -> LoadResult<LoadStream<'_, T>>;
}

/// Decode one TOML document into a record.
pub fn decode<T: Entity>(source_name: &str, text: &str) -> LoadResult<T> {
    toml::from_str(text).map_err(|e| LoadError::decode(source_name, e.message()))
}

/// Loads documents from `<root>/congress`, `<root>/committee` and `<root>/person`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    /// Open a data root, verifying every entity directory exists.
    pub fn open(root: impl Into<PathBuf>) -> LoadResult<Self> {
        let root = root.into();
        for label in NodeLabel::ALL {
            let dir = root.join(label.directory());
            if !dir.is_dir() {
                return Err(LoadError::MissingDirectory(dir));
            }
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted paths of every `*.toml` document for a label.
    pub fn document_paths(&self, label: NodeLabel) -> LoadResult<Vec<PathBuf>> {
        let dir = self.root.join(label.directory());
        let entries = std::fs::read_dir(&dir).map_err(|source| LoadError::ListDirectory {
            path: dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::ListDirectory {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        debug!(label = %label, count = paths.len(), dir = %dir.display(), "Listed documents");
        Ok(paths)
    }
}

impl Loader for DirectoryLoader {
    fn load<T: Entity>(&self) -> LoadResult<LoadStream<'_, T>> {
        let paths = self.document_paths(T::LABEL)?;
        Ok(Box::new(paths.into_iter().map(|path| {
            let text = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            decode(&path.display().to_string(), &text)
        })))
    }
}

/// Loads named documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct InlineLoader {
    documents: Vec<(NodeLabel, String, String)>,
}

impl InlineLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. Documents of a kind are yielded in insertion order.
    pub fn with_document(
        mut self,
        label: NodeLabel,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.documents.push((label, name.into(), text.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Loader for InlineLoader {
    fn load<T: Entity>(&self) -> LoadResult<LoadStream<'_, T>> {
        let matching: Vec<&(NodeLabel, String, String)> = self
            .documents
            .iter()
            .filter(|(label, _, _)| *label == T::LABEL)
            .collect();
        Ok(Box::new(
            matching
                .into_iter()
                .map(|(_, name, text)| decode::<T>(name, text)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Committee, Session};
    use std::fs;

    fn data_root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for label in NodeLabel::ALL {
            fs::create_dir(dir.path().join(label.directory())).unwrap();
        }
        dir
    }

    #[test]
    fn test_open_requires_all_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("congress")).unwrap();
        let err = DirectoryLoader::open(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::MissingDirectory(_)));
        assert!(!err.is_record_scoped());
    }

    #[test]
    fn test_loads_sorted_toml_documents() {
        let dir = data_root();
        let congress = dir.path().join("congress");
        fs::write(congress.join("19.toml"), "id = \"s19\"\nsession_number = 19").unwrap();
        fs::write(congress.join("08.toml"), "id = \"s8\"\nsession_number = 8").unwrap();
        fs::write(congress.join("README.md"), "not a document").unwrap();

        let loader = DirectoryLoader::open(dir.path()).unwrap();
        let sessions: Vec<Session> = loader
            .load::<Session>()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s8", "s19"]);
    }

    #[test]
    fn test_bad_document_is_yielded_in_place() {
        let dir = data_root();
        let committee = dir.path().join("committee");
        fs::write(committee.join("a.toml"), "id = \"c1\"\nname = \"Ways\"").unwrap();
        fs::write(committee.join("b.toml"), "id = ").unwrap();
        fs::write(committee.join("c.toml"), "id = \"c3\"\nname = \"Rules\"").unwrap();

        let loader = DirectoryLoader::open(dir.path()).unwrap();
        let results: Vec<_> = loader.load::<Committee>().unwrap().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(err.is_record_scoped());
        assert!(err.source_name().ends_with("b.toml"));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_inline_loader_filters_by_kind() {
        let loader = InlineLoader::new()
            .with_document(NodeLabel::Congress, "s1", "id = \"s1\"\nsession_number = 1")
            .with_document(NodeLabel::Committee, "c1", "id = \"c1\"\nname = \"Ways\"");

        let sessions: Vec<_> = loader.load::<Session>().unwrap().collect();
        assert_eq!(sessions.len(), 1);
        assert_eq!(loader.load::<Session>().unwrap().size_hint(), (1, Some(1)));
    }
}
