use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    error::Result,
    language::Language,
    metadata::{ExampleMetadata, LoadedExample, MetadataSource},
    walker::{self, DiscoveredFile, SourceGroup},
};

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRecord {
    pub index: usize,
    pub metadata: ExampleMetadata,
    pub language: Language,
    pub source_text: String,
}

/// The immutable, in-memory catalog of example records.
///
/// Indices are `0..len()` in discovery order: groups in the order given,
/// then files in each group's listing order.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    records: Vec<ExampleRecord>,
}

impl Repository {
    /// Scan every source group and load all candidate files.
    ///
    /// Any file that fails to load aborts the whole discovery; no partial
    /// catalog is returned.
    pub fn discover(
        groups: &[SourceGroup],
        source: &dyn MetadataSource,
    ) -> Result<Self> {
        let mut files: Vec<DiscoveredFile> = Vec::new();
        for group in groups {
            let found = walker::discover_files(group)?;
            debug!(
                language = %group.language,
                directory = %group.directory.display(),
                count = found.len(),
                "listed source group"
            );
            files.extend(found);
        }

        // Load in parallel; collect keeps input order so indices stay
        // deterministic.
        let loaded: Vec<(Language, LoadedExample)> = files
            .par_iter()
            .map(|file| {
                debug!(path = %file.path.display(), "loading example");
                source
                    .load(file.language, &file.path)
                    .map(|example| (file.language, example))
            })
            .collect::<Result<_>>()?;

        let records = loaded
            .into_iter()
            .enumerate()
            .map(|(index, (language, example))| ExampleRecord {
                index,
                metadata: example.metadata,
                language,
                source_text: example.source_text,
            })
            .collect::<Vec<_>>();

        info!(examples = records.len(), "catalog built");
        Ok(Self { records })
    }

    /// Build a catalog from records prepared elsewhere, renumbering them
    /// `0..n` in the given order.
    pub fn from_records(
        records: impl IntoIterator<Item = (ExampleMetadata, Language, String)>,
    ) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(index, (metadata, language, source_text))| ExampleRecord {
                index,
                metadata,
                language,
                source_text,
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ExampleRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[ExampleRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExampleRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Repository {
    type Item = &'a ExampleRecord;
    type IntoIter = std::slice::Iter<'a, ExampleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        path::{Path, PathBuf},
    };

    use super::*;
    use crate::{error::Error, metadata::StaticExtractor};

    /// Serves metadata from memory keyed by file name.
    struct FakeSource {
        entries: HashMap<String, ExampleMetadata>,
    }

    impl MetadataSource for FakeSource {
        fn load(
            &self,
            _language: Language,
            path: &Path,
        ) -> Result<LoadedExample> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let metadata = self.entries.get(&name).cloned().ok_or_else(|| {
                Error::MissingMetadata {
                    path: PathBuf::from(path),
                }
            })?;
            Ok(LoadedExample {
                metadata,
                source_text: std::fs::read_to_string(path)?,
            })
        }
    }

    fn write(dir: &Path, name: &str, text: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn indices_are_contiguous_across_groups() {
        let tmp = tempfile::tempdir().unwrap();
        let py = tmp.path().join("python");
        let r = tmp.path().join("R");
        write(&py, "b.py", "metadata = {'plot_name': 'B'}\n");
        write(&py, "a.py", "metadata = {'plot_name': 'A'}\n");
        write(&r, "c.R", "metadata <- list(plot_name = 'C')\n");

        let groups = [
            SourceGroup::new(Language::Python, &py),
            SourceGroup::new(Language::R, &r),
        ];
        let repo = Repository::discover(&groups, &StaticExtractor).unwrap();

        assert_eq!(repo.len(), 3);
        let indices: Vec<_> = repo.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let names: Vec<_> = repo
            .iter()
            .map(|r| r.metadata.plot_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(repo.get(2).unwrap().language, Language::R);
    }

    #[test]
    fn source_text_is_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let text = "metadata = {'plot_name': 'A'}\r\n\n  # trailing  \n";
        write(tmp.path(), "a.py", text);

        let groups = [SourceGroup::new(Language::Python, tmp.path())];
        let repo = Repository::discover(&groups, &StaticExtractor).unwrap();
        assert_eq!(repo.get(0).unwrap().source_text, text);
    }

    #[test]
    fn missing_metadata_aborts_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "good.py", "metadata = {'plot_name': 'A'}\n");
        write(tmp.path(), "bad.py", "print('no metadata here')\n");

        let groups = [SourceGroup::new(Language::Python, tmp.path())];
        let err = Repository::discover(&groups, &StaticExtractor).unwrap_err();
        match err {
            Error::MissingMetadata { path } => {
                assert!(path.ends_with("bad.py"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_groups_or_files_is_empty() {
        let repo = Repository::discover(&[], &StaticExtractor).unwrap();
        assert!(repo.is_empty());

        let tmp = tempfile::tempdir().unwrap();
        let groups = [SourceGroup::new(Language::R, tmp.path().join("R"))];
        let repo = Repository::discover(&groups, &StaticExtractor).unwrap();
        assert_eq!(repo.len(), 0);
    }

    #[test]
    fn custom_metadata_source() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "x.py", "anything");
        let source = FakeSource {
            entries: HashMap::from([(
                "x.py".to_string(),
                ExampleMetadata::named("From fake").with_tags(["fake"]),
            )]),
        };

        let groups = [SourceGroup::new(Language::Python, tmp.path())];
        let repo = Repository::discover(&groups, &source).unwrap();
        let record = repo.get(0).unwrap();
        assert_eq!(record.metadata.plot_name.as_deref(), Some("From fake"));
        assert_eq!(record.source_text, "anything");
    }

    #[test]
    fn from_records_renumbers() {
        let repo = Repository::from_records([
            (ExampleMetadata::named("one"), Language::Python, String::new()),
            (ExampleMetadata::named("two"), Language::R, String::new()),
        ]);
        assert_eq!(repo.records()[1].index, 1);
        assert_eq!(repo.records()[1].language, Language::R);
    }
}
