use std::{collections::BTreeSet, path::Path};

use serde::Serialize;
use tracing::warn;

use crate::{
    error::{Error, Result},
    language::Language,
    literal::{Literal, LiteralError},
    python,
    rscript,
};

/// The metadata record an example script declares about itself.
///
/// Identity fields may be absent; such a record still enters the catalog
/// and simply displays the missing fields as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExampleMetadata {
    pub plot_name: Option<String>,
    pub plot_aliases: BTreeSet<String>,
    pub description: Option<String>,
    /// Lower-cased search keywords.
    pub tags: BTreeSet<String>,
    pub frameworks: BTreeSet<String>,
    pub comments: Option<String>,
    /// Keys outside the known set, stringified, in declaration order.
    /// `None` marks a key declared with a null value.
    pub extra: Vec<(String, Option<String>)>,
}

impl ExampleMetadata {
    /// Convert an extracted literal into a metadata record.
    ///
    /// Fails only when the literal is not a key/value record at all.
    pub fn from_literal(literal: Literal) -> std::result::Result<Self, String> {
        let entries = match literal {
            Literal::Map(entries) => entries,
            other => {
                return Err(format!(
                    "expected a key/value record, found {other}"
                ));
            }
        };

        let mut meta = Self::default();
        for (key, value) in entries {
            match key.as_str() {
                "plot_name" => meta.plot_name = text_field(&key, &value),
                "description" => meta.description = text_field(&key, &value),
                "comments" => meta.comments = text_field(&key, &value),
                "plot_aliases" => meta.plot_aliases = set_field(&key, &value),
                "frameworks" => meta.frameworks = set_field(&key, &value),
                "tags" => {
                    meta.tags = set_field(&key, &value)
                        .into_iter()
                        .map(|tag| tag.to_lowercase())
                        .collect();
                }
                _ => meta.extra.push((key, value.as_text())),
            }
        }
        Ok(meta)
    }

    /// Builder-style constructor for catalogs assembled in code.
    pub fn named(plot_name: impl Into<String>) -> Self {
        Self {
            plot_name: Some(plot_name.into()),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags.into_iter().map(|t| t.as_ref().to_lowercase()).collect();
        self
    }

    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }
}

fn text_field(key: &str, value: &Literal) -> Option<String> {
    if matches!(value, Literal::Seq(_) | Literal::Map(_)) {
        warn!(key, "expected text metadata field, found {value}");
    }
    value.as_text()
}

fn set_field(key: &str, value: &Literal) -> BTreeSet<String> {
    if matches!(value, Literal::Map(entries) if !entries.is_empty()) {
        warn!(key, "expected a set of strings, found {value}");
    }
    value.to_string_set()
}

/// A script's metadata plus its verbatim text.
#[derive(Debug, Clone)]
pub struct LoadedExample {
    pub metadata: ExampleMetadata,
    pub source_text: String,
}

/// Produces the declared metadata record and raw text for one file.
///
/// Discovery depends only on this seam, so tests and embedders can swap
/// in their own loading strategy.
pub trait MetadataSource: Send + Sync {
    fn load(&self, language: Language, path: &Path) -> Result<LoadedExample>;
}

/// Reads example files from disk and extracts the `metadata` literal
/// statically, without executing any example code.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticExtractor;

impl StaticExtractor {
    /// Extract metadata from already-loaded text.
    pub fn extract(
        language: Language,
        path: &Path,
        text: &str,
    ) -> Result<ExampleMetadata> {
        let extracted: std::result::Result<Option<Literal>, LiteralError> =
            match language {
                Language::Python => python::extract_metadata(text),
                Language::R => rscript::extract_metadata(text),
            };

        let literal = extracted
            .map_err(|e| Error::Metadata {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .ok_or_else(|| Error::MissingMetadata {
                path: path.to_path_buf(),
            })?;

        ExampleMetadata::from_literal(literal).map_err(|message| {
            Error::Metadata {
                path: path.to_path_buf(),
                message,
            }
        })
    }
}

impl MetadataSource for StaticExtractor {
    fn load(&self, language: Language, path: &Path) -> Result<LoadedExample> {
        let source_text =
            std::fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let metadata = Self::extract(language, path, &source_text)?;
        Ok(LoadedExample {
            metadata,
            source_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fields_are_mapped() {
        let literal = Literal::Map(vec![
            ("plot_name".into(), Literal::Str("Bar Plot".into())),
            (
                "plot_aliases".into(),
                Literal::Seq(vec![Literal::Str("Bar Chart".into())]),
            ),
            ("description".into(), Literal::Str("bars".into())),
            (
                "tags".into(),
                Literal::Seq(vec![
                    Literal::Str("Bar".into()),
                    Literal::Str("stacked".into()),
                ]),
            ),
            ("frameworks".into(), Literal::Str("matplotlib".into())),
            ("comments".into(), Literal::Null),
            ("difficulty".into(), Literal::Scalar("2".into())),
        ]);

        let meta = ExampleMetadata::from_literal(literal).unwrap();
        assert_eq!(meta.plot_name.as_deref(), Some("Bar Plot"));
        assert!(meta.plot_aliases.contains("Bar Chart"));
        assert_eq!(meta.description.as_deref(), Some("bars"));
        assert_eq!(
            meta.tags,
            BTreeSet::from(["bar".to_string(), "stacked".to_string()])
        );
        assert_eq!(meta.frameworks.len(), 1);
        assert_eq!(meta.comments, None);
        assert_eq!(
            meta.extra,
            vec![("difficulty".to_string(), Some("2".to_string()))]
        );
    }

    #[test]
    fn null_extra_fields_are_kept() {
        let literal = Literal::Map(vec![
            ("reviewed_by".into(), Literal::Null),
            ("difficulty".into(), Literal::Str("easy".into())),
        ]);
        let meta = ExampleMetadata::from_literal(literal).unwrap();
        assert_eq!(
            meta.extra,
            vec![
                ("reviewed_by".to_string(), None),
                ("difficulty".to_string(), Some("easy".to_string())),
            ]
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let meta = ExampleMetadata::from_literal(Literal::Map(vec![])).unwrap();
        assert_eq!(meta, ExampleMetadata::default());
    }

    #[test]
    fn non_record_literal_is_rejected() {
        let err = ExampleMetadata::from_literal(Literal::Str("x".into()))
            .unwrap_err();
        assert!(err.contains("key/value"));
    }

    #[test]
    fn load_reads_python_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plot.py");
        let text = "metadata = {'plot_name': 'P', 'tags': {'line'}}\nprint(1)\n";
        std::fs::write(&path, text).unwrap();

        let loaded = StaticExtractor.load(Language::Python, &path).unwrap();
        assert_eq!(loaded.source_text, text);
        assert_eq!(loaded.metadata.plot_name.as_deref(), Some("P"));
    }

    #[test]
    fn load_without_metadata_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plot.R");
        std::fs::write(&path, "library(ggplot2)\n").unwrap();

        let err = StaticExtractor.load(Language::R, &path).unwrap_err();
        assert!(matches!(err, Error::MissingMetadata { .. }));
    }

    #[test]
    fn load_with_broken_literal_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plot.py");
        std::fs::write(&path, "metadata = {'plot_name': \n").unwrap();

        let err = StaticExtractor.load(Language::Python, &path).unwrap_err();
        assert!(matches!(err, Error::Metadata { .. }));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = StaticExtractor
            .load(Language::Python, &tmp.path().join("nope.py"))
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
