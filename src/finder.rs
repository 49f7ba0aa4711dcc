use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    config::CatalogConfig,
    error::{Error, Result},
    language::Language,
    metadata::StaticExtractor,
    repository::{ExampleRecord, Repository},
};

/// One line of listing or search output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleSummary {
    pub index: usize,
    pub plot_name: Option<String>,
    pub language: Language,
    pub frameworks: BTreeSet<String>,
}

impl ExampleSummary {
    fn of(record: &ExampleRecord) -> Self {
        Self {
            index: record.index,
            plot_name: record.metadata.plot_name.clone(),
            language: record.language,
            frameworks: record.metadata.frameworks.clone(),
        }
    }
}

impl fmt::Display for ExampleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  [{}]  {}",
            self.index,
            self.plot_name.as_deref().unwrap_or(ABSENT),
            self.language,
            SetDisplay(&self.frameworks)
        )
    }
}

/// Result of a tag search. Finding nothing is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    NoResults,
    /// Matching examples, best match first.
    Matches(Vec<ExampleSummary>),
}

impl SearchOutcome {
    pub fn matches(&self) -> &[ExampleSummary] {
        match self {
            SearchOutcome::NoResults => &[],
            SearchOutcome::Matches(matches) => matches,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SearchOutcome::NoResults)
    }
}

const ABSENT: &str = "<absent>";

/// Width of the key column in the metadata display.
const KEY_WIDTH: usize = 15;

/// A displayable metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Set(BTreeSet<String>),
    Absent,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Set(set) => write!(f, "{}", SetDisplay(set)),
            FieldValue::Absent => f.write_str(ABSENT),
        }
    }
}

/// Every field of a record except its source text, in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataView {
    pub index: usize,
    pub fields: Vec<(String, FieldValue)>,
}

impl MetadataView {
    fn of(record: &ExampleRecord) -> Self {
        let meta = &record.metadata;
        let text = |value: &Option<String>| {
            value.clone().map_or(FieldValue::Absent, FieldValue::Text)
        };

        let mut fields = vec![
            ("plot_name".to_string(), text(&meta.plot_name)),
            (
                "plot_aliases".to_string(),
                FieldValue::Set(meta.plot_aliases.clone()),
            ),
            ("description".to_string(), text(&meta.description)),
            ("tags".to_string(), FieldValue::Set(meta.tags.clone())),
            (
                "frameworks".to_string(),
                FieldValue::Set(meta.frameworks.clone()),
            ),
            ("comments".to_string(), text(&meta.comments)),
        ];
        fields.extend(
            meta.extra
                .iter()
                .map(|(key, value)| (key.clone(), text(value))),
        );
        fields.push((
            "language".to_string(),
            FieldValue::Text(record.language.to_string()),
        ));

        Self {
            index: record.index,
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

impl fmt::Display for MetadataView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.fields {
            let key = key.to_uppercase();
            // Keep at least one space between key and value.
            let width = KEY_WIDTH.max(key.len() + 1);
            writeln!(f, "{key:width$}{value}")?;
        }
        Ok(())
    }
}

impl Serialize for MetadataView {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct SetDisplay<'a>(&'a BTreeSet<String>);

impl fmt::Display for SetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(item)?;
        }
        f.write_str("}")
    }
}

/// Read-only queries over a discovered catalog.
#[derive(Debug, Clone)]
pub struct Finder {
    repository: Repository,
}

impl Finder {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Discover the catalog described by `config` from disk.
    pub fn initialize(config: &CatalogConfig) -> Result<Self> {
        let groups = config.source_groups()?;
        let repository = Repository::discover(&groups, &StaticExtractor)?;
        Ok(Self::new(repository))
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Summaries of every example, in index order.
    pub fn list_all(&self) -> Vec<ExampleSummary> {
        self.repository.iter().map(ExampleSummary::of).collect()
    }

    /// Rank examples by how many of the query's words appear in their tags.
    ///
    /// The query is lower-cased and split on whitespace. Examples sharing
    /// no tag with the query are dropped; ties keep index order.
    pub fn search_by_tags(&self, query: &str) -> SearchOutcome {
        let lowered = query.to_lowercase();
        let words: HashSet<&str> = lowered.split_whitespace().collect();

        let mut scored: Vec<(usize, &ExampleRecord)> = self
            .repository
            .iter()
            .filter_map(|record| {
                let matched = record
                    .metadata
                    .tags
                    .iter()
                    .filter(|tag| words.contains(tag.as_str()))
                    .count();
                (matched > 0).then_some((matched, record))
            })
            .collect();

        if scored.is_empty() {
            return SearchOutcome::NoResults;
        }

        // `sort_by` is stable, so equal scores stay in index order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        SearchOutcome::Matches(
            scored
                .into_iter()
                .map(|(_, record)| ExampleSummary::of(record))
                .collect(),
        )
    }

    /// All metadata of one example, without its source text.
    pub fn get_metadata(&self, index: i64) -> Result<MetadataView> {
        self.record(index).map(MetadataView::of)
    }

    /// The verbatim source text of one example.
    pub fn get_source(&self, index: i64) -> Result<&str> {
        self.record(index).map(|record| record.source_text.as_str())
    }

    fn record(&self, index: i64) -> Result<&ExampleRecord> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.repository.get(i))
            .ok_or(Error::UnknownIndex {
                index,
                len: self.repository.len(),
            })
    }
}
