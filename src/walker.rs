use std::path::PathBuf;

use globset::GlobSet;
use tracing::{debug, warn};

use crate::{error::Result, language::Language};

/// Case-insensitive substring match of an extension token on file names.
///
/// `.r` matches `plot.R`, `plot.r` and `plot.Rmd` alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    token: String,
}

impl ExtensionFilter {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_lowercase(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.to_lowercase().contains(&self.token)
    }
}

/// A directory of example scripts sharing one language.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    pub language: Language,
    pub directory: PathBuf,
    pub filter: ExtensionFilter,
    /// File names matching any of these globs are not examples.
    pub ignore: GlobSet,
    /// Sort candidates by file name instead of keeping listing order.
    pub sort_by_name: bool,
}

impl SourceGroup {
    pub fn new(language: Language, directory: impl Into<PathBuf>) -> Self {
        Self {
            language,
            directory: directory.into(),
            filter: ExtensionFilter::new(language.default_extension()),
            ignore: GlobSet::empty(),
            sort_by_name: true,
        }
    }
}

/// A candidate example file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub language: Language,
    pub file_name: String,
    pub path: PathBuf,
}

/// List the candidate example files of a group.
///
/// Only direct children are considered; hidden entries and
/// sub-directories are skipped. A missing group directory yields no files.
pub fn discover_files(group: &SourceGroup) -> Result<Vec<DiscoveredFile>> {
    let entries = match std::fs::read_dir(&group.directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                language = %group.language,
                directory = %group.directory.display(),
                "source group directory does not exist"
            );
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut results = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();

        if file_name.starts_with('.') {
            continue;
        }
        // Follows symlinks, so linked example files count.
        if !entry.path().is_file() {
            continue;
        }
        if !group.filter.matches(&file_name) {
            continue;
        }
        if group.ignore.is_match(&file_name) {
            debug!(file = %file_name, "ignored by pattern");
            continue;
        }

        results.push(DiscoveredFile {
            language: group.language,
            path: entry.path(),
            file_name,
        });
    }

    if group.sort_by_name {
        results.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    }
    Ok(results)
}
