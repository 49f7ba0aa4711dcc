//! Catalog configuration: where the source groups live and how their
//! files are picked.
//!
//! Settings come from an optional TOML file; every field has a default so
//! an empty (or missing) file describes the conventional layout of a
//! `python/` and an `R/` directory under the catalog root.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    language::Language,
    walker::{ExtensionFilter, SourceGroup},
};

pub const CONFIG_ENV: &str = "DATAVIZ_FINDER_CONFIG";
pub const ROOT_ENV: &str = "DATAVIZ_FINDER_ROOT";
const XDG_PREFIX: &str = "dataviz-finder";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Directory that group directories are resolved against.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Sort files by name inside each group so indices are reproducible.
    #[serde(default = "default_sort_by_name")]
    pub sort_by_name: bool,

    #[serde(default = "default_groups")]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupConfig {
    pub language: Language,

    /// Defaults to the language's display name (`python`, `R`).
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Defaults to the language's conventional token (`.py`, `.r`).
    #[serde(default)]
    pub extension: Option<String>,

    /// Glob patterns on file names to leave out.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

impl GroupConfig {
    pub fn for_language(language: Language) -> Self {
        Self {
            language,
            directory: None,
            extension: None,
            ignore: default_ignore(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_sort_by_name() -> bool {
    true
}

fn default_groups() -> Vec<GroupConfig> {
    Language::ALL.into_iter().map(GroupConfig::for_language).collect()
}

fn default_ignore() -> Vec<String> {
    vec!["__init__.py".to_string()]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            sort_by_name: default_sort_by_name(),
            groups: default_groups(),
        }
    }
}

impl CatalogConfig {
    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(toml::from_str(&text)?)
    }

    /// Resolve the effective configuration.
    ///
    /// The config file is, in order of priority:
    /// 1. An explicit path (from --config)
    /// 2. The DATAVIZ_FINDER_CONFIG environment variable
    /// 3. `$XDG_CONFIG_HOME/dataviz-finder/config.toml`, if it exists
    ///
    /// otherwise built-in defaults apply. The catalog root is then
    /// overridden by an explicit path (from --root) or DATAVIZ_FINDER_ROOT.
    pub fn resolve(
        explicit_config: Option<&Path>,
        explicit_root: Option<&Path>,
    ) -> Result<Self> {
        Self::resolve_with(explicit_config, explicit_root, |key| {
            std::env::var(key).ok()
        })
    }

    /// [`CatalogConfig::resolve`] with an injectable environment lookup.
    pub fn resolve_with(
        explicit_config: Option<&Path>,
        explicit_root: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let config_path = if let Some(path) = explicit_config {
            Some(path.to_path_buf())
        } else if let Some(val) = env(CONFIG_ENV) {
            Some(PathBuf::from(val))
        } else {
            xdg::BaseDirectories::with_prefix(XDG_PREFIX)
                .find_config_file(CONFIG_FILE)
        };

        let mut config = match config_path {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load(&path)?
            }
            None => Self::default(),
        };

        if let Some(root) = explicit_root {
            config.root = root.to_path_buf();
        } else if let Some(val) = env(ROOT_ENV) {
            config.root = PathBuf::from(val);
        }

        Ok(config)
    }

    /// Build the source groups this config describes.
    pub fn source_groups(&self) -> Result<Vec<SourceGroup>> {
        self.groups
            .iter()
            .map(|group| {
                let directory = group.directory.clone().unwrap_or_else(|| {
                    PathBuf::from(group.language.as_str())
                });
                let extension = group
                    .extension
                    .as_deref()
                    .unwrap_or(group.language.default_extension());
                if extension.is_empty() {
                    return Err(Error::Config(format!(
                        "empty extension for {} group",
                        group.language
                    )));
                }

                let mut ignore = GlobSetBuilder::new();
                for pattern in &group.ignore {
                    ignore.add(Glob::new(pattern)?);
                }

                Ok(SourceGroup {
                    language: group.language,
                    directory: self.root.join(directory),
                    filter: ExtensionFilter::new(extension),
                    ignore: ignore.build()?,
                    sort_by_name: self.sort_by_name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_describe_python_and_r_groups() {
        let config = CatalogConfig::default();
        let groups = config.source_groups().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].language, Language::Python);
        assert_eq!(groups[0].directory, PathBuf::from("./python"));
        assert_eq!(groups[0].filter.token(), ".py");
        assert!(groups[0].ignore.is_match("__init__.py"));
        assert_eq!(groups[1].directory, PathBuf::from("./R"));
        assert_eq!(groups[1].filter.token(), ".r");
        assert!(groups[1].sort_by_name);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: CatalogConfig = toml::from_str("").unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn custom_groups_from_toml() {
        let text = r#"
root = "/srv/catalog"
sort_by_name = false

[[groups]]
language = "r"
directory = "ggplot"
extension = ".R"
ignore = []
"#;
        let config: CatalogConfig = toml::from_str(text).unwrap();
        assert!(!config.sort_by_name);
        let groups = config.source_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].language, Language::R);
        assert_eq!(groups[0].directory, PathBuf::from("/srv/catalog/ggplot"));
        assert_eq!(groups[0].filter.token(), ".r");
        assert!(!groups[0].sort_by_name);
    }

    #[test]
    fn invalid_glob_is_reported() {
        let mut config = CatalogConfig::default();
        config.groups[0].ignore = vec!["[".to_string()];
        assert!(matches!(config.source_groups(), Err(Error::Glob(_))));
    }

    #[test]
    fn empty_extension_is_rejected() {
        let mut config = CatalogConfig::default();
        config.groups[1].extension = Some(String::new());
        assert!(matches!(config.source_groups(), Err(Error::Config(_))));
    }

    #[test]
    fn explicit_paths_win() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("finder.toml");
        std::fs::write(&path, "root = \"from-file\"\n").unwrap();

        let config = CatalogConfig::resolve_with(Some(&path), None, no_env)
            .unwrap();
        assert_eq!(config.root, PathBuf::from("from-file"));

        let config = CatalogConfig::resolve_with(
            Some(&path),
            Some(Path::new("explicit")),
            |key| (key == ROOT_ENV).then(|| "from-env".to_string()),
        )
        .unwrap();
        assert_eq!(config.root, PathBuf::from("explicit"));
    }

    #[test]
    fn environment_is_consulted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("finder.toml");
        std::fs::write(&path, "sort_by_name = false\n").unwrap();
        let config_path = path.to_string_lossy().into_owned();

        let config = CatalogConfig::resolve_with(None, None, |key| match key {
            CONFIG_ENV => Some(config_path.clone()),
            ROOT_ENV => Some("env-root".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(!config.sort_by_name);
        assert_eq!(config.root, PathBuf::from("env-root"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CatalogConfig::resolve_with(
            Some(&tmp.path().join("absent.toml")),
            None,
            no_env,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("finder.toml");
        std::fs::write(&path, "[[groups]]\nlanguage = \"julia\"\n").unwrap();
        let err =
            CatalogConfig::resolve_with(Some(&path), None, no_env).unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }
}
