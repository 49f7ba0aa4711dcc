//! dataviz-finder - a searchable catalog of data-visualization example
//! scripts.
//!
//! Example scripts live in one directory per language (`python/`, `R/`).
//! Each declares a `metadata` record (name, aliases, description, tags,
//! frameworks) that is read statically, without running the script. The
//! resulting catalog can be listed, searched by tag, and queried for a
//! single example's metadata or verbatim source.
//!
//! # Quick start
//!
//! ```no_run
//! use dataviz_finder::{CatalogConfig, Finder, SearchOutcome};
//!
//! let config = CatalogConfig::resolve(None, None).unwrap();
//! let finder = Finder::initialize(&config).unwrap();
//!
//! match finder.search_by_tags("colour by sign") {
//!     SearchOutcome::NoResults => println!("< no examples found >"),
//!     SearchOutcome::Matches(matches) => {
//!         for m in &matches {
//!             println!("{m}");
//!         }
//!     }
//! }
//!
//! print!("{}", finder.get_metadata(0).unwrap());
//! let code = finder.get_source(0).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod finder;
pub mod format;
pub mod language;
pub mod literal;
pub mod metadata;
pub mod python;
pub mod repository;
pub mod rscript;
pub mod walker;

pub use config::CatalogConfig;
pub use error::{Error, Result};
pub use finder::{ExampleSummary, FieldValue, Finder, MetadataView, SearchOutcome};
pub use language::Language;
pub use metadata::{ExampleMetadata, LoadedExample, MetadataSource, StaticExtractor};
pub use repository::{ExampleRecord, Repository};
pub use walker::SourceGroup;
