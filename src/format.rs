use serde::Serialize;
use serde_json::json;

use crate::{
    error::Result,
    finder::{ExampleSummary, MetadataView, SearchOutcome},
};

pub const NO_RESULTS: &str = "< no examples found >";

/// One summary per line.
pub fn summaries_human(summaries: &[ExampleSummary]) -> String {
    summaries.iter().map(|s| format!("{s}\n")).collect()
}

pub fn summaries_json(summaries: &[ExampleSummary]) -> Result<String> {
    pretty(&summaries)
}

pub fn search_human(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::NoResults => format!("{NO_RESULTS}\n"),
        SearchOutcome::Matches(matches) => summaries_human(matches),
    }
}

/// JSON search report; an empty outcome carries the same message the human
/// output prints.
pub fn search_json(query: &str, outcome: &SearchOutcome) -> Result<String> {
    let results = outcome.matches();
    let mut report = json!({
        "query": query,
        "result_count": results.len(),
        "no_results": outcome.is_empty(),
        "results": results,
    });
    if outcome.is_empty() {
        report["message"] = json!(NO_RESULTS);
    }
    pretty(&report)
}

pub fn metadata_human(view: &MetadataView) -> String {
    view.to_string()
}

pub fn metadata_json(view: &MetadataView) -> Result<String> {
    pretty(view)
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}
