//! Prompt assembly
//!
//! Turns the selected search snippets and the user's query into the single
//! text prompt sent to the language model. Pure and deterministic.

use crate::search::SearchResult;

/// Combine snippets with the user query.
///
/// Blank snippets are dropped. With nothing left the prompt is the bare
/// query.
pub fn assemble<'a, I>(snippets: I, query: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let snippets: Vec<&str> = snippets
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if snippets.is_empty() {
        return query.to_string();
    }

    let mut prompt = String::from("Web snippets:\n");
    for snippet in snippets {
        prompt.push_str("- ");
        prompt.push_str(snippet);
        prompt.push('\n');
    }
    prompt.push_str("User query: ");
    prompt.push_str(query);
    prompt
}

/// Build a prompt from search results
pub fn from_results(results: &[SearchResult], query: &str) -> String {
    assemble(results.iter().filter_map(SearchResult::snippet), query)
}
