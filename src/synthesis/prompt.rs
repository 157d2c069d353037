//! Prompt construction shared by all synthesis providers

use crate::results::ContentExcerpt;

/// System instruction for chat-style providers
pub const SYSTEM_PROMPT: &str =
    "You write new, original answers to search queries using excerpts from web pages.";

/// Reply the model is told to give when the excerpts are useless
pub const NO_RESULTS_REPLY: &str = "No results.";

/// Excerpts in result order, separated by a blank line
pub fn join_excerpts(excerpts: &[ContentExcerpt]) -> String {
    excerpts
        .iter()
        .map(ContentExcerpt::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Single user prompt embedding the query and every excerpt
pub fn build_prompt(query: &str, excerpts: &[ContentExcerpt]) -> String {
    format!(
        "Query: {query}\n\n\
         Search result excerpts:\n\n\
         {content}\n\n\
         Using the excerpts above, generate a new answer to the query in your own words. \
         Do not simply summarize the excerpts. \
         If nothing useful can be produced from them, reply exactly \"{NO_RESULTS_REPLY}\"",
        query = query.trim(),
        content = join_excerpts(excerpts),
    )
}
