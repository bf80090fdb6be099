//! Prompt assembly.
//!
//! Wraps the retrieved chunks in a fixed instruction template so the
//! result can be pasted straight into an external chat tool.

use crate::models::QueryMatch;

/// Default instructions placed at the top of every prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"
### SYSTEM INSTRUCTIONS
You are a helpful AI assistant. Your primary task is to answer the user's query using the PROVIDED CONTEXT below.
1. Always start your response by acknowledging the context (e.g., "According to the provided documents...").
2. If the answer is not in the context, explicitly state: "The provided context does not contain information about this, but based on general knowledge..."
3. Keep your response concise and directly related to the user's query.
4. If context is relevant but insufficient, combine it with your own knowledge to provide a comprehensive answer. Explicitly mention that the answer is based on your knowledge.

You will be provided with a Query and a set of documents from a vector database as context.
"#;

pub const CONTEXT_HEADER: &str = "### CONTEXT FROM VECTOR DB";
pub const CONTEXT_FOOTER: &str = "--- END OF CONTEXT ---";

/// Build the final prompt from the system instructions, the query, and
/// the retrieved chunks (in rank order).
pub fn build_prompt(system_prompt: &str, query: &str, matches: &[QueryMatch]) -> String {
    let mut prompt = format!("{}\n{}\nQuery: {}\n\n", system_prompt, CONTEXT_HEADER, query);
    for m in matches {
        prompt.push_str("- ");
        prompt.push_str(&m.text);
        prompt.push_str("\n\n");
    }
    prompt.push_str(CONTEXT_FOOTER);
    prompt
}
