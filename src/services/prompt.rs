//! System prompt composition.

use crate::domain::models::ContextChunk;

/// Stand-in for the context block when retrieval found nothing.
pub const NO_CONTEXT: &str = "No relevant course content found.";

/// Stand-in for the profile block when the provider fails.
pub const PROFILE_UNAVAILABLE: &str = "Student profile is currently unavailable.";

const INSTRUCTIONS: &str = "\
You are a study assistant for an online learning platform. Help the student \
understand their course material.

Guidelines:
- Ground your answer in the course content below whenever it is relevant, \
and mention which lesson it comes from.
- If the course content does not cover the question, say so before answering \
from general knowledge.
- Use the student's profile to pitch explanations at the right level and to \
point at lessons they are enrolled in.
- Explain concepts and guide the student's reasoning; do not hand over \
complete solutions to graded work.
- Keep answers concise and well structured.";

/// Render retrieved chunks as `[From CODE - Title]` blocks separated by
/// blank lines.
pub fn format_context(chunks: &[ContextChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }

    chunks
        .iter()
        .map(|chunk| format!("[From {}]\n{}", chunk.lesson_label(), chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn system_prompt(profile: &str, context: &str) -> String {
    format!(
        "{INSTRUCTIONS}\n\n## Student profile\n{}\n\n## Relevant course content\n{}",
        profile.trim(),
        context.trim()
    )
}

/// First `max_chars` characters, with an ellipsis when something was cut.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
