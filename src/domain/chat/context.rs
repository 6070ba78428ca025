use crate::domain::llm::Message;

/// Number of prior turns forwarded to the model
pub const MAX_HISTORY_MESSAGES: usize = 10;

const CONTEXT_HEADER: &str = "Answer using the reference context below when it is relevant. \
If the context does not contain the information needed, answer from your general knowledge \
and say clearly that the answer is not based on the provided sources.";

const CONTEXT_BEGIN: &str = "--- BEGIN CONTEXT ---";
const CONTEXT_END: &str = "--- END CONTEXT ---";
const SNIPPET_SEPARATOR: &str = "\n\n---\n\n";

/// Build the canonical message sequence for one turn.
///
/// Output order is fixed: system message, the most recent
/// [`MAX_HISTORY_MESSAGES`] history entries (oldest first), then the new
/// user message. Retrieved snippets are appended to the system text, never
/// sent as a message of their own.
pub fn build_messages(
    user_message: &str,
    history: &[Message],
    context_snippets: &[String],
    system_prompt: Option<&str>,
) -> Vec<Message> {
    let system_text = system_text(system_prompt.unwrap_or_default(), context_snippets);
    let kept = &history[history.len().saturating_sub(MAX_HISTORY_MESSAGES)..];

    let mut messages = Vec::with_capacity(kept.len() + 2);

    if !system_text.is_empty() {
        messages.push(Message::system(system_text));
    }

    messages.extend(kept.iter().cloned());
    messages.push(Message::user(user_message));
    messages
}

fn system_text(system_prompt: &str, context_snippets: &[String]) -> String {
    if context_snippets.is_empty() {
        return system_prompt.to_string();
    }

    let mut text = String::from(system_prompt);

    if !text.is_empty() {
        text.push_str("\n\n");
    }

    text.push_str(CONTEXT_HEADER);
    text.push_str("\n\n");
    text.push_str(CONTEXT_BEGIN);
    text.push('\n');
    text.push_str(&context_snippets.join(SNIPPET_SEPARATOR));
    text.push('\n');
    text.push_str(CONTEXT_END);
    text
}
