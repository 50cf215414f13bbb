//! Prompt text helpers

/// Build the prompt sent to the response model.
///
/// Non-empty context is placed first, separated from the new utterance by a
/// blank line. The prompt always ends with the brevity instruction.
pub fn build_prompt(context: &str, user_text: &str, max_reply_chars: usize) -> String {
    let instruction = format!(
        "Answer briefly and concisely in no more than {} characters.",
        max_reply_chars
    );

    if context.is_empty() {
        format!("{}\n{}", user_text, instruction)
    } else {
        format!("{}\n\nUser: {}\n{}", context, user_text, instruction)
    }
}
