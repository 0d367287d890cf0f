use crate::persona::Persona;

/// Turn literal `\n` escape sequences into real newlines.
pub fn unescape_newlines(reply: &str) -> String {
    reply.replace("\\n", "\n")
}

/// Final shaping of an accepted reply. Steps run in a fixed order:
/// unescape, strip periods, keep the first line.
pub fn format_reply(reply: &str, persona: &Persona) -> String {
    let behavior = &persona.posting_behavior;
    let mut formatted = unescape_newlines(reply);

    if behavior.remove_periods {
        formatted.retain(|c| c != '.');
    }

    if behavior.only_keep_first_sentence {
        if let Some(end) = formatted.find('\n') {
            formatted.truncate(end);
        }
    }

    tracing::debug!(reply = %formatted, "Formatted reply");
    formatted
}
