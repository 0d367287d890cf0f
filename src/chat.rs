use crate::persona::Persona;
use crate::reply::ReplyEngine;

/// What users see when generation fails for any reason.
pub const APOLOGY: &str = "Sorry, I encountered an error processing your message.";

/// Reply to a chat message, never failing.
///
/// Group messages use chat mode. Errors are logged and replaced with
/// [`APOLOGY`].
pub async fn handle_chat_message(
    engine: &ReplyEngine,
    input: &str,
    persona: &Persona,
    is_group: bool,
    chat_history: Option<&str>,
) -> String {
    match engine.generate_reply(input, persona, is_group, chat_history).await {
        Ok(generated) => generated.reply,
        Err(e) => {
            tracing::error!(persona = %persona.username, error = %e, "Error in chat message handling");
            APOLOGY.to_string()
        }
    }
}
