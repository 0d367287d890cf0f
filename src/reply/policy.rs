use super::invoker::Invoker;
use crate::error::Result;
use crate::observability::{CompletionPurpose, ObserverEvent};
use crate::persona::Persona;
use crate::prompt::{render_ban_check, PromptContext};

/// Only an exact `YES` (after trim and upper-casing) counts as banned.
/// Anything ambiguous is treated as safe.
pub fn is_banned_verdict(output: &str) -> bool {
    output.trim().to_uppercase() == "YES"
}

/// Ask the classifier whether `candidate` would be banned.
pub async fn is_banned(invoker: &Invoker<'_>, candidate: &str, persona: &Persona) -> Result<bool> {
    let prompt = render_ban_check(&PromptContext::identity(persona));
    let verdict = invoker
        .complete(
            &persona.model,
            &prompt,
            persona,
            Some(candidate),
            CompletionPurpose::BanCheck,
        )
        .await?;
    let banned = is_banned_verdict(&verdict);
    invoker.observer().record_event(&ObserverEvent::BanVerdict {
        model: persona.model.clone(),
        banned,
    });
    Ok(banned)
}
