use crate::persona::Persona;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("placeholder pattern compiles"));

/// The closed set of variables a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    AgentName,
    Username,
    Bio,
    Lore,
    PostDirections,
    OriginalPost,
    Knowledge,
    ChatModeRules,
    RecentHistory,
}

impl Var {
    pub const ALL: [Var; 9] = [
        Var::AgentName,
        Var::Username,
        Var::Bio,
        Var::Lore,
        Var::PostDirections,
        Var::OriginalPost,
        Var::Knowledge,
        Var::ChatModeRules,
        Var::RecentHistory,
    ];

    /// Placeholder name as written inside `{{ }}`.
    pub fn name(self) -> &'static str {
        match self {
            Var::AgentName => "agentName",
            Var::Username => "username",
            Var::Bio => "bio",
            Var::Lore => "lore",
            Var::PostDirections => "postDirections",
            Var::OriginalPost => "originalPost",
            Var::Knowledge => "knowledge",
            Var::ChatModeRules => "chatModeRules",
            Var::RecentHistory => "recentHistory",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

/// Anything that can answer a placeholder lookup.
pub trait TemplateContext {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> TemplateContext for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Typed prompt variables. Multi-line persona fields are newline-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub agent_name: String,
    pub username: String,
    pub bio: String,
    pub lore: String,
    pub post_directions: String,
    pub original_post: String,
    pub knowledge: String,
    pub chat_mode_rules: String,
    pub recent_history: String,
}

impl PromptContext {
    /// Identity only: name and handle. Used by the ban check.
    pub fn identity(persona: &Persona) -> Self {
        Self {
            agent_name: persona.agent_name.clone(),
            username: persona.username.clone(),
            ..Self::default()
        }
    }

    /// Everything the persona contributes; input and history are left empty.
    pub fn for_persona(persona: &Persona) -> Self {
        Self {
            bio: persona.bio.join("\n"),
            lore: persona.lore.join("\n"),
            post_directions: persona.post_directions.join("\n"),
            knowledge: persona.knowledge.join("\n"),
            chat_mode_rules: persona.posting_behavior.chat_mode_rules.join("\n"),
            ..Self::identity(persona)
        }
    }

    pub fn with_original_post(mut self, post: impl Into<String>) -> Self {
        self.original_post = post.into();
        self
    }

    pub fn with_recent_history(mut self, history: Option<&str>) -> Self {
        self.recent_history = history.unwrap_or_default().to_string();
        self
    }

    pub fn get(&self, var: Var) -> &str {
        match var {
            Var::AgentName => &self.agent_name,
            Var::Username => &self.username,
            Var::Bio => &self.bio,
            Var::Lore => &self.lore,
            Var::PostDirections => &self.post_directions,
            Var::OriginalPost => &self.original_post,
            Var::Knowledge => &self.knowledge,
            Var::ChatModeRules => &self.chat_mode_rules,
            Var::RecentHistory => &self.recent_history,
        }
    }
}

impl TemplateContext for PromptContext {
    fn lookup(&self, key: &str) -> Option<&str> {
        Var::from_name(key).map(|var| self.get(var))
    }
}

/// Substitute every `{{name}}` in `template`.
///
/// Unknown names render as the empty string. Anything that is not a
/// well-formed placeholder is copied through literally. Substitution is a
/// single pass: values are never re-scanned.
pub fn render(template: &str, context: &impl TemplateContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            context.lookup(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Names of all well-formed placeholders in `template`, in order.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_every_occurrence() {
        let ctx = map(&[("name", "Rook")]);
        assert_eq!(render("{{name}} and {{name}}", &ctx), "Rook and Rook");
    }

    #[test]
    fn unknown_keys_render_empty() {
        let ctx = map(&[]);
        assert_eq!(render("a{{missing}}b", &ctx), "ab");
    }

    #[test]
    fn malformed_braces_are_literal() {
        let ctx = map(&[("x", "1")]);
        assert_eq!(render("{{x}", &ctx), "{{x}");
        assert_eq!(render("{x}}", &ctx), "{x}}");
        assert_eq!(render("{{ x }}", &ctx), "{{ x }}");
        assert_eq!(render("{{{x}}}", &ctx), "{1}");
        assert_eq!(render("{{", &ctx), "{{");
    }

    #[test]
    fn values_are_not_rescanned() {
        let ctx = map(&[("a", "{{b}}"), ("b", "oops")]);
        assert_eq!(render("{{a}}", &ctx), "{{b}}");
    }

    #[test]
    fn typed_context_resolves_camel_case_names() {
        let mut persona = Persona::new("Rook", "rook_bot", "m");
        persona.bio = vec!["line one".into(), "line two".into()];
        let ctx = PromptContext::for_persona(&persona).with_original_post("gg");
        assert_eq!(
            render("{{agentName}}/{{username}}/{{originalPost}}\n{{bio}}", &ctx),
            "Rook/rook_bot/gg\nline one\nline two"
        );
        assert_eq!(render("{{notAVar}}", &ctx), "");
    }

    #[test]
    fn identity_context_carries_no_narrative() {
        let mut persona = Persona::new("Rook", "rook_bot", "m");
        persona.lore = vec!["secret".into()];
        let ctx = PromptContext::identity(&persona);
        assert_eq!(ctx.lore, "");
        assert_eq!(ctx.username, "rook_bot");
    }

    #[test]
    fn var_names_round_trip() {
        for var in Var::ALL {
            assert_eq!(Var::from_name(var.name()), Some(var));
        }
        assert_eq!(Var::from_name("AgentName"), None);
    }

    #[test]
    fn placeholders_lists_keys_in_order() {
        assert_eq!(placeholders("{{a}} {b} {{c}}"), vec!["a", "c"]);
    }
}
