//! Persona records — the character configuration that drives tone, prompt
//! content and model choice.
//!
//! Personas are loaded once from a JSON array (`characters.json`) and then
//! shared read-only. Nothing in the reply pipeline mutates a persona; the
//! model used for a given completion is passed explicitly instead.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_temperature() -> f32 {
    0.7
}

/// Reply-shaping and chat-mode settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingBehavior {
    /// Strip every `.` from accepted replies.
    #[serde(default)]
    pub remove_periods: bool,
    /// Keep only the text before the first newline.
    #[serde(default)]
    pub only_keep_first_sentence: bool,
    /// Extra rules rendered into the chat-mode prompt.
    #[serde(default)]
    pub chat_mode_rules: Vec<String>,
    /// Model override used only for chat-mode completions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_mode_model: Option<String>,
}

/// Image prompt generation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationBehavior {
    #[serde(default)]
    pub provider: String,
    /// Model used to rewrite image prompts; falls back to the primary model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_generation_prompt_model: Option<String>,
}

/// A character the pipeline speaks as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub agent_name: String,
    pub username: String,
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub post_directions: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub adjectives: Vec<String>,
    #[serde(default)]
    pub knowledge: Vec<String>,
    #[serde(default)]
    pub posting_behavior: PostingBehavior,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_generation_behavior: Option<ImageGenerationBehavior>,
}

/// Treats `""` the same as an absent model id.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl Persona {
    /// Minimal persona with a primary model and nothing else configured.
    pub fn new(agent_name: impl Into<String>, username: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            username: username.into(),
            bio: Vec::new(),
            lore: Vec::new(),
            post_directions: Vec::new(),
            topics: Vec::new(),
            adjectives: Vec::new(),
            knowledge: Vec::new(),
            posting_behavior: PostingBehavior::default(),
            model: model.into(),
            fallback_model: None,
            temperature: default_temperature(),
            image_generation_behavior: None,
        }
    }

    pub fn fallback_model(&self) -> Option<&str> {
        non_empty(self.fallback_model.as_ref())
    }

    pub fn chat_mode_model(&self) -> Option<&str> {
        non_empty(self.posting_behavior.chat_mode_model.as_ref())
    }

    pub fn image_prompt_model(&self) -> &str {
        self.image_generation_behavior
            .as_ref()
            .and_then(|b| non_empty(b.image_generation_prompt_model.as_ref()))
            .unwrap_or(&self.model)
    }

    /// Matches either the display name or the handle, case-insensitively.
    pub fn answers_to(&self, name: &str) -> bool {
        self.agent_name.eq_ignore_ascii_case(name) || self.username.eq_ignore_ascii_case(name)
    }
}

/// Parse a `characters.json` document.
pub fn parse_personas(raw: &str) -> Result<Vec<Persona>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("characters file is not valid JSON")?;
    if !value.is_array() {
        bail!("characters file must contain an array of character configurations");
    }
    let personas: Vec<Persona> =
        serde_json::from_value(value).context("invalid character configuration")?;
    if personas.is_empty() {
        bail!("no characters loaded from characters file");
    }
    Ok(personas)
}

/// Load every persona from a `characters.json` file.
pub fn load_personas(path: &Path) -> Result<Vec<Persona>> {
    tracing::info!(path = %path.display(), "Loading characters");
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read characters file {}", path.display()))?;
    parse_personas(&raw)
}

/// Pick a persona by name or handle; `None` selects the first one.
pub fn select_persona<'a>(personas: &'a [Persona], name: Option<&str>) -> Option<&'a Persona> {
    match name {
        Some(name) => personas.iter().find(|p| p.answers_to(name)),
        None => personas.first(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "agentName": "Rook",
            "username": "rook_bot",
            "bio": ["Chess hustler", "Park regular"],
            "lore": ["Lost once, in 1998"],
            "postDirections": ["be smug"],
            "topics": ["openings"],
            "adjectives": ["smug"],
            "postingBehavior": {
                "removePeriods": true,
                "chatModeModel": "small-model",
                "replyInterval": 3600
            },
            "model": "big-model",
            "fallbackModel": "",
            "temperature": 0.9,
            "twitterPassword": "ignored"
        }
    ]"#;

    #[test]
    fn parses_camel_case_and_ignores_unknown_fields() {
        let personas = parse_personas(SAMPLE).unwrap();
        let rook = &personas[0];
        assert_eq!(rook.agent_name, "Rook");
        assert_eq!(rook.bio.len(), 2);
        assert!(rook.posting_behavior.remove_periods);
        assert!(!rook.posting_behavior.only_keep_first_sentence);
        assert_eq!(rook.chat_mode_model(), Some("small-model"));
        assert!((rook.temperature - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_fallback_model_counts_as_absent() {
        let personas = parse_personas(SAMPLE).unwrap();
        assert_eq!(personas[0].fallback_model(), None);
    }

    #[test]
    fn only_the_empty_string_counts_as_absent() {
        let mut persona = Persona::new("Rook", "rook_bot", "primary");
        persona.fallback_model = Some(" ".into());
        persona.posting_behavior.chat_mode_model = Some(String::new());
        assert_eq!(persona.fallback_model(), Some(" "));
        assert_eq!(persona.chat_mode_model(), None);
    }

    #[test]
    fn image_prompt_model_defaults_to_primary() {
        let mut persona = Persona::new("Rook", "rook_bot", "big-model");
        assert_eq!(persona.image_prompt_model(), "big-model");
        persona.image_generation_behavior = Some(ImageGenerationBehavior {
            provider: "ms2".into(),
            image_generation_prompt_model: Some("image-model".into()),
        });
        assert_eq!(persona.image_prompt_model(), "image-model");
    }

    #[test]
    fn rejects_non_array_document() {
        let err = parse_personas(r#"{"agentName": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("must contain an array"));
    }

    #[test]
    fn rejects_empty_array() {
        let err = parse_personas("[]").unwrap_err();
        assert!(err.to_string().contains("no characters loaded"));
    }

    #[test]
    fn load_personas_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let personas = load_personas(file.path()).unwrap();
        assert_eq!(personas.len(), 1);
    }

    #[test]
    fn select_persona_by_name_or_handle() {
        let personas = parse_personas(SAMPLE).unwrap();
        assert!(select_persona(&personas, Some("ROOK")).is_some());
        assert!(select_persona(&personas, Some("rook_bot")).is_some());
        assert!(select_persona(&personas, Some("queen")).is_none());
        assert_eq!(select_persona(&personas, None).unwrap().username, "rook_bot");
    }
}
