//! Prompt construction: template constants, the substitution engine, and the
//! rules for picking a template per generation mode.

pub mod render;
pub mod templates;

pub use render::{placeholders, render, PromptContext, TemplateContext, Var};

/// Inputs up to and including this many characters get the short template.
pub const SHORT_INPUT_MAX_CHARS: usize = 20;

/// Which entry point is generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Interactive chat: single shot, no policy or length enforcement.
    Chat,
    /// Reply to a post: always goes through the retry loop.
    Reply,
}

impl Mode {
    pub fn from_chat_flag(is_chat: bool) -> Self {
        if is_chat {
            Mode::Chat
        } else {
            Mode::Reply
        }
    }

    pub fn is_chat(self) -> bool {
        matches!(self, Mode::Chat)
    }
}

fn with_knowledge(base: &str, context: &PromptContext) -> String {
    if context.knowledge.is_empty() {
        render(base, context)
    } else {
        render(&format!("{}{base}", templates::KNOWLEDGE_SECTION), context)
    }
}

/// Pick the template for `mode` and render it.
///
/// `input_len` is measured in characters; the short-reply template wins
/// when it is at most [`SHORT_INPUT_MAX_CHARS`].
pub fn select_and_render(context: &PromptContext, mode: Mode, input_len: usize) -> String {
    let base = match mode {
        Mode::Chat => templates::CHAT_MODE,
        Mode::Reply if input_len <= SHORT_INPUT_MAX_CHARS => templates::REPLY_SHORT,
        Mode::Reply => templates::REPLY_LONG,
    };
    with_knowledge(base, context)
}

/// Topic posts: no length branching, no knowledge section.
pub fn render_topic_post(context: &PromptContext) -> String {
    render(templates::TOPIC_POST, context)
}

pub fn render_ban_check(context: &PromptContext) -> String {
    render(templates::BAN_CHECK, context)
}

pub fn render_image_prompt(context: &PromptContext) -> String {
    render(templates::IMAGE_PROMPT, context)
}
