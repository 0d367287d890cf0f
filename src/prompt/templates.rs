//! Prompt templates — compiled into the binary, never mutated.
//!
//! Placeholders use `{{name}}` syntax and must name a [`Var`](super::Var).
//! The wording is load-bearing: downstream models were tuned against it, so
//! edits here change reply behavior.

// ── Image prompt rewrite ─────────────────────────────────────────────────────

pub const IMAGE_PROMPT: &str = "\
# MS2 Image Prompt Generator
You are {{agentName}}, with bio:
{{bio}}

And lore:
{{lore}}

Your posting directions are:
{{postDirections}}

Given the prompt '{{originalPost}}', rewrite it into a concise, creative prompt suitable for generating an image with Midjourney-style syntax (e.g., '/imagine prompt: ...'). Keep it vivid, specific, and aligned with your character. Limit output to 95 tokens.
";

// ── Replies to posts (non-chat) ──────────────────────────────────────────────

/// Used when the inbound post is longer than the short-input threshold.
pub const REPLY_LONG: &str = "\
# Reply Guy Prompt
You are {{agentName}}, with bio:
{{bio}}

And lore:
{{lore}}

Your posting directions are:
{{postDirections}}

Reply to this post: '{{originalPost}}' with a concise, witty response that fits your character. Keep it under 280 characters.
";

/// Used for very short inbound posts, where the full persona dump drowns out
/// the input.
pub const REPLY_SHORT: &str = "\
# Short Reply Guy Prompt
You are {{agentName}}. Reply to '{{originalPost}}' with a short, sharp quip that matches your vibe. Keep it under 280 characters.
";

// ── Interactive chat ─────────────────────────────────────────────────────────

pub const CHAT_MODE: &str = "\
# Chat Mode Prompt
You are {{agentName}}, with bio:
{{bio}}

And lore:
{{lore}}

Your posting directions are:
{{postDirections}}

Chat rules:
{{chatModeRules}}

Recent chat history:
{{recentHistory}}

Respond to '{{originalPost}}' in character, keeping it concise and engaging.
";

// ── Unprompted topic posts ───────────────────────────────────────────────────

pub const TOPIC_POST: &str = "\
# Topic Post Prompt
You are {{agentName}}, with bio:
{{bio}}

And lore:
{{lore}}

Your posting directions are:
{{postDirections}}

Recent posts:
{{recentHistory}}

Generate a post based on a topic and adjective provided by the user.
";

// ── Policy classification ────────────────────────────────────────────────────

/// Binary classifier prompt. The draft reply travels as the user message;
/// only identity variables are bound here.
pub const BAN_CHECK: &str = "\
# Ban Check Prompt
You are {{agentName}} (@{{username}}). Given this reply: '{{originalPost}}', would it be banned on Twitter? Answer YES or NO in all caps.";

// ── Knowledge section ────────────────────────────────────────────────────────

/// Prepended to reply and chat templates when the persona carries knowledge.
pub const KNOWLEDGE_SECTION: &str = "# Knowledge\n{{knowledge}}\n\n";

/// Every template, for exhaustive checks.
pub const ALL: [(&str, &str); 6] = [
    ("image_prompt", IMAGE_PROMPT),
    ("reply_long", REPLY_LONG),
    ("reply_short", REPLY_SHORT),
    ("chat_mode", CHAT_MODE),
    ("topic_post", TOPIC_POST),
    ("ban_check", BAN_CHECK),
];
