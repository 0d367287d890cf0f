//! Character-driven reply generation.
//!
//! Given a [`Persona`] and an inbound message, [`ReplyEngine`] renders a
//! prompt, asks a completion endpoint for a draft, and (outside chat mode)
//! keeps regenerating until the draft passes a policy classifier and fits the
//! length limit, escalating to a fallback model after repeated bans.

pub mod chat;
pub mod config;
pub mod error;
pub mod observability;
pub mod persona;
pub mod prompt;
pub mod providers;
pub mod reply;

pub use chat::handle_chat_message;
pub use config::Config;
pub use error::{ReplyError, Result};
pub use persona::Persona;
pub use reply::{GeneratedReply, ReplyEngine, RetryPolicy};
