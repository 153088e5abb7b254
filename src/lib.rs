//! Terminal presentation helpers for the moltbook agent client.
//!
//! Everything here is line-oriented: questions and answers go through
//! [`prompt::LinePrompt`], output is plain text sized to
//! [`terminal::columns`].

pub mod config;
pub mod feed_view;
pub mod logging;
pub mod names;
pub mod prompt;
pub mod terminal;
pub mod text;

pub use config::EnvConfig;
pub use feed_view::{FeedView, DEFAULT_PAGE_SIZE};
pub use names::{generate_agent, generate_agents, AgentSuggestion};
pub use prompt::{ChannelPrompt, LinePrompt, ScriptedPrompt};
pub use text::{truncate_to_width, visible_width};
