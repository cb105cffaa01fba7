//! Prompt construction and reply post-processing for the model fallback

pub mod prompt;
mod sanitize;

pub use prompt::PromptBuilder;
pub use sanitize::sanitize_reply;
