//! Model provider abstraction
//!
//! The resolver only sees `Arc<dyn LlmProvider>`, so tests can swap in a fake.

pub mod chat_completion;
pub mod llm;

pub use chat_completion::ChatCompletionClient;
pub use llm::LlmProvider;
