//! assignment-solver: answers graded assignment questions over HTTP
//!
//! A question (with an optional attached file) is resolved by an ordered
//! fallback: a fixed question/answer table, then deterministic file rules,
//! then an OpenAI-compatible chat-completion model.

pub mod answers;
pub mod config;
pub mod error;
pub mod generation;
pub mod interpreter;
pub mod providers;
pub mod resolution;
pub mod server;
pub mod types;

pub use answers::{AnswerTable, MatchPolicy, QuestionAnswerEntry};
pub use config::SolverConfig;
pub use error::{Error, Result, UpstreamReason};
pub use interpreter::{FileInterpreter, InterpretError, Interpretation, RuleKind};
pub use providers::{ChatCompletionClient, LlmProvider};
pub use resolution::{Resolver, Stage};
pub use server::{build_router, state::AppState, SolverServer};
pub use types::{AnswerResponse, Resolution, ResolutionSource, UploadedFile};
