//! Response types

use serde::{Deserialize, Serialize};

/// Which stage produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Known-answer table
    Table,
    /// A file interpreter rule
    File,
    /// Model fallback
    Model,
}

/// Final outcome of a resolved request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub answer: String,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn new(answer: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            answer: answer.into(),
            source,
        }
    }
}

/// JSON body returned by `POST /api/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

impl From<Resolution> for AnswerResponse {
    fn from(resolution: Resolution) -> Self {
        Self {
            answer: resolution.answer,
        }
    }
}
