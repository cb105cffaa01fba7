//! Question-triggered file rules
//!
//! Each rule is a one-off computation tied to a known assignment question or
//! file shape. Rules live in a single ordered table ([`RULES`]); the first rule
//! whose trigger matches handles the file. Keyword rules come before extension
//! rules, so question intent wins over file type.

mod archive;
mod csv_answer;
mod margin;
mod total_sales;
mod unique_count;

pub use archive::answer_from_archive;
pub use csv_answer::first_answer;
pub use margin::{compute_margin, MarginQuery};
pub use total_sales::sum_sales;
pub use unique_count::count_unique_ids;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::InterpreterConfig;
use crate::error::{Error, Result};
use crate::types::UploadedFile;

/// Answer returned when an attached file matches no rule
pub const NO_RULE_SENTINEL: &str =
    "File processed successfully, but no specific logic implemented for this question.";

/// Failure inside a single rule
#[derive(Debug, Error)]
pub enum InterpretError {
    /// The file's structure or content does not fit the rule
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The file type or shape is not handled
    #[error("unsupported file: {0}")]
    UnsupportedFile(String),
}

impl InterpretError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFile(message.into())
    }

    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::UnsupportedFile(_) => "unsupported_file",
        }
    }
}

impl From<csv::Error> for InterpretError {
    fn from(err: csv::Error) -> Self {
        Self::MalformedInput(format!("invalid CSV: {}", err))
    }
}

impl From<serde_json::Error> for InterpretError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(format!("invalid JSON: {}", err))
    }
}

impl From<zip::result::ZipError> for InterpretError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::UnsupportedFile(format!("unreadable archive: {}", err))
    }
}

impl From<std::io::Error> for InterpretError {
    fn from(err: std::io::Error) -> Self {
        Self::MalformedInput(format!("I/O failure while reading file: {}", err))
    }
}

/// Result of a single rule
pub type RuleResult = std::result::Result<String, InterpretError>;

/// Which rule produced an interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    UniqueCount,
    Margin,
    TotalSales,
    Archive,
    CsvAnswer,
    /// No rule matched; the answer is [`NO_RULE_SENTINEL`]
    Default,
}

/// Outcome of interpreting a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub answer: String,
    pub rule: RuleKind,
    /// File excerpt for the model prompt; set when there is no answer
    pub context: Option<String>,
}

impl Interpretation {
    /// True when a rule produced a usable answer. The default rule's sentinel
    /// counts as an answer; an empty rule result does not.
    pub fn is_answered(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}

/// What a rule needs to run
pub struct RuleInput<'a> {
    pub file: &'a UploadedFile,
    pub scratch_root: &'a Path,
    /// Cap on the total uncompressed size of an archive
    pub max_extracted_size: u64,
}

enum Trigger {
    /// Every keyword appears in the lowercased question
    Keywords(&'static [&'static str]),
    /// Filename extension or declared MIME type
    Extension(&'static str),
}

impl Trigger {
    fn matches(&self, question_lower: &str, file: &UploadedFile) -> bool {
        match self {
            Trigger::Keywords(words) => words.iter().all(|w| question_lower.contains(w)),
            Trigger::Extension(ext) => {
                file.extension() == *ext
                    || mime_guess::from_ext(ext)
                        .iter()
                        .any(|mime| mime.essence_str() == file.content_type)
            }
        }
    }
}

struct Rule {
    kind: RuleKind,
    trigger: Trigger,
    handler: fn(&RuleInput<'_>) -> RuleResult,
}

/// Evaluated top to bottom; first match wins.
const RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::UniqueCount,
        trigger: Trigger::Keywords(&["unique", "student"]),
        handler: |input| count_unique_ids(&input.file.data),
    },
    Rule {
        kind: RuleKind::Margin,
        trigger: Trigger::Keywords(&["margin"]),
        handler: |input| compute_margin(&input.file.data, &MarginQuery::gamma_brazil()?),
    },
    Rule {
        kind: RuleKind::TotalSales,
        trigger: Trigger::Keywords(&["total sales"]),
        handler: |input| sum_sales(&input.file.data),
    },
    Rule {
        kind: RuleKind::Archive,
        trigger: Trigger::Extension("zip"),
        handler: |input| {
            answer_from_archive(&input.file.data, input.scratch_root, input.max_extracted_size)
        },
    },
    Rule {
        kind: RuleKind::CsvAnswer,
        trigger: Trigger::Extension("csv"),
        handler: |input| first_answer(&input.file.data),
    },
];

/// Runs the rule table against an uploaded file
#[derive(Debug, Clone)]
pub struct FileInterpreter {
    scratch_root: PathBuf,
    context_chars: usize,
    max_extracted_size: u64,
}

impl FileInterpreter {
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            scratch_root: config.scratch_dir.clone().unwrap_or_else(std::env::temp_dir),
            context_chars: config.context_chars,
            max_extracted_size: config.max_extracted_size,
        }
    }

    /// Which rule would handle this question and file
    pub fn select_rule(&self, question: &str, file: &UploadedFile) -> RuleKind {
        self.find_rule(question, file)
            .map(|rule| rule.kind)
            .unwrap_or(RuleKind::Default)
    }

    fn find_rule(&self, question: &str, file: &UploadedFile) -> Option<&'static Rule> {
        let question_lower = question.to_lowercase();
        RULES
            .iter()
            .find(|rule| rule.trigger.matches(&question_lower, file))
    }

    /// Interpret `file` for `question`.
    ///
    /// Rule failures surface as [`Error::FileProcessing`] carrying the rule's error.
    pub fn interpret(&self, question: &str, file: &UploadedFile) -> Result<Interpretation> {
        let Some(rule) = self.find_rule(question, file) else {
            tracing::debug!("No file rule matched '{}'", file.filename);
            return Ok(Interpretation {
                answer: NO_RULE_SENTINEL.to_string(),
                rule: RuleKind::Default,
                context: Some(self.excerpt(file)),
            });
        };

        tracing::info!(
            rule = ?rule.kind,
            "Interpreting '{}' ({} bytes, {})",
            file.filename,
            file.len(),
            file.content_type
        );

        let input = RuleInput {
            file,
            scratch_root: &self.scratch_root,
            max_extracted_size: self.max_extracted_size,
        };

        let answer = (rule.handler)(&input).map_err(|source| Error::FileProcessing {
            filename: file.filename.clone(),
            source,
        })?;

        if answer.trim().is_empty() {
            tracing::debug!(rule = ?rule.kind, "Rule produced no answer for '{}'", file.filename);
            return Ok(Interpretation {
                answer: String::new(),
                rule: rule.kind,
                context: Some(self.excerpt(file)),
            });
        }

        Ok(Interpretation {
            answer,
            rule: rule.kind,
            context: None,
        })
    }

    fn excerpt(&self, file: &UploadedFile) -> String {
        String::from_utf8_lossy(&file.data)
            .chars()
            .take(self.context_chars)
            .collect()
    }
}
