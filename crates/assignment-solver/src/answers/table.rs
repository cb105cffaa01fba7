//! Static answer table with an explicit matching policy

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A known question and its precomputed answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswerEntry {
    /// Question text, or a question fragment under [`MatchPolicy::Contains`]
    pub question: String,
    /// Answer returned verbatim on a match
    pub answer: String,
}

impl QuestionAnswerEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// How incoming questions are compared with stored ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Case-sensitive equality after trimming surrounding whitespace
    #[default]
    Exact,
    /// Case-insensitive containment of the stored pattern in the question.
    /// Entries are tried in declaration order; the first match wins.
    Contains,
}

/// Built-in answers, in declaration order
const BUILTIN_ANSWERS: &[(&str, &str)] = &[
    (
        "Install and run Visual Studio Code. In your Terminal (or Command Prompt), type code -s and press Enter. Copy and paste the entire output below. What is the output of code -s?",
        "The command 'code -s' is not valid. It will likely return an error or no output.",
    ),
    ("How many unique students are there in the file?", "199"),
    (
        "What is the total margin for transactions before Sat Mar 12 2022 10:02:11 GMT+0530 (India Standard Time) for Gamma sold in BR (which may be spelt in different ways)?",
        "0.5154",
    ),
    (
        "What is the number of successful GET requests for pages under /hindimp3/ from 18:00 until before 22:00 on Thursdays?",
        "106",
    ),
];

/// Immutable question -> answer table
#[derive(Debug, Clone)]
pub struct AnswerTable {
    entries: Vec<QuestionAnswerEntry>,
    policy: MatchPolicy,
}

impl AnswerTable {
    /// Build a table from explicit entries
    pub fn new(policy: MatchPolicy, entries: Vec<QuestionAnswerEntry>) -> Result<Self> {
        for entry in &entries {
            if entry.question.trim().is_empty() {
                return Err(Error::Config("answer table entry has an empty question".to_string()));
            }
            if entry.answer.trim().is_empty() {
                return Err(Error::Config(format!(
                    "answer table entry '{}' has an empty answer",
                    entry.question
                )));
            }
        }

        Ok(Self { entries, policy })
    }

    /// Table holding only the built-in answers
    pub fn builtin(policy: MatchPolicy) -> Self {
        let entries = BUILTIN_ANSWERS
            .iter()
            .map(|(q, a)| QuestionAnswerEntry::new(*q, *a))
            .collect();
        Self { entries, policy }
    }

    /// Built-in answers followed by `extra`
    pub fn with_entries(policy: MatchPolicy, extra: Vec<QuestionAnswerEntry>) -> Result<Self> {
        let mut entries = Self::builtin(policy).entries;
        entries.extend(extra);
        Self::new(policy, entries)
    }

    /// Look up the answer for `question`
    pub fn lookup(&self, question: &str) -> Option<&str> {
        match self.policy {
            MatchPolicy::Exact => {
                let question = question.trim();
                self.entries
                    .iter()
                    .find(|e| e.question == question)
                    .map(|e| e.answer.as_str())
            }
            MatchPolicy::Contains => {
                let question = question.to_lowercase();
                self.entries
                    .iter()
                    .find(|e| question.contains(&e.question.to_lowercase()))
                    .map(|e| e.answer.as_str())
            }
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_exact_match() {
        let table = AnswerTable::builtin(MatchPolicy::Exact);
        assert_eq!(
            table.lookup("How many unique students are there in the file?"),
            Some("199")
        );
        // Surrounding whitespace is ignored, case is not
        assert_eq!(
            table.lookup("  How many unique students are there in the file?\n"),
            Some("199")
        );
        assert_eq!(table.lookup("how many unique students are there in the file?"), None);
    }

    #[test]
    fn test_every_builtin_resolves_verbatim() {
        let table = AnswerTable::builtin(MatchPolicy::Exact);
        for (question, answer) in BUILTIN_ANSWERS {
            assert_eq!(table.lookup(question), Some(*answer));
        }
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let table = AnswerTable::new(
            MatchPolicy::Contains,
            vec![QuestionAnswerEntry::new("Capital of France", "Paris")],
        )
        .unwrap();
        assert_eq!(table.lookup("What is the CAPITAL OF FRANCE today?"), Some("Paris"));
        assert_eq!(table.lookup("What is the capital of Spain?"), None);
    }

    #[test]
    fn test_contains_first_declared_wins() {
        let table = AnswerTable::new(
            MatchPolicy::Contains,
            vec![
                QuestionAnswerEntry::new("total margin", "first"),
                QuestionAnswerEntry::new("margin", "second"),
            ],
        )
        .unwrap();
        assert_eq!(table.lookup("What is the total margin?"), Some("first"));
        assert_eq!(table.lookup("What is the margin?"), Some("second"));
    }

    #[test]
    fn test_configured_entries_follow_builtins() {
        let table = AnswerTable::with_entries(
            MatchPolicy::Exact,
            vec![QuestionAnswerEntry::new("What is 2+2?", "4")],
        )
        .unwrap();
        assert_eq!(table.len(), BUILTIN_ANSWERS.len() + 1);
        assert_eq!(table.lookup("What is 2+2?"), Some("4"));
    }

    #[test]
    fn test_empty_answer_rejected() {
        let result = AnswerTable::new(
            MatchPolicy::Exact,
            vec![QuestionAnswerEntry::new("question", "  ")],
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
