//! Ordered-fallback resolution: table, then file rules, then model
//!
//! Stages run strictly in order. A stage hands over to the next only when it
//! has no answer; a stage that fails ends the request with that error.

use std::sync::Arc;

use crate::answers::AnswerTable;
use crate::config::SolverConfig;
use crate::error::{Error, Result, UpstreamReason};
use crate::interpreter::{FileInterpreter, RuleKind};
use crate::providers::LlmProvider;
use crate::types::{Resolution, ResolutionSource, UploadedFile};

/// Non-terminal resolution states. `Ok(Resolution)` is `Resolved`; `Err` is `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingTable,
    AwaitingFile,
    AwaitingModel,
}

enum Step {
    Next(Stage),
    Resolved(Resolution),
}

/// Resolves one question (and optional file) to a single answer
#[derive(Clone)]
pub struct Resolver {
    table: Arc<AnswerTable>,
    interpreter: FileInterpreter,
    model: Arc<dyn LlmProvider>,
    model_on_unmatched_file: bool,
}

impl Resolver {
    pub fn new(
        table: Arc<AnswerTable>,
        interpreter: FileInterpreter,
        model: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            table,
            interpreter,
            model,
            model_on_unmatched_file: false,
        }
    }

    /// Build the table and interpreter from config around the given provider
    pub fn from_config(config: &SolverConfig, model: Arc<dyn LlmProvider>) -> Result<Self> {
        let table = AnswerTable::with_entries(
            config.answers.match_policy,
            config.answers.entries.clone(),
        )?;
        tracing::info!(
            "Answer table loaded: {} entries ({:?} matching)",
            table.len(),
            table.policy()
        );

        Ok(Self::new(Arc::new(table), FileInterpreter::new(&config.interpreter), model)
            .with_model_on_unmatched_file(config.interpreter.model_on_unmatched_file))
    }

    /// Let files that hit no rule fall through to the model with the file as context
    pub fn with_model_on_unmatched_file(mut self, enabled: bool) -> Self {
        self.model_on_unmatched_file = enabled;
        self
    }

    /// Run the stages in order until one produces an answer or fails
    pub async fn resolve(&self, question: &str, file: Option<UploadedFile>) -> Result<Resolution> {
        if question.trim().is_empty() {
            return Err(Error::bad_request("question must not be empty"));
        }

        let mut file = file;
        let mut context = String::new();
        let mut stage = Stage::AwaitingTable;

        loop {
            tracing::debug!(?stage, "Resolution stage");

            let step = match stage {
                Stage::AwaitingTable => match self.table.lookup(question) {
                    Some(answer) => Step::Resolved(Resolution::new(answer, ResolutionSource::Table)),
                    None => Step::Next(Stage::AwaitingFile),
                },
                Stage::AwaitingFile => match file.take() {
                    None => Step::Next(Stage::AwaitingModel),
                    Some(upload) => {
                        let interpretation = self.interpret(question, upload).await?;
                        let unmatched =
                            interpretation.rule == RuleKind::Default && self.model_on_unmatched_file;
                        if !interpretation.is_answered() || unmatched {
                            context = interpretation.context.unwrap_or_default();
                            Step::Next(Stage::AwaitingModel)
                        } else {
                            Step::Resolved(Resolution::new(
                                interpretation.answer,
                                ResolutionSource::File,
                            ))
                        }
                    }
                },
                Stage::AwaitingModel => {
                    let answer = self.model.ask(question, &context).await?;
                    if answer.trim().is_empty() {
                        return Err(Error::upstream(
                            UpstreamReason::Unknown,
                            format!("{} returned an empty answer", self.model.name()),
                        ));
                    }
                    Step::Resolved(Resolution::new(answer, ResolutionSource::Model))
                }
            };

            match step {
                Step::Next(next) => stage = next,
                Step::Resolved(resolution) => {
                    tracing::info!(source = ?resolution.source, "Question resolved");
                    return Ok(resolution);
                }
            }
        }
    }

    /// Run the interpreter off the async runtime; the upload is dropped on that thread
    async fn interpret(
        &self,
        question: &str,
        upload: UploadedFile,
    ) -> Result<crate::interpreter::Interpretation> {
        let interpreter = self.interpreter.clone();
        let question = question.to_string();

        tokio::task::spawn_blocking(move || interpreter.interpret(&question, &upload))
            .await
            .map_err(|e| Error::internal(format!("File interpreter task failed: {}", e)))?
    }
}
