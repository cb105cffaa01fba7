//! Prompt templates for the model fallback

/// Question keywords that allow a SQL answer
const SQL_TRIGGERS: &[&str] = &["sql", "query"];

/// Prompt builder for assignment questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Whether the question asks for a SQL answer
    pub fn wants_sql(question: &str) -> bool {
        let lower = question.to_lowercase();
        SQL_TRIGGERS.iter().any(|t| lower.contains(t))
    }

    /// Build the single-turn instruction prompt.
    ///
    /// A non-empty `context` (file text) is appended after the question.
    pub fn build_answer_prompt(question: &str, context: &str) -> String {
        let format_rule = if Self::wants_sql(question) {
            "- The question asks for SQL: respond with the SQL query alone."
        } else {
            "- Do NOT respond with SQL or any other query language; give the answer itself."
        };

        let mut prompt = format!(
            r#"You are an expert assistant solving graded data-science assignment questions.

RULES:
{format_rule}
- Return ONLY the final answer, with no explanation, preamble, or markdown.
- Keep numbers exactly as computed, including decimal points and signs.

QUESTION: {question}"#,
            format_rule = format_rule,
            question = question.trim()
        );

        let context = context.trim();
        if !context.is_empty() {
            prompt.push_str("\n\nCONTEXT FROM ATTACHED FILE:\n");
            prompt.push_str(context);
        }

        prompt.push_str("\n\nANSWER:");
        prompt
    }
}
