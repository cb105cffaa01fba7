//! Known question/answer lookup, the first resolution stage

mod table;

pub use table::{AnswerTable, MatchPolicy, QuestionAnswerEntry};
