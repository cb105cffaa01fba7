//! First-row answer lookup in a CSV file

use super::{InterpretError, RuleResult};

/// Column whose first value is returned when present
const ANSWER_COLUMN: &str = "answer";

/// Return the first row's `answer` value, or its first column if there is no such column
pub fn first_answer(data: &[u8]) -> RuleResult {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let answer_idx = reader.headers()?.iter().position(|h| h == ANSWER_COLUMN);

    let record = reader
        .records()
        .next()
        .transpose()?
        .ok_or_else(|| InterpretError::malformed("CSV file has no data rows"))?;

    let idx = answer_idx.unwrap_or(0);
    record
        .get(idx)
        .map(|value| value.to_string())
        .ok_or_else(|| InterpretError::malformed(format!("first row has no column {}", idx + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_column() {
        let csv = b"id,answer\n1,42\n2,43\n";
        assert_eq!(first_answer(csv).unwrap(), "42");
    }

    #[test]
    fn test_first_column_without_answer_header() {
        let csv = b"value,other\nhello,world\n";
        assert_eq!(first_answer(csv).unwrap(), "hello");
    }

    #[test]
    fn test_answer_header_is_case_sensitive() {
        let csv = b"id,Answer\n7,8\n";
        assert_eq!(first_answer(csv).unwrap(), "7");
    }

    #[test]
    fn test_short_row_is_malformed() {
        let csv = b"id,answer\n1\n";
        assert!(matches!(first_answer(csv), Err(InterpretError::MalformedInput(_))));
    }

    #[test]
    fn test_no_rows_is_malformed() {
        let err = first_answer(b"answer\n").unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }
}
