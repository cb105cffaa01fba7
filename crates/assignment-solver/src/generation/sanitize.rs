//! Optional clean-up of model replies
//!
//! Off unless `llm.sanitize_reply` is set.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("valid regex"));

/// Strip every character except letters, digits and whitespace.
///
/// Lossy for numeric and punctuated answers: "0.5154" becomes "05154".
pub fn sanitize_reply(reply: &str) -> String {
    let cleaned = NON_ALPHANUMERIC.replace_all(reply, "").trim().to_string();
    if cleaned != reply.trim() {
        tracing::warn!("Reply sanitization removed characters from the model answer");
    }
    cleaned
}
