//! Context encoding: feedback text plus authoring metadata folded into one string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Role assumed for serving requests that omit `author_role`.
pub const DEFAULT_AUTHOR_ROLE: &str = "aluno";
/// Target assumed for serving requests that omit `target_type`.
pub const DEFAULT_TARGET_TYPE: &str = "professor";

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// One piece of feedback as received from a CSV row or a request payload.
///
/// Role and target are kept as free strings: the encoder lower-cases whatever
/// arrives and the feature space learns which values matter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedbackRecord {
    pub text: String,
    pub author_role: Option<String>,
    pub target_type: Option<String>,
    pub course_code: Option<String>,
}

impl FeedbackRecord {
    /// Record with the serving defaults (`aluno` writing about a `professor`).
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author_role: Some(DEFAULT_AUTHOR_ROLE.to_string()),
            target_type: Some(DEFAULT_TARGET_TYPE.to_string()),
            course_code: None,
        }
    }

    pub fn with_author_role(mut self, role: impl Into<String>) -> Self {
        self.author_role = Some(role.into());
        self
    }

    pub fn with_target_type(mut self, target: impl Into<String>) -> Self {
        self.target_type = Some(target.into());
        self
    }

    pub fn with_course_code(mut self, code: impl Into<String>) -> Self {
        self.course_code = Some(code.into());
        self
    }

    /// Encode this record with [`encode_context`].
    pub fn encode(&self) -> String {
        encode_context(
            Some(&self.text),
            self.author_role.as_deref(),
            self.target_type.as_deref(),
            self.course_code.as_deref(),
        )
    }
}

/// Strip `<tag>` markup, collapse whitespace runs and trim.
///
/// Missing text cleans to the empty string.
pub fn clean_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let without_tags = MARKUP.replace_all(text, " ");
    WHITESPACE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

/// Build the encoded form `[ROLE=r] [TARGET=t] [COURSE=c] cleaned text`.
///
/// `ROLE` and `TARGET` tokens are always present (empty when missing) so every
/// encoded string carries both dimensions; `COURSE` only appears when non-blank.
pub fn encode_context(
    text: Option<&str>,
    author_role: Option<&str>,
    target_type: Option<&str>,
    course_code: Option<&str>,
) -> String {
    let role = author_role.unwrap_or_default().trim().to_lowercase();
    let target = target_type.unwrap_or_default().trim().to_lowercase();
    let course = course_code.unwrap_or_default().trim();

    let mut parts = vec![format!("[ROLE={role}]"), format!("[TARGET={target}]")];
    if !course.is_empty() {
        parts.push(format!("[COURSE={course}]"));
    }
    parts.push(clean_text(text));
    parts.join(" ").trim().to_string()
}
