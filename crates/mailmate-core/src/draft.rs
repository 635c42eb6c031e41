//! A composed message that the user may still edit.

use serde::{Deserialize, Serialize};

/// Subject and body as produced by the assistant, plus the user's edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    subject: String,
    body: String,
    generated_body: String,
}

impl Draft {
    /// Creates an unedited draft.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            subject: subject.into(),
            generated_body: body.clone(),
            body,
        }
    }

    /// Current subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Current body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Body as it was generated.
    #[must_use]
    pub fn generated_body(&self) -> &str {
        &self.generated_body
    }

    /// Replaces the subject.
    pub fn revise_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    /// Replaces the body; the generated body is kept for comparison.
    pub fn revise_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Whether the body differs from what was generated.
    #[must_use]
    pub fn is_revised(&self) -> bool {
        self.body != self.generated_body
    }
}
