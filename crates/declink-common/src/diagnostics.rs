//! Diagnostic records shared between the lowering core and its consumers.
//!
//! Lowering itself reports very little: override conflicts that the frontend
//! did not reject are forwarded as warnings so code generation can still run
//! on a total declaration graph.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const AMBIGUOUS_INHERITED_MEMBER: u32 = 9001;
    pub const INCONSISTENT_INHERITED_SIGNATURE: u32 = 9002;
    pub const CONFLICTING_INHERITED_IMPLEMENTATIONS: u32 = 9003;
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes};

    pub const AMBIGUOUS_INHERITED_MEMBER: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_INHERITED_MEMBER,
        category: DiagnosticCategory::Warning,
        message: "Class '{0}' inherits incompatible members '{1}' from '{2}' and '{3}'; the member from '{2}' is used.",
    };

    pub const INCONSISTENT_INHERITED_SIGNATURE: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::INCONSISTENT_INHERITED_SIGNATURE,
        category: DiagnosticCategory::Warning,
        message: "Class '{0}' inherits '{1}' through supertypes with inconsistent type arguments; the signature seen through '{2}' is used.",
    };

    pub const CONFLICTING_INHERITED_IMPLEMENTATIONS: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::CONFLICTING_INHERITED_IMPLEMENTATIONS,
        category: DiagnosticCategory::Warning,
        message: "Class '{0}' inherits several implementations of '{1}' from '{2}' and '{3}'; the member from '{2}' is used.",
    };

    pub const ALL: &[DiagnosticMessage] = &[
        AMBIGUOUS_INHERITED_MEMBER,
        INCONSISTENT_INHERITED_SIGNATURE,
        CONFLICTING_INHERITED_IMPLEMENTATIONS,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRelatedInformation {
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Qualified name of the declaration the note points at.
    pub subject: String,
    pub message_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Qualified name of the declaration the diagnostic is attached to.
    pub subject: String,
    pub message_text: String,
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Instantiate a message template with positional arguments.
    pub fn from_message(
        message: DiagnosticMessage,
        subject: impl Into<String>,
        args: &[&str],
    ) -> Self {
        Self {
            category: message.category,
            code: message.code,
            subject: subject.into(),
            message_text: format_message(message.message, args),
            related_information: Vec::new(),
        }
    }

    pub fn warning(subject: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            code,
            subject: subject.into(),
            message_text: message.into(),
            related_information: Vec::new(),
        }
    }

    pub fn with_related(mut self, subject: impl Into<String>, message: impl Into<String>) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            category: DiagnosticCategory::Message,
            code: 0,
            subject: subject.into(),
            message_text: message.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} DL{}: {}: {}",
            self.category.as_str(),
            self.code,
            self.subject,
            self.message_text
        )
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    diagnostic_messages::ALL
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
