use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is. Errors make a module invalid; warnings
/// do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A single validation finding. Diagnostics are the only user-visible
/// failure channel -- rules never raise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Name of the rule that produced this diagnostic.
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    /// The file the finding belongs to (display name, not the key).
    pub file_name: String,
    /// The offending record's `id`, when one exists.
    #[serde(default)]
    pub record_id: Option<String>,
}

impl Diagnostic {
    /// An `Error`-severity diagnostic.
    pub fn error(rule_name: &str, file_name: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            rule_name: rule_name.to_string(),
            severity: Severity::Error,
            message: message.into(),
            file_name: file_name.to_string(),
            record_id: None,
        }
    }

    /// A `Warning`-severity diagnostic.
    pub fn warning(rule_name: &str, file_name: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            rule_name: rule_name.to_string(),
            severity: Severity::Warning,
            message: message.into(),
            file_name: file_name.to_string(),
            record_id: None,
        }
    }

    /// Attach the offending record's id.
    pub fn with_record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] {}: {}",
            self.file_name, self.severity, self.rule_name, self.message
        )?;
        if let Some(id) = &self.record_id {
            write!(f, " (record '{id}')")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_severity() {
        let e = Diagnostic::error("Item_Value_Valid", "items.json", "value is negative");
        assert_eq!(e.severity, Severity::Error);

        let w = Diagnostic::warning("Item_Weight_Valid", "items.json", "weight out of range");
        assert_eq!(w.severity, Severity::Warning);
    }

    #[test]
    fn with_record_id_attaches() {
        let d = Diagnostic::error("ID_Unique_Required", "items.json", "duplicate id")
            .with_record_id("sword");
        assert_eq!(d.record_id.as_deref(), Some("sword"));
    }

    #[test]
    fn display_includes_context() {
        let d = Diagnostic::error("Item_Value_Valid", "items.json", "value is negative")
            .with_record_id("sword");
        let s = d.to_string();
        assert!(s.contains("items.json"));
        assert!(s.contains("error"));
        assert!(s.contains("Item_Value_Valid"));
        assert!(s.contains("sword"));
    }
}
