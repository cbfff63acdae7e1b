//! Fallback policy
//!
//! Total lookup tables giving a default external id per local program when
//! name matching finds nothing. Unknown programs fall through to the
//! wildcard entry.

use std::collections::HashMap;

use crate::config::{FallbackConfig, ProgramDefaults};

/// Key of the entry used for programs without their own defaults
pub const WILDCARD_PROGRAM: &str = "*";

/// Name of the sub-category used when a skill has no external counterpart
pub const DEFAULT_SUB_CATEGORY_NAME: &str = "None Specified";

#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    default_program: String,
    programs: HashMap<String, ProgramDefaults>,
}

impl FallbackPolicy {
    pub fn new(default_program: impl Into<String>) -> Self {
        Self {
            default_program: default_program.into(),
            programs: HashMap::new(),
        }
    }

    pub fn from_config(config: &FallbackConfig) -> Self {
        Self {
            default_program: config.default_program.clone(),
            programs: config.programs.clone(),
        }
    }

    /// Set the defaults for one local program (or `WILDCARD_PROGRAM`)
    pub fn with_program(mut self, program_id: impl Into<String>, defaults: ProgramDefaults) -> Self {
        self.programs.insert(program_id.into(), defaults);
        self
    }

    /// The external program every unmapped program collapses to
    pub fn default_program(&self) -> &str {
        &self.default_program
    }

    /// Defaults for `program_id`, or the wildcard entry
    pub fn defaults_for(&self, program_id: &str) -> Option<&ProgramDefaults> {
        self.programs
            .get(program_id)
            .or_else(|| self.programs.get(WILDCARD_PROGRAM))
    }

    pub fn subject(&self, program_id: &str) -> Option<&str> {
        self.defaults_for(program_id)?.subject.as_deref()
    }

    pub fn category(&self, program_id: &str) -> Option<&str> {
        self.defaults_for(program_id)?.category.as_deref()
    }

    pub fn grade(&self, program_id: &str) -> Option<&str> {
        self.defaults_for(program_id)?.grade.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(subject: &str, category: Option<&str>, grade: &str) -> ProgramDefaults {
        ProgramDefaults {
            subject: Some(subject.to_string()),
            category: category.map(str::to_string),
            grade: Some(grade.to_string()),
        }
    }

    #[test]
    fn test_known_program_uses_own_entry() {
        let policy = FallbackPolicy::new("default-program")
            .with_program("program2", defaults("math", Some("math-cat"), "math-grade"))
            .with_program(WILDCARD_PROGRAM, defaults("none", Some("none-cat"), "none-grade"));

        assert_eq!(policy.subject("program2"), Some("math"));
        assert_eq!(policy.category("program2"), Some("math-cat"));
        assert_eq!(policy.grade("program2"), Some("math-grade"));
    }

    #[test]
    fn test_unknown_program_uses_wildcard() {
        let policy = FallbackPolicy::new("default-program")
            .with_program(WILDCARD_PROGRAM, defaults("none", Some("none-cat"), "none-grade"));

        assert_eq!(policy.subject("program-x"), Some("none"));
        assert_eq!(policy.default_program(), "default-program");
    }

    #[test]
    fn test_gaps_are_reported() {
        let policy = FallbackPolicy::new("default-program")
            .with_program("program2", defaults("math", None, "math-grade"));

        // An explicit entry does not borrow missing fields from the wildcard.
        assert_eq!(policy.category("program2"), None);
        assert!(policy.defaults_for("program-x").is_none());
    }
}
