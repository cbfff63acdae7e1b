//! Organization policy
//!
//! Headquarters organizations may resolve to the restricted program set;
//! every other organization is redirected to the default program for those
//! entries.

use std::collections::HashSet;
use std::fmt;

use crate::config::OrganizationConfig;

/// Display classification of an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationType {
    Headquarters,
    Normal,
}

impl OrganizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationType::Headquarters => "headquarters",
            OrganizationType::Normal => "normal",
        }
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static set membership over organization and program ids
#[derive(Debug, Clone, Default)]
pub struct OrganizationPolicy {
    headquarters: HashSet<String>,
    headquarters_programs: HashSet<String>,
}

impl OrganizationPolicy {
    pub fn new<O, P>(headquarters: O, headquarters_programs: P) -> Self
    where
        O: IntoIterator,
        O::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            headquarters: headquarters.into_iter().map(Into::into).collect(),
            headquarters_programs: headquarters_programs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &OrganizationConfig) -> Self {
        Self::new(
            config.headquarters.iter().cloned(),
            config.headquarters_programs.iter().cloned(),
        )
    }

    pub fn is_headquarters(&self, org_id: &str) -> bool {
        self.headquarters.contains(org_id)
    }

    pub fn organization_type(&self, org_id: &str) -> OrganizationType {
        if self.is_headquarters(org_id) {
            OrganizationType::Headquarters
        } else {
            OrganizationType::Normal
        }
    }

    /// Whether `program_id` (local) is reserved for headquarters
    pub fn is_headquarters_program(&self, program_id: &str) -> bool {
        self.headquarters_programs.contains(program_id)
    }

    /// Whether `org_id` may resolve `program_id` to its real mapping
    pub fn allows_program(&self, org_id: &str, program_id: &str) -> bool {
        !self.is_headquarters_program(program_id) || self.is_headquarters(org_id)
    }
}
