//! Repository descriptors supplied by callers

use serde::{Deserialize, Serialize};

use crate::domain::identifier::IdGenerator;

/// Marks where a generated token is substituted in a repository pattern
pub const WILDCARD: char = '*';

/// A repository to provision
///
/// Field names match the JSON wire format of the `/newuser` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSpec {
    /// Output variable name the resolved repository is reported under
    #[serde(rename = "Var")]
    pub var: String,
    /// Literal name, or `prefix*suffix` with a generated token at `*`
    #[serde(rename = "Pattern")]
    pub pattern: String,
    #[serde(rename = "Private", default)]
    pub private: bool,
}

impl RepoSpec {
    pub fn new(var: impl Into<String>, pattern: impl Into<String>, private: bool) -> Self {
        Self {
            var: var.into(),
            pattern: pattern.into(),
            private,
        }
    }

    pub fn name_pattern(&self) -> NamePattern {
        NamePattern::parse(&self.pattern)
    }
}

/// Parsed form of a repository name pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    Literal(String),
    Randomized { prefix: String, suffix: String },
}

impl NamePattern {
    /// Split on the first wildcard; patterns without one are literal
    pub fn parse(pattern: &str) -> Self {
        match pattern.split_once(WILDCARD) {
            Some((prefix, suffix)) => Self::Randomized {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => Self::Literal(pattern.to_string()),
        }
    }

    /// Literal names resolve identically every time, so retrying is pointless
    pub fn is_randomized(&self) -> bool {
        matches!(self, Self::Randomized { .. })
    }

    /// Produce a candidate name, drawing a fresh token for randomized patterns
    pub fn resolve(&self, ids: &dyn IdGenerator) -> String {
        match self {
            Self::Literal(name) => name.clone(),
            Self::Randomized { prefix, suffix } => format!("{}{}{}", prefix, ids.generate(), suffix),
        }
    }
}

/// A repository created for an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedRepo {
    pub name: String,
    pub owner: String,
    pub spec: RepoSpec,
}

impl ProvisionedRepo {
    /// `host/owner/name` location reported to callers
    pub fn location(&self, host: &str) -> String {
        format!("{}/{}/{}", host, self.owner, self.name)
    }
}
