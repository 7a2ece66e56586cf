//! Request validation

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::repo_spec::{RepoSpec, WILDCARD};
use super::result::{NewUserRequest, VAR_KEYSCAN, VAR_PASSWORD, VAR_PRIVATE_KEY, VAR_PUBLIC_KEY, VAR_USERNAME};

/// Output variable names: shell-style identifiers
static VAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Repository name characters Gitea accepts, plus the wildcard
static REPO_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._*-]+$").unwrap());

const RESERVED_VARS: [&str; 5] = [VAR_USERNAME, VAR_PASSWORD, VAR_PRIVATE_KEY, VAR_PUBLIC_KEY, VAR_KEYSCAN];

/// Request validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum RequestValidationError {
    InvalidVar { var: String },
    ReservedVar { var: String },
    DuplicateVar { var: String },
    EmptyPattern { var: String },
    InvalidPattern { var: String, pattern: String },
    MultipleWildcards { var: String, pattern: String },
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVar { var } => write!(
                f,
                "invalid variable name '{}': must be letters, digits and underscores, not starting with a digit",
                var
            ),
            Self::ReservedVar { var } => write!(f, "variable name '{}' is reserved", var),
            Self::DuplicateVar { var } => write!(f, "variable name '{}' is used more than once", var),
            Self::EmptyPattern { var } => write!(f, "empty repository pattern for '{}'", var),
            Self::InvalidPattern { var, pattern } => write!(
                f,
                "invalid repository pattern '{}' for '{}': only letters, digits, '.', '_', '-' and '*' are allowed",
                pattern, var
            ),
            Self::MultipleWildcards { var, pattern } => write!(
                f,
                "repository pattern '{}' for '{}' may contain at most one '{}'",
                pattern, var, WILDCARD
            ),
        }
    }
}

impl std::error::Error for RequestValidationError {}

pub fn validate_repo_spec(spec: &RepoSpec) -> Result<(), RequestValidationError> {
    if !VAR_PATTERN.is_match(&spec.var) {
        return Err(RequestValidationError::InvalidVar { var: spec.var.clone() });
    }

    if RESERVED_VARS.contains(&spec.var.as_str()) {
        return Err(RequestValidationError::ReservedVar { var: spec.var.clone() });
    }

    if spec.pattern.is_empty() {
        return Err(RequestValidationError::EmptyPattern { var: spec.var.clone() });
    }

    if !REPO_PATTERN.is_match(&spec.pattern) {
        return Err(RequestValidationError::InvalidPattern {
            var: spec.var.clone(),
            pattern: spec.pattern.clone(),
        });
    }

    if spec.pattern.matches(WILDCARD).count() > 1 {
        return Err(RequestValidationError::MultipleWildcards {
            var: spec.var.clone(),
            pattern: spec.pattern.clone(),
        });
    }

    Ok(())
}

pub fn validate_new_user_request(request: &NewUserRequest) -> Result<(), RequestValidationError> {
    let mut seen = HashSet::new();

    for spec in &request.repos {
        validate_repo_spec(spec)?;

        if !seen.insert(spec.var.as_str()) {
            return Err(RequestValidationError::DuplicateVar { var: spec.var.clone() });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(specs: Vec<RepoSpec>) -> NewUserRequest {
        NewUserRequest { repos: specs }
    }

    #[test]
    fn test_valid_request() {
        let req = request(vec![
            RepoSpec::new("REPO1", "user", false),
            RepoSpec::new("REPO2", "user*", true),
        ]);
        assert!(validate_new_user_request(&req).is_ok());
    }

    #[test]
    fn test_invalid_var() {
        let err = validate_repo_spec(&RepoSpec::new("1REPO", "user", false)).unwrap_err();
        assert!(matches!(err, RequestValidationError::InvalidVar { .. }));

        let err = validate_repo_spec(&RepoSpec::new("REPO;rm", "user", false)).unwrap_err();
        assert!(matches!(err, RequestValidationError::InvalidVar { .. }));
    }

    #[test]
    fn test_reserved_var() {
        let err = validate_repo_spec(&RepoSpec::new("GITEA_USERNAME", "user", false)).unwrap_err();
        assert_eq!(
            err,
            RequestValidationError::ReservedVar {
                var: "GITEA_USERNAME".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_var() {
        let req = request(vec![
            RepoSpec::new("REPO", "a", false),
            RepoSpec::new("REPO", "b", false),
        ]);
        assert!(matches!(
            validate_new_user_request(&req),
            Err(RequestValidationError::DuplicateVar { .. })
        ));
    }

    #[test]
    fn test_pattern_rules() {
        assert!(matches!(
            validate_repo_spec(&RepoSpec::new("R", "", false)),
            Err(RequestValidationError::EmptyPattern { .. })
        ));
        assert!(matches!(
            validate_repo_spec(&RepoSpec::new("R", "a b", false)),
            Err(RequestValidationError::InvalidPattern { .. })
        ));
        assert!(matches!(
            validate_repo_spec(&RepoSpec::new("R", "a'$(id)'", false)),
            Err(RequestValidationError::InvalidPattern { .. })
        ));
        assert!(matches!(
            validate_repo_spec(&RepoSpec::new("R", "a*b*", false)),
            Err(RequestValidationError::MultipleWildcards { .. })
        ));
        assert!(validate_repo_spec(&RepoSpec::new("R", "*", false)).is_ok());
    }
}
