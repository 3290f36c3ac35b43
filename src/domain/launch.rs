// src/domain/launch.rs
//
// Launch context: the navigation parameters a resolution screen is opened with.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::domain::{DomainError, DomainResult};

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[\p{L}][\p{L}\p{Nd}_]*$").expect("identifier pattern is valid")
    })
}

/// Validated app and table identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchContext {
    pub app_name: String,
    pub table_id: String,
}

impl LaunchContext {
    /// Both parameters are required; `None` and blank values are rejected.
    pub fn from_params(app_name: Option<&str>, table_id: Option<&str>) -> DomainResult<Self> {
        let app_name = require("app_name", app_name)?;
        let table_id = require("table_id", table_id)?;

        validate_identifier("app_name", app_name)?;
        validate_identifier("table_id", table_id)?;

        Ok(Self {
            app_name: app_name.to_string(),
            table_id: table_id.to_string(),
        })
    }
}

fn require<'a>(name: &str, value: Option<&'a str>) -> DomainResult<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::InvariantViolation(format!(
            "Missing required parameter: {}",
            name
        ))),
    }
}

/// App names and table ids start with a letter and contain only letters,
/// digits and underscores.
pub fn validate_identifier(name: &str, value: &str) -> DomainResult<()> {
    if identifier_pattern().is_match(value) {
        Ok(())
    } else {
        Err(DomainError::InvariantViolation(format!(
            "Invalid {} '{}'",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_context() {
        let ctx = LaunchContext::from_params(Some("default"), Some("census_2024")).unwrap();
        assert_eq!(ctx.app_name, "default");
        assert_eq!(ctx.table_id, "census_2024");
    }

    #[test]
    fn test_missing_app_name() {
        let err = LaunchContext::from_params(None, Some("census")).unwrap_err();
        assert!(err.to_string().contains("app_name"));
    }

    #[test]
    fn test_empty_table_id() {
        let err = LaunchContext::from_params(Some("default"), Some("")).unwrap_err();
        assert!(err.to_string().contains("table_id"));
    }

    #[test]
    fn test_malformed_identifier() {
        assert!(LaunchContext::from_params(Some("default"), Some("1table")).is_err());
        assert!(LaunchContext::from_params(Some("de fault"), Some("census")).is_err());
    }
}
