// src/application/config.rs
//
// Resolver configuration.
//
// Sources, lowest precedence first: built-in defaults, environment, CLI flags.

use std::path::PathBuf;

use crate::db::default_database_path;
use crate::error::{AppError, AppResult};

pub const DATABASE_ENV: &str = "CHECKPOINT_RESOLVER_DB";
pub const POOL_SIZE_ENV: &str = "CHECKPOINT_RESOLVER_POOL_SIZE";
pub const DEFAULT_POOL_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub database_path: PathBuf,
    pub pool_size: u32,
}

impl ResolverConfig {
    /// Defaults overlaid with `CHECKPOINT_RESOLVER_*` environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database_path = match lookup(DATABASE_ENV) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        let pool_size = match lookup(POOL_SIZE_ENV) {
            Some(raw) => parse_pool_size(&raw)?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_path,
            pool_size,
        })
    }

    /// Apply a command-line database override, if given.
    pub fn with_database_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }
}

fn parse_pool_size(raw: &str) -> AppResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(AppError::Other(format!(
            "{} must be a positive integer, got '{}'",
            POOL_SIZE_ENV, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_values_are_used() {
        let config = ResolverConfig::from_lookup(lookup_from(&[
            (DATABASE_ENV, "/tmp/resolver/test.db"),
            (POOL_SIZE_ENV, "2"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/resolver/test.db"));
        assert_eq!(config.pool_size, 2);
    }

    #[test]
    fn test_invalid_pool_size_rejected() {
        let result = ResolverConfig::from_lookup(lookup_from(&[
            (DATABASE_ENV, "/tmp/x.db"),
            (POOL_SIZE_ENV, "zero"),
        ]));
        assert!(result.is_err());

        let result = ResolverConfig::from_lookup(lookup_from(&[
            (DATABASE_ENV, "/tmp/x.db"),
            (POOL_SIZE_ENV, "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_pool_size() {
        let config =
            ResolverConfig::from_lookup(lookup_from(&[(DATABASE_ENV, "/tmp/x.db")])).unwrap();
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_cli_override_wins() {
        let config = ResolverConfig::from_lookup(lookup_from(&[(DATABASE_ENV, "/tmp/env.db")]))
            .unwrap()
            .with_database_override(Some(PathBuf::from("/tmp/cli.db")));
        assert_eq!(config.database_path, PathBuf::from("/tmp/cli.db"));

        let config = config.with_database_override(None);
        assert_eq!(config.database_path, PathBuf::from("/tmp/cli.db"));
    }
}
