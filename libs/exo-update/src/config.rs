// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Connection settings read from the process environment (or a map, in tests).

use std::{collections::HashMap, sync::Arc};

use crate::{database_error::DatabaseError, dialect::DialectKind};

const DIALECT_PARAM: &str = "EXO_DATABASE_DIALECT";
const URL_PARAM: &str = "EXO_POSTGRES_URL";
const USER_PARAM: &str = "EXO_POSTGRES_USER";
const PASSWORD_PARAM: &str = "EXO_POSTGRES_PASSWORD";
const CONNECTION_POOL_SIZE_PARAM: &str = "EXO_CONNECTION_POOL_SIZE";
const CHECK_CONNECTION_ON_STARTUP_PARAM: &str = "EXO_CHECK_CONNECTION_ON_STARTUP";
const LEGACY_SPATIAL_SUPPORT_PARAM: &str = "EXO_LEGACY_SPATIAL_SUPPORT";

const DEFAULT_POOL_SIZE: usize = 10;

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, EnvError> {
        match self.get(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(EnvError::InvalidBoolean {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Invalid value for {key}: {value}. Expected true, 1, yes, on OR false, 0, no, off")]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid env value {env_value} for {env_key}: {message}")]
    InvalidValue {
        env_key: &'static str,
        env_value: String,
        message: String,
    },
}

impl From<EnvError> for DatabaseError {
    fn from(error: EnvError) -> Self {
        DatabaseError::Config(error.to_string())
    }
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An environment backed by a map, optionally falling back to another environment.
#[derive(Clone, Default)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
    fallback: Option<Arc<dyn Environment>>,
}

impl MapEnvironment {
    pub fn new_with_fallback(fallback: Arc<dyn Environment>) -> Self {
        Self {
            values: HashMap::new(),
            fallback: Some(fallback),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| self.fallback.as_ref().and_then(|fallback| fallback.get(key)))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            fallback: None,
        }
    }
}

/// Settings for the executor built by `DatabaseExecutor::from_env`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub dialect: DialectKind,
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub pool_size: usize,
    pub check_connection_on_startup: bool,
    /// Use the pre-8.0 MySQL spatial functions (`GeomFromText`)
    pub legacy_spatial_support: bool,
}

impl ConnectionConfig {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let dialect = match env.get(DIALECT_PARAM) {
            Some(value) => value.parse::<DialectKind>().map_err(|message| EnvError::InvalidValue {
                env_key: DIALECT_PARAM,
                env_value: value.clone(),
                message,
            })?,
            None => DialectKind::Postgres,
        };

        let pool_size = match env.get(CONNECTION_POOL_SIZE_PARAM) {
            Some(value) => value.parse::<usize>().map_err(|_| EnvError::InvalidValue {
                env_key: CONNECTION_POOL_SIZE_PARAM,
                env_value: value.clone(),
                message: "Expected a positive integer".into(),
            })?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            dialect,
            url: env.get(URL_PARAM),
            user: env.get(USER_PARAM),
            password: env.get(PASSWORD_PARAM),
            pool_size,
            check_connection_on_startup: env.enabled(CHECK_CONNECTION_ON_STARTUP_PARAM, true)?,
            legacy_spatial_support: env.enabled(LEGACY_SPATIAL_SUPPORT_PARAM, false)?,
        })
    }

    /// The URL of the database, or a configuration error naming the missing variable.
    pub fn required_url(&self) -> Result<&str, DatabaseError> {
        self.url
            .as_deref()
            .ok_or_else(|| DatabaseError::Config(format!("Env {URL_PARAM} must be provided")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::from_env(&MapEnvironment::default()).unwrap();

        assert_eq!(config.dialect, DialectKind::Postgres);
        assert_eq!(config.pool_size, 10);
        assert!(config.check_connection_on_startup);
        assert!(!config.legacy_spatial_support);
        assert!(config.required_url().is_err());
    }

    #[test]
    fn reads_every_setting() {
        let env = MapEnvironment::from([
            ("EXO_DATABASE_DIALECT", "mariadb"),
            ("EXO_POSTGRES_URL", "postgres://localhost/app"),
            ("EXO_POSTGRES_USER", "app"),
            ("EXO_CONNECTION_POOL_SIZE", "3"),
            ("EXO_CHECK_CONNECTION_ON_STARTUP", "off"),
            ("EXO_LEGACY_SPATIAL_SUPPORT", "yes"),
        ]);
        let config = ConnectionConfig::from_env(&env).unwrap();

        assert_eq!(config.dialect, DialectKind::MariaDb);
        assert_eq!(config.required_url().unwrap(), "postgres://localhost/app");
        assert_eq!(config.user.as_deref(), Some("app"));
        assert_eq!(config.password, None);
        assert_eq!(config.pool_size, 3);
        assert!(!config.check_connection_on_startup);
        assert!(config.legacy_spatial_support);
    }

    #[test]
    fn invalid_values_are_reported() {
        let env = MapEnvironment::from([("EXO_CONNECTION_POOL_SIZE", "many")]);
        assert!(matches!(
            ConnectionConfig::from_env(&env),
            Err(EnvError::InvalidValue { env_key: "EXO_CONNECTION_POOL_SIZE", .. })
        ));

        let env = MapEnvironment::from([("EXO_CHECK_CONNECTION_ON_STARTUP", "maybe")]);
        assert!(matches!(
            ConnectionConfig::from_env(&env),
            Err(EnvError::InvalidBoolean { .. })
        ));

        let env = MapEnvironment::from([("EXO_DATABASE_DIALECT", "db2")]);
        assert!(ConnectionConfig::from_env(&env).is_err());
    }

    #[test]
    fn map_environment_falls_back() {
        let mut fallback = MapEnvironment::default();
        fallback.set("EXO_POSTGRES_USER", "root");
        let mut env = MapEnvironment::new_with_fallback(Arc::new(fallback));
        env.set("EXO_POSTGRES_PASSWORD", "secret");

        assert_eq!(env.get("EXO_POSTGRES_USER").as_deref(), Some("root"));
        assert_eq!(env.get("EXO_POSTGRES_PASSWORD").as_deref(), Some("secret"));
        assert_eq!(env.get("EXO_POSTGRES_URL"), None);
    }
}
