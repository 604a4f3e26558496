// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;

use async_trait::async_trait;
use deadpool_postgres::{Client, Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::Config;
use tracing::warn;

use crate::{
    config::ConnectionConfig,
    database_error::{DatabaseError, WithContext},
    execution::query_runner::{QueryRunner, QueryRunnerFactory},
};

use super::pg_query_runner::PgQueryRunner;

/// Url parameters some providers include, but which the driver rejects. Connections are made
/// without TLS, so they are dropped.
const UNSUPPORTED_URL_PARAMS: [&str; 3] = ["ssl", "sslmode", "sslrootcert"];

pub struct PgConnection {
    pool: Pool,
}

impl PgConnection {
    pub async fn from_config(config: &ConnectionConfig) -> Result<Self, DatabaseError> {
        Self::from_helper(
            config.pool_size,
            config.check_connection_on_startup,
            config.required_url()?,
            config.user.as_deref(),
            config.password.as_deref(),
        )
        .await
    }

    pub async fn from_db_url(url: &str) -> Result<Self, DatabaseError> {
        Self::from_helper(1, true, url, None, None).await
    }

    async fn from_helper(
        pool_size: usize,
        check_connection: bool,
        url: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, DatabaseError> {
        let url = Self::strip_unsupported_params(url)?;

        let mut config = Config::from_str(&url)
            .map_err(DatabaseError::Delegate)
            .with_context("Failed to parse PostgreSQL connection string".into())?;

        if let Some(user) = user {
            config.user(user);
        }
        if let Some(password) = password {
            config.password(password);
        }

        if config.get_user().is_none() {
            return Err(DatabaseError::Config(
                "Database user must be specified as a part of EXO_POSTGRES_URL or through EXO_POSTGRES_USER".into(),
            ));
        }

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(config, tokio_postgres::NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(pool_size)
            .build()
            .map_err(|e| DatabaseError::Config(format!("Failed to create DB pool: {e}")))?;

        let connection = Self { pool };

        if check_connection {
            let _ = connection.get_client().await?;
        }

        Ok(connection)
    }

    pub async fn get_client(&self) -> Result<Client, DatabaseError> {
        Ok(self.pool.get().await?)
    }

    fn strip_unsupported_params(url: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(url)
            .map_err(|_| DatabaseError::Config("Invalid database URL".into()))?;

        let (kept, dropped): (Vec<_>, Vec<_>) = url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .partition(|(name, _)| !UNSUPPORTED_URL_PARAMS.contains(&name.as_str()));

        if !dropped.is_empty() {
            warn!(
                "Ignoring TLS parameters in the database URL: {}",
                dropped
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }

        Ok(url.to_string())
    }
}

#[async_trait]
impl QueryRunnerFactory for PgConnection {
    async fn create_query_runner(&self) -> Result<Box<dyn QueryRunner>, DatabaseError> {
        Ok(Box::new(PgQueryRunner::new(self.get_client().await?)))
    }
}
