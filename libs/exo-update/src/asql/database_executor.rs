// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use tracing::debug;

use crate::{
    config::{ConnectionConfig, Environment},
    connect::PgConnection,
    database_error::DatabaseError,
    dialect::{Dialect, DialectKind},
    execution::{
        broadcaster::{Broadcaster, NoopBroadcaster},
        entity_refresher::{EntityRefresher, ReturningResultsEntityUpdater},
        query_runner::QueryRunnerFactory,
    },
    metadata::entity_metadata::EntityMetadata,
};

use super::{update::UpdateTarget, update_query_builder::UpdateQueryBuilder};

/// Entry point for updates against one database: the dialect statements are compiled for, where
/// query runners come from, and the collaborators notified around each update.
pub struct DatabaseExecutor {
    dialect: Arc<dyn Dialect>,
    runner_factory: Arc<dyn QueryRunnerFactory>,
    broadcaster: Arc<dyn Broadcaster>,
    entity_refresher: Arc<dyn EntityRefresher>,
}

impl DatabaseExecutor {
    pub fn new(dialect: Arc<dyn Dialect>, runner_factory: Arc<dyn QueryRunnerFactory>) -> Self {
        Self {
            dialect,
            runner_factory,
            broadcaster: Arc::new(NoopBroadcaster),
            entity_refresher: Arc::new(ReturningResultsEntityUpdater),
        }
    }

    /// Connect to the database the environment describes. Only Postgres has a transport in this
    /// crate; other dialects need an executor built with [`DatabaseExecutor::new`].
    pub async fn from_env(env: &dyn Environment) -> Result<Self, DatabaseError> {
        let config = ConnectionConfig::from_env(env)?;

        if config.dialect != DialectKind::Postgres {
            return Err(DatabaseError::Config(format!(
                "No transport is available for {}; provide a query runner factory instead",
                config.dialect
            )));
        }

        debug!("Connecting with pool size {}", config.pool_size);
        let connection = PgConnection::from_config(&config).await?;

        Ok(Self::new(
            config.dialect.dialect(config.legacy_spatial_support),
            Arc::new(connection),
        ))
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn with_entity_refresher(mut self, entity_refresher: Arc<dyn EntityRefresher>) -> Self {
        self.entity_refresher = entity_refresher;
        self
    }

    /// Start an update of a mapped entity.
    pub fn update<'a>(&'a self, metadata: &'a EntityMetadata) -> UpdateQueryBuilder<'a> {
        UpdateQueryBuilder::new(self, UpdateTarget::Entity(metadata))
    }

    /// Start an update of a plain table. Assignment keys and returned names are column names.
    pub fn update_table(&self, table_name: impl Into<String>) -> UpdateQueryBuilder<'_> {
        UpdateQueryBuilder::new(self, UpdateTarget::Table(table_name.into()))
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub(crate) fn runner_factory(&self) -> &dyn QueryRunnerFactory {
        self.runner_factory.as_ref()
    }

    pub(crate) fn broadcaster(&self) -> &dyn Broadcaster {
        self.broadcaster.as_ref()
    }

    pub(crate) fn entity_refresher(&self) -> &dyn EntityRefresher {
        self.entity_refresher.as_ref()
    }
}
