// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;
use deadpool_postgres::Client;
use futures::TryStreamExt;
use tokio_postgres::Row;
use tracing::{debug, error, instrument};

use crate::{
    database_error::DatabaseError,
    execution::query_runner::{QueryResult, QueryRunner},
    sql::value::{ObjectLiteral, Value},
};

/// A runner holding one pooled client until it is released.
pub struct PgQueryRunner {
    client: Option<Client>,
    transaction_active: bool,
}

impl PgQueryRunner {
    pub fn new(client: Client) -> Self {
        Self {
            client: Some(client),
            transaction_active: false,
        }
    }

    fn client(&self) -> Result<&Client, DatabaseError> {
        self.client
            .as_ref()
            .ok_or_else(|| DatabaseError::Transaction("on a released query runner".into()))
    }

    async fn execute_control(&self, statement: &str) -> Result<(), DatabaseError> {
        self.client()?
            .batch_execute(statement)
            .await
            .map_err(|e| DatabaseError::Delegate(e).with_context(format!("{statement} failed")))
    }

    fn to_object(row: &Row) -> Result<ObjectLiteral, DatabaseError> {
        row.columns()
            .iter()
            .enumerate()
            .map(|(index, column)| -> Result<(String, Value), DatabaseError> {
                let value = row.try_get(index)?;
                Ok((column.name().to_string(), value))
            })
            .collect()
    }
}

#[async_trait]
impl QueryRunner for PgQueryRunner {
    fn is_transaction_active(&self) -> bool {
        self.transaction_active
    }

    async fn start_transaction(&mut self) -> Result<(), DatabaseError> {
        self.execute_control("START TRANSACTION").await?;
        self.transaction_active = true;
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<(), DatabaseError> {
        self.execute_control("COMMIT").await?;
        self.transaction_active = false;
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<(), DatabaseError> {
        // The transaction is over even if ROLLBACK fails (the connection is then unusable anyway)
        self.transaction_active = false;
        self.execute_control("ROLLBACK").await
    }

    #[instrument(
        name = "PgQueryRunner::query"
        skip_all
        fields(sql = sql)
        )]
    async fn query(&mut self, sql: &str, parameters: &[Value]) -> Result<QueryResult, DatabaseError> {
        debug!("Executing SQL: {sql} with {} parameter(s)", parameters.len());

        let stream = self
            .client()?
            .query_raw(sql, parameters.iter())
            .await
            .map_err(|e| {
                error!("Failed to execute query: {e:?}");
                DatabaseError::Delegate(e).with_context("Database operation failed".into())
            })?;
        futures::pin_mut!(stream);

        let mut records = vec![];
        while let Some(row) = stream.try_next().await? {
            records.push(Self::to_object(&row)?);
        }

        Ok(QueryResult {
            records,
            affected: stream.rows_affected(),
        })
    }

    async fn release(&mut self) -> Result<(), DatabaseError> {
        // Dropping the client returns it to the pool
        self.client.take();
        Ok(())
    }
}
