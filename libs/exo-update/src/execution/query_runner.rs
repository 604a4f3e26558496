// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;

use crate::{
    database_error::DatabaseError,
    sql::value::{ObjectLiteral, Value},
};

/// What a statement batch produced: the rows of its last result set (keyed by column name) and
/// the number of rows the mutation affected, when the driver reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub records: Vec<ObjectLiteral>,
    pub affected: Option<u64>,
}

/// A connection (and at most one transaction on it) that statements run against.
///
/// A runner is used by one update at a time.
#[async_trait]
pub trait QueryRunner: Send {
    fn is_transaction_active(&self) -> bool;

    async fn start_transaction(&mut self) -> Result<(), DatabaseError>;

    async fn commit_transaction(&mut self) -> Result<(), DatabaseError>;

    async fn rollback_transaction(&mut self) -> Result<(), DatabaseError>;

    /// Run a batch of one or more statements (separated by `;`) with positional parameters.
    async fn query(&mut self, sql: &str, parameters: &[Value]) -> Result<QueryResult, DatabaseError>;

    /// Return the underlying connection. The runner is not used afterwards.
    async fn release(&mut self) -> Result<(), DatabaseError>;
}

/// Creates the runners an executor uses when the caller does not supply one.
#[async_trait]
pub trait QueryRunnerFactory: Send + Sync {
    async fn create_query_runner(&self) -> Result<Box<dyn QueryRunner>, DatabaseError>;
}
