// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

/// Errors raised by the transport and its collaborators: configuration, pooling, transaction
/// control and the statements themselves.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Starting, committing or rolling back a transaction failed, or a runner was used after
    /// being released
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// A value or collaborator rejected the update
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Postgres: {0}")]
    Delegate(#[from] tokio_postgres::Error),

    #[error("Connection pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("{0}: {1}")]
    WithContext(String, #[source] Box<DatabaseError>),

    #[error("{0}")]
    BoxedError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl DatabaseError {
    /// Prefix the error with what was being attempted
    pub fn with_context(self, context: String) -> DatabaseError {
        DatabaseError::WithContext(context, Box::new(self))
    }
}

pub trait WithContext {
    fn with_context(self, context: String) -> Self;
}

impl<T> WithContext for Result<T, DatabaseError> {
    fn with_context(self, context: String) -> Result<T, DatabaseError> {
        self.map_err(|error| error.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prefixed() {
        let error: Result<(), DatabaseError> = Err(DatabaseError::Transaction("COMMIT".into()));

        assert_eq!(
            error
                .with_context("Update of users failed".into())
                .unwrap_err()
                .to_string(),
            "Update of users failed: Transaction error: COMMIT"
        );
    }
}
