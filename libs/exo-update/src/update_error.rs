// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::database_error::DatabaseError;

/// Errors raised while compiling or executing an update.
///
/// Everything except [`UpdateError::Database`] is raised before any statement reaches the
/// database.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Cannot perform update query because update values are not defined")]
    UpdateValuesMissing,

    #[error("Property \"{property_path}\" was not found in \"{entity}\"")]
    EntityPropertyNotFound {
        property_path: String,
        entity: String,
    },

    #[error("LIMIT is not supported by {dialect} on UPDATE statements")]
    LimitOnUpdateNotSupported { dialect: String },

    #[error("RETURNING clause is not supported by {dialect} on UPDATE statements")]
    ReturningStatementNotSupported { dialect: String },

    #[error("{operation} requires entity metadata, but the update targets a plain table")]
    MissingMetadata { operation: &'static str },

    #[error("Entity ids are missing, cannot select the rows to update")]
    EntityIdsMissing,

    #[error("Cannot use {id} as an id of \"{entity}\", which has a composite primary key")]
    CannotCreateEntityIdMap { entity: String, id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
