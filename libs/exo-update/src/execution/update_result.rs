// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::sql::value::ObjectLiteral;

use super::query_runner::QueryResult;

/// The outcome of an executed update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    /// Rows returned by RETURNING/OUTPUT, keyed by column name
    pub raw: Vec<ObjectLiteral>,
    /// Number of updated rows, if the driver reports it
    pub affected: Option<u64>,
    /// For each refreshed entity (by position), the values merged into it, keyed by property
    /// path
    pub generated_maps: Vec<ObjectLiteral>,
}

impl From<QueryResult> for UpdateResult {
    fn from(result: QueryResult) -> Self {
        Self {
            raw: result.records,
            affected: result.affected,
            generated_maps: vec![],
        }
    }
}
