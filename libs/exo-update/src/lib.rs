// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

/// The core idea in this library is that of [AbstractUpdate]: a declaration of an UPDATE (what
/// to assign, which rows, what to return) expressed in terms of entity properties rather than
/// columns. An [UpdateQueryBuilder], obtained from a [DatabaseExecutor], builds one through
/// chained calls and then either compiles it for the executor's [Dialect] or runs it.
///
/// Compilation resolves property paths through [EntityMetadata] (embedded objects, relations
/// and their join columns), adds version and update-date bookkeeping, and renders the
/// dialect's flavour of placeholders, RETURNING/OUTPUT, spatial literals and LIMIT. Execution
/// takes care of the runner and transaction lifecycle, notifies a [Broadcaster] around the
/// update, and refreshes the updated entities with values computed by the database.
///
/// For example:
///
/// ```ignore
/// let result = executor
///     .update(&user_metadata)
///     .set(values! { "name" => "Ana" })
///     .where_("id = :id")
///     .set_parameter("id", 7)
///     .execute()
///     .await?;
/// ```
#[macro_use]
mod sql;
mod asql;
mod connect;
mod execution;
mod transform;

pub mod config;
pub mod database_error;
pub mod dialect;
pub mod metadata;
pub mod update_error;

/// Public types at the root level of this crate
pub use asql::{
    database_executor::DatabaseExecutor,
    update::{
        AbstractUpdate, OrderByCondition, OrderBys, RawSql, Returning, SetValue, UpdateTarget,
        ValuesSet,
    },
    update_query_builder::UpdateQueryBuilder,
    where_builder::{Condition, SubQuery, WhereBuilder, WhereClause, WhereExpression},
};

pub use connect::{PgConnection, PgQueryRunner};

pub use dialect::{Dialect, DialectKind, MutationKind};

pub use execution::{
    broadcaster::{BroadcastEvent, Broadcaster, NoopBroadcaster},
    entity_refresher::{EntityRefresher, ReturningResultsEntityUpdater},
    query_runner::{QueryResult, QueryRunner, QueryRunnerFactory},
    update_result::UpdateResult,
};

pub use metadata::{
    column_metadata::{ColumnMetadata, ValueTransformer},
    column_type::ColumnType,
    entity_metadata::EntityMetadata,
};

pub use sql::{
    cte::CommonTableExpression,
    order::{NullsOrdering, Ordering},
    predicate::Connective,
    value::{Entity, ObjectLiteral, Parameters, Value},
};

pub use update_error::UpdateError;
