// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::{debug, instrument, warn};

use crate::{
    asql::{database_executor::DatabaseExecutor, update::AbstractUpdate},
    dialect::Dialect,
    sql::{returning::OUTPUT_TABLE, value::Entity},
    transform::update_transformer::{CompiledUpdate, compile},
    update_error::UpdateError,
};

use super::{broadcaster::BroadcastEvent, query_runner::QueryRunner, update_result::UpdateResult};

/// Execute an update.
///
/// A caller-supplied runner is only borrowed: it is neither released nor committed (unless this
/// call started the transaction). Otherwise a runner is created from the executor's factory and
/// released whatever the outcome.
#[instrument(
    name = "UpdateQueryBuilder::execute"
    skip_all
    fields(table = update.target.table_name())
    )]
pub(crate) async fn execute_update(
    update: &AbstractUpdate<'_>,
    executor: &DatabaseExecutor,
    query_runner: Option<&mut dyn QueryRunner>,
    where_entities: Option<&mut [Entity]>,
) -> Result<UpdateResult, UpdateError> {
    match query_runner {
        Some(runner) => run_in_transaction(update, executor, runner, where_entities).await,
        None => {
            let mut runner = executor.runner_factory().create_query_runner().await?;
            let result =
                run_in_transaction(update, executor, runner.as_mut(), where_entities).await;
            let released = runner.release().await;

            match (result, released) {
                (Ok(result), Ok(())) => Ok(result),
                (Ok(_), Err(release_error)) => Err(release_error.into()),
                (Err(error), Ok(())) => Err(error),
                (Err(error), Err(release_error)) => {
                    warn!("Failed to release query runner after a failed update: {release_error}");
                    Err(error)
                }
            }
        }
    }
}

async fn run_in_transaction(
    update: &AbstractUpdate<'_>,
    executor: &DatabaseExecutor,
    runner: &mut dyn QueryRunner,
    where_entities: Option<&mut [Entity]>,
) -> Result<UpdateResult, UpdateError> {
    let owns_transaction = update.use_transaction && !runner.is_transaction_active();
    if owns_transaction {
        runner.start_transaction().await?;
    }

    let result = run(update, executor, runner, where_entities, owns_transaction).await;

    if result.is_err() && owns_transaction {
        // The original error is what the caller needs to see
        if let Err(rollback_error) = runner.rollback_transaction().await {
            warn!("Failed to roll back update transaction: {rollback_error}");
        }
    }

    result
}

async fn run(
    update: &AbstractUpdate<'_>,
    executor: &DatabaseExecutor,
    runner: &mut dyn QueryRunner,
    where_entities: Option<&mut [Entity]>,
    owns_transaction: bool,
) -> Result<UpdateResult, UpdateError> {
    let dialect = executor.dialect();
    let metadata = update.target.metadata();

    let broadcast_metadata = metadata.filter(|_| update.call_listeners);
    if let Some(metadata) = broadcast_metadata {
        executor
            .broadcaster()
            .broadcast(BroadcastEvent::BeforeUpdate, metadata, &update.values)
            .await?;
    }

    let refresh_target = match (update.update_entity, metadata, where_entities) {
        (true, Some(metadata), Some(entities)) if !entities.is_empty() => {
            Some((metadata, entities))
        }
        _ => None,
    };

    let extra_returning = match &refresh_target {
        Some((metadata, _)) => executor
            .entity_refresher()
            .additional_returning_columns(*metadata, dialect),
        None => vec![],
    };

    let compiled = compile(update, dialect, &extra_returning)?;
    let sql = statement_batch(&compiled, dialect);

    debug!("Executing update: {sql}");
    let mut result = UpdateResult::from(runner.query(&sql, &compiled.parameters).await?);

    if let Some((metadata, entities)) = refresh_target {
        executor
            .entity_refresher()
            .refresh(metadata, &mut result, entities)
            .await?;
    }

    if let Some(metadata) = broadcast_metadata {
        executor
            .broadcaster()
            .broadcast(BroadcastEvent::AfterUpdate, metadata, &update.values)
            .await?;
    }

    if owns_transaction {
        runner.commit_transaction().await?;
    }

    Ok(result)
}

/// Wrap a statement that outputs into a table variable with the variable's declaration and a
/// select from it, so the rows come back as the batch's last result set.
fn statement_batch(compiled: &CompiledUpdate<'_>, dialect: &dyn Dialect) -> String {
    if compiled.output_columns.is_empty() {
        return compiled.sql.clone();
    }

    let declaration = dialect.table_variable_declaration(OUTPUT_TABLE, &compiled.output_columns);

    [
        declaration,
        Some(compiled.sql.clone()),
        Some(format!("SELECT * FROM {OUTPUT_TABLE}")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(";\n\n")
}
