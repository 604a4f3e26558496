// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing::debug;

use crate::{
    asql::update::{AbstractUpdate, Returning},
    dialect::{Dialect, MutationKind, ReturningSyntax},
    metadata::column_metadata::ColumnMetadata,
    sql::{
        ExpressionBuilder, SQLBuilder,
        limit::Limit,
        order::{OrderBy, OrderByElement},
        returning::{OUTPUT_TABLE, ReturningClause, ReturningColumns},
        sql_builder::GENERATED_PARAMETER_PREFIX,
        update::Update,
        value::{Parameters, Value},
    },
    update_error::UpdateError,
};

use super::{
    parameters::escape_query_with_parameters, property_names::replace_property_names,
    value_normalizer::normalize, where_transformer::to_where_predicate,
};

/// A statement ready to be sent to the database.
#[derive(Debug)]
pub(crate) struct CompiledUpdate<'m> {
    /// SQL with the dialect's placeholders
    pub sql: String,
    /// Values for the placeholders, in order
    pub parameters: Vec<Value>,
    /// Columns written into the OUTPUT table variable. A non-empty list means the statement must
    /// be preceded by the variable's declaration and followed by a select from it.
    pub output_columns: Vec<&'m ColumnMetadata>,
}

/// Compile an update for a dialect. `extra_returning` lists columns to return in addition to
/// those requested (for refreshing entities).
///
/// Parameters generated while compiling are scoped to this call, so compiling the same update
/// again yields the same statement.
pub(crate) fn compile<'m>(
    update: &AbstractUpdate<'m>,
    dialect: &dyn Dialect,
    extra_returning: &[&'m ColumnMetadata],
) -> Result<CompiledUpdate<'m>, UpdateError> {
    let metadata = update.target.metadata();

    let assignments = normalize(&update.target, &update.values, dialect)?;
    let predicate = to_where_predicate(update.wheres.clauses(), metadata, dialect)?;
    let (returning, output_columns) = returning_clause(update, dialect, extra_returning)?;

    let order_by = (!update.order_bys.is_empty()).then(|| {
        OrderBy(
            update
                .order_bys
                .iter()
                .map(|(sort, condition)| {
                    OrderByElement(sort.clone(), condition.ordering, condition.nulls)
                })
                .collect(),
        )
    });

    let limit = match update.limit.filter(|limit| *limit > 0) {
        Some(limit) if dialect.supports_limit_on_update() => Some(Limit(limit)),
        Some(_) => {
            return Err(UpdateError::LimitOnUpdateNotSupported {
                dialect: dialect.kind().to_string(),
            });
        }
        None => None,
    };

    let statement = Update {
        comment: update.comment.clone(),
        ctes: update.ctes.clone(),
        table: update.target.table_name().to_string(),
        assignments,
        predicate,
        returning,
        order_by,
        limit,
    };

    let user_parameters = update.wheres.parameters();
    let mut builder =
        SQLBuilder::new(dialect).with_parameter_prefix(generated_parameter_prefix(user_parameters));
    statement.build(&mut builder);
    let (sql, generated_parameters) = builder.into_sql();

    let sql = match metadata {
        Some(metadata) => replace_property_names(&sql, metadata, dialect),
        None => sql,
    };

    let mut parameters = user_parameters.clone();
    parameters.extend(generated_parameters);

    let (sql, parameters) = escape_query_with_parameters(dialect, &sql, &parameters)?;
    debug!(dialect = %dialect.kind(), %sql, "Compiled update");

    Ok(CompiledUpdate {
        sql,
        parameters,
        output_columns,
    })
}

/// A prefix for generated parameters that no caller-supplied name (`<prefix><n>`) can collide
/// with. Underscores are appended to the default prefix until no name matches.
fn generated_parameter_prefix(user_parameters: &Parameters) -> String {
    let mut prefix = GENERATED_PARAMETER_PREFIX.to_string();
    while user_parameters.keys().any(|name| {
        name.strip_prefix(prefix.as_str())
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    }) {
        prefix.push('_');
    }
    prefix
}

/// The RETURNING/OUTPUT clause: the requested columns followed by `extra_returning` (without
/// duplicates), or the raw text if one was requested. Also returns the columns to declare for
/// an OUTPUT table variable.
fn returning_clause<'m>(
    update: &AbstractUpdate<'m>,
    dialect: &dyn Dialect,
    extra_returning: &[&'m ColumnMetadata],
) -> Result<(Option<ReturningClause>, Vec<&'m ColumnMetadata>), UpdateError> {
    let syntax = dialect
        .returning_syntax()
        .filter(|_| dialect.supports_returning(MutationKind::Update));

    let Some(syntax) = syntax else {
        return match update.returning {
            Some(_) => Err(UpdateError::ReturningStatementNotSupported {
                dialect: dialect.kind().to_string(),
            }),
            None => Ok((None, vec![])),
        };
    };

    let requested: &[String] = match &update.returning {
        Some(Returning::Raw(text)) => {
            return Ok((
                Some(ReturningClause {
                    syntax,
                    columns: ReturningColumns::Raw(text.clone()),
                    into_table: None,
                }),
                vec![],
            ));
        }
        Some(Returning::Columns(columns)) => columns,
        None => &[],
    };

    let Some(metadata) = update.target.metadata() else {
        return Ok((
            (!requested.is_empty()).then(|| ReturningClause {
                syntax,
                columns: ReturningColumns::Columns(requested.to_vec()),
                into_table: None,
            }),
            vec![],
        ));
    };

    let mut columns: Vec<&'m ColumnMetadata> = vec![];
    for property_path in requested {
        let found = metadata.find_columns_with_property_path(property_path);
        if found.is_empty() {
            return Err(UpdateError::EntityPropertyNotFound {
                property_path: property_path.clone(),
                entity: metadata.target_name.clone(),
            });
        }
        for column in found {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }
    for column in extra_returning {
        if !columns.contains(column) {
            columns.push(*column);
        }
    }

    if columns.is_empty() {
        return Ok((None, vec![]));
    }

    let into_table = (syntax == ReturningSyntax::Output).then(|| OUTPUT_TABLE.to_string());
    let output_columns = if into_table.is_some() {
        columns.clone()
    } else {
        vec![]
    };

    Ok((
        Some(ReturningClause {
            syntax,
            columns: ReturningColumns::Columns(
                columns
                    .iter()
                    .map(|column| column.database_name.clone())
                    .collect(),
            ),
            into_table,
        }),
        output_columns,
    ))
}
