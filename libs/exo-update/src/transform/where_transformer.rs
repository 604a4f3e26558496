// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    asql::where_builder::{Condition, WhereClause},
    dialect::Dialect,
    metadata::entity_metadata::EntityMetadata,
    sql::{
        predicate::{Comparison, Connective, Operand, Predicate, WherePredicate},
        value::{ObjectLiteral, Value},
    },
    update_error::UpdateError,
};

use super::value_normalizer::{prepare_value, resolve_property_value};

/// Resolve the abstract predicates to SQL predicates. Object conditions refer to property paths
/// when there is metadata, and to column names otherwise.
pub(crate) fn to_where_predicate(
    clauses: &[WhereClause],
    metadata: Option<&EntityMetadata>,
    dialect: &dyn Dialect,
) -> Result<WherePredicate, UpdateError> {
    Ok(WherePredicate {
        clauses: to_predicates(clauses, metadata, dialect)?,
    })
}

fn to_predicates(
    clauses: &[WhereClause],
    metadata: Option<&EntityMetadata>,
    dialect: &dyn Dialect,
) -> Result<Vec<(Connective, Predicate)>, UpdateError> {
    clauses
        .iter()
        .map(|clause| {
            let predicate = match &clause.condition {
                Condition::Text(text) => Predicate::Text(text.clone()),
                Condition::Brackets { negated, clauses } => Predicate::Brackets {
                    negated: *negated,
                    clauses: to_predicates(clauses, metadata, dialect)?,
                },
                Condition::Object(object) => {
                    Predicate::Match(comparisons(object, metadata, dialect)?)
                }
                Condition::Objects(objects) => Predicate::AnyOf(
                    objects
                        .iter()
                        .map(|object| comparisons(object, metadata, dialect))
                        .collect::<Result<_, _>>()?,
                ),
            };
            Ok((clause.connective, predicate))
        })
        .collect()
}

fn comparisons(
    object: &ObjectLiteral,
    metadata: Option<&EntityMetadata>,
    dialect: &dyn Dialect,
) -> Result<Vec<Comparison>, UpdateError> {
    let Some(metadata) = metadata else {
        return Ok(object
            .iter()
            .map(|(column, value)| Comparison {
                column: column.clone(),
                operand: operand(value.clone(), |value| value),
            })
            .collect());
    };

    let mut comparisons = vec![];
    for (property_path, value) in object {
        let columns = metadata.find_columns_with_property_path(property_path);
        if columns.is_empty() {
            return Err(UpdateError::EntityPropertyNotFound {
                property_path: property_path.clone(),
                entity: metadata.target_name.clone(),
            });
        }

        for column in columns {
            if let Some(value) = resolve_property_value(column, property_path, value) {
                comparisons.push(Comparison {
                    column: column.database_name.clone(),
                    operand: operand(value, |value| prepare_value(column, value, dialect)),
                });
            }
        }
    }

    Ok(comparisons)
}

/// Nulls are compared with `IS NULL` and lists with `IN`, preparing each element individually.
fn operand(value: Value, prepare: impl Fn(Value) -> Value) -> Operand {
    match value {
        Value::Null => Operand::IsNull,
        Value::Array(values) => Operand::In(values.into_iter().map(prepare).collect()),
        value => Operand::Eq(prepare(value)),
    }
}
