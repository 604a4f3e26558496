// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolves assignments to column writes: drops unset values, maps property paths to columns and
//! coerces each value into what the column's dialect binds.

use crate::{
    asql::update::{SetValue, UpdateTarget, ValuesSet},
    dialect::{Dialect, NullAssignment},
    metadata::{column_metadata::ColumnMetadata, entity_metadata::EntityMetadata},
    sql::{
        column_assignment::{AssignedValue, ColumnAssignment},
        value::Value,
    },
    update_error::UpdateError,
};

/// The SET list for an update, in assignment order.
///
/// For an entity, each property path expands to its columns (a column reached through more than
/// one path is written once, by the first), non-updatable columns are skipped, and the version
/// and update date columns are bumped unless assigned explicitly. For a plain table, keys are
/// column names.
pub(crate) fn normalize(
    target: &UpdateTarget<'_>,
    values: &ValuesSet,
    dialect: &dyn Dialect,
) -> Result<Vec<ColumnAssignment>, UpdateError> {
    match target.metadata() {
        Some(metadata) => normalize_entity_values(metadata, values, dialect),
        None => normalize_table_values(values, dialect),
    }
}

fn normalize_entity_values(
    metadata: &EntityMetadata,
    values: &ValuesSet,
    dialect: &dyn Dialect,
) -> Result<Vec<ColumnAssignment>, UpdateError> {
    let mut assignments = vec![];
    let mut updated_columns: Vec<&ColumnMetadata> = vec![];

    for (property_path, value) in values {
        if matches!(value, SetValue::Unset) {
            continue;
        }

        let columns = metadata.find_columns_with_property_path(property_path);
        if columns.is_empty() {
            return Err(UpdateError::EntityPropertyNotFound {
                property_path: property_path.clone(),
                entity: metadata.target_name.clone(),
            });
        }

        for column in columns {
            if !column.is_update || updated_columns.contains(&column) {
                continue;
            }

            let assigned = match value {
                SetValue::Raw(raw) => AssignedValue::Raw(raw.sql()),
                SetValue::Value(value) => {
                    let Some(value) = resolve_property_value(column, property_path, value) else {
                        continue;
                    };
                    assigned_value(column, prepare_value(column, value, dialect), dialect)
                }
                SetValue::Unset => continue,
            };

            updated_columns.push(column);
            assignments.push(ColumnAssignment::new(&column.database_name, assigned));
        }
    }

    if assignments.is_empty() {
        return Err(UpdateError::UpdateValuesMissing);
    }

    if let Some(version_column) = metadata
        .version_column()
        .filter(|column| !updated_columns.contains(column))
    {
        assignments.push(ColumnAssignment::new(
            &version_column.database_name,
            AssignedValue::Increment,
        ));
    }

    if let Some(update_date_column) = metadata
        .update_date_column()
        .filter(|column| !updated_columns.contains(column))
    {
        assignments.push(ColumnAssignment::new(
            &update_date_column.database_name,
            AssignedValue::CurrentTimestamp,
        ));
    }

    Ok(assignments)
}

fn normalize_table_values(
    values: &ValuesSet,
    dialect: &dyn Dialect,
) -> Result<Vec<ColumnAssignment>, UpdateError> {
    let assignments: Vec<_> = values
        .iter()
        .filter_map(|(column, value)| {
            let assigned = match value {
                SetValue::Unset => return None,
                SetValue::Raw(raw) => AssignedValue::Raw(raw.sql()),
                SetValue::Value(Value::Null)
                    if dialect.null_assignment() == NullAssignment::Literal =>
                {
                    AssignedValue::Null
                }
                SetValue::Value(value) => AssignedValue::Param(value.clone()),
            };
            Some(ColumnAssignment::new(column, assigned))
        })
        .collect();

    if assignments.is_empty() {
        return Err(UpdateError::UpdateValuesMissing);
    }

    Ok(assignments)
}

/// The value `column` receives when `value` is assigned to `property_path`, which is either the
/// column's own path, an embedded object containing it, or the `relation.referencedProperty` form
/// of a join column. Related objects are replaced by the value of the referenced column.
///
/// Returns `None` if the value has nothing for this column (an embedded object without the
/// property, or a related object without the referenced property).
pub(crate) fn resolve_property_value(
    column: &ColumnMetadata,
    property_path: &str,
    value: &Value,
) -> Option<Value> {
    let embedded_path = column
        .property_path
        .strip_prefix(property_path)
        .and_then(|rest| rest.strip_prefix('.'));

    let value = match embedded_path {
        // A null embedded object nulls every column in it
        Some(_) if value.is_null() => Value::Null,
        Some(embedded_path) => value.get_path(embedded_path)?.clone(),
        None => value.clone(),
    };

    match (&column.referenced_column, &value) {
        (Some(_), Value::Object(_)) => column.dereference(&value),
        _ => Some(value),
    }
}

/// Apply the column's value transformer and the dialect's persistence coercion.
pub(crate) fn prepare_value(column: &ColumnMetadata, value: Value, dialect: &dyn Dialect) -> Value {
    let value = match &column.transformer {
        Some(transformer) => transformer.to_database(value),
        None => value,
    };
    dialect.prepare_persistent_value(column, value)
}

fn assigned_value(column: &ColumnMetadata, value: Value, dialect: &dyn Dialect) -> AssignedValue {
    if value.is_null() && dialect.null_assignment() == NullAssignment::Literal {
        return AssignedValue::Null;
    }

    let value = dialect.parametrize(column, value);
    if column.column_type.is_spatial() {
        AssignedValue::Spatial {
            column: column.clone(),
            value,
        }
    } else {
        AssignedValue::Param(value)
    }
}
