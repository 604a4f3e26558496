// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{collections::HashMap, sync::LazyLock};

use regex::{Captures, Regex};

use crate::{
    database_error::DatabaseError,
    dialect::Dialect,
    sql::value::{Parameters, Value},
    update_error::UpdateError,
};

/// `:name` or `:...name`. Runs of colons are captured so `::type` casts can be left alone.
static PARAMETER_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(:+)(\.\.\.)?([A-Za-z0-9_.]+)"));

/// Replace named parameters with the dialect's placeholders and return the values to bind, in
/// placeholder order.
///
/// A spread parameter (`:...ids`) expands to one placeholder per array element, or to `NULL`
/// for an empty array. Names without a parameter are left untouched.
pub(crate) fn escape_query_with_parameters(
    dialect: &dyn Dialect,
    sql: &str,
    parameters: &Parameters,
) -> Result<(String, Vec<Value>), UpdateError> {
    let pattern = PARAMETER_PATTERN.as_ref().map_err(|error| {
        DatabaseError::Validation(format!("Invalid parameter pattern: {error}"))
    })?;

    let mut values: Vec<Value> = vec![];
    // Placeholders already rendered, for dialects that reuse them
    let mut rendered: HashMap<String, String> = HashMap::new();

    let escaped = pattern.replace_all(sql, |captures: &Captures| {
        let reference = &captures[0];
        if captures[1].len() > 1 {
            return reference.to_string();
        }

        let Some(value) = parameters.get(&captures[3]) else {
            return reference.to_string();
        };

        if let Some(placeholder) = rendered.get(reference) {
            return placeholder.clone();
        }

        let spread = captures.get(2).is_some();
        let placeholder = match value {
            Value::Array(elements) if spread && elements.is_empty() => "NULL".to_string(),
            Value::Array(elements) if spread => elements
                .iter()
                .map(|element| {
                    values.push(element.clone());
                    dialect.placeholder(values.len() - 1)
                })
                .collect::<Vec<_>>()
                .join(", "),
            value => {
                values.push(value.clone());
                dialect.placeholder(values.len() - 1)
            }
        };

        if dialect.reuses_placeholders() {
            rendered.insert(reference.to_string(), placeholder.clone());
        }
        placeholder
    });

    Ok((escaped.into_owned(), values))
}
