// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use regex::{Captures, Regex};
use tracing::warn;

use crate::{dialect::Dialect, metadata::entity_metadata::EntityMetadata};

/// Replace `<Target>.<propertyPath>` references (as written in conditions, raw values and sort
/// expressions) with the quoted column name. References that do not resolve to exactly one
/// column are left as written.
pub(crate) fn replace_property_names(
    sql: &str,
    metadata: &EntityMetadata,
    dialect: &dyn Dialect,
) -> String {
    // Not preceded by anything that would make the reference part of another identifier, a
    // quoted name or a parameter
    let pattern = format!(
        r#"(^|[^\w.:"'`\]\[@$]){}\.([A-Za-z_][\w.]*)"#,
        regex::escape(&metadata.target_name)
    );
    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(error) => {
            warn!(%error, target = %metadata.target_name, "Property references left unresolved");
            return sql.to_string();
        }
    };

    regex
        .replace_all(sql, |captures: &Captures| {
            let prefix = &captures[1];
            let reference = &captures[2];
            let property_path = reference.trim_end_matches('.');
            let trailing = &reference[property_path.len()..];

            match metadata
                .find_columns_with_property_path(property_path)
                .as_slice()
            {
                [column] => format!(
                    "{prefix}{}{trailing}",
                    dialect.escape(&column.database_name)
                ),
                _ => captures[0].to_string(),
            }
        })
        .into_owned()
}
