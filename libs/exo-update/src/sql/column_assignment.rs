// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{metadata::column_metadata::ColumnMetadata, sql::value::Value};

use super::{ExpressionBuilder, SQLBuilder};

/// A single `column = <expression>` entry of a SET list.
#[derive(Debug)]
pub struct ColumnAssignment {
    /// Physical column name
    pub column: String,
    pub value: AssignedValue,
}

#[derive(Debug)]
pub enum AssignedValue {
    /// Inlined verbatim
    Raw(String),
    /// A literal `NULL`, for dialects that cannot bind a null
    Null,
    Param(Value),
    /// A parameter wrapped in the dialect's geometry constructor for the column
    Spatial {
        column: ColumnMetadata,
        value: Value,
    },
    /// `column + 1` (optimistic lock version bump)
    Increment,
    CurrentTimestamp,
}

impl ColumnAssignment {
    pub fn new(column: impl Into<String>, value: AssignedValue) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

impl ExpressionBuilder for ColumnAssignment {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.column);
        builder.push_str(" = ");

        match &self.value {
            AssignedValue::Raw(sql) => builder.push_str(sql),
            AssignedValue::Null => builder.push_str("NULL"),
            AssignedValue::Param(value) => builder.push_param(value.clone()),
            AssignedValue::Spatial { column, value } => {
                let placeholder = builder.bind(value.clone());
                match builder.dialect().spatial_literal(column, &placeholder) {
                    Some(literal) => builder.push_str(literal),
                    None => builder.push_str(placeholder),
                }
            }
            AssignedValue::Increment => {
                builder.push_identifier(&self.column);
                builder.push_str(" + 1");
            }
            AssignedValue::CurrentTimestamp => builder.push_str("CURRENT_TIMESTAMP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dialect::{MySql, Postgres},
        metadata::column_type::ColumnType,
    };

    #[test]
    fn param_assignment() {
        let assignment = ColumnAssignment::new("name", AssignedValue::Param(Value::from("Ana")));

        assert_binding!(
            assignment.to_sql(&Postgres),
            r#""name" = :update_param_0"#,
            "Ana"
        );
    }

    #[test]
    fn raw_assignment_binds_nothing() {
        let assignment = ColumnAssignment::new("views", AssignedValue::Raw("views + 1".into()));

        assert_binding!(assignment.to_sql(&Postgres), r#""views" = views + 1"#);
    }

    #[test]
    fn bookkeeping_assignments() {
        assert_binding!(
            ColumnAssignment::new("version", AssignedValue::Increment).to_sql(&MySql::mysql(false)),
            "`version` = `version` + 1"
        );
        assert_binding!(
            ColumnAssignment::new("updated_at", AssignedValue::CurrentTimestamp).to_sql(&Postgres),
            r#""updated_at" = CURRENT_TIMESTAMP"#
        );
    }

    #[test]
    fn spatial_assignment() {
        let column = ColumnMetadata::new("location", "location", ColumnType::Point);
        let assignment = ColumnAssignment::new(
            "location",
            AssignedValue::Spatial {
                column,
                value: Value::from("POINT(1 1)"),
            },
        );

        assert_binding!(
            assignment.to_sql(&MySql::mysql(false)),
            "`location` = ST_GeomFromText(:update_param_0)",
            "POINT(1 1)"
        );
    }
}
