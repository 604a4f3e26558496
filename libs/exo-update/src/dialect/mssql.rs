// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{
    metadata::{column_metadata::ColumnMetadata, column_type::ColumnType},
    sql::value::Value,
};

use super::{Dialect, DialectKind, ReturningSyntax};

/// SQL Server. Returned rows are captured with `OUTPUT ... INTO` a table variable, since `OUTPUT`
/// alone cannot be combined with triggers on the target table.
pub struct SqlServer;

impl Dialect for SqlServer {
    fn kind(&self) -> DialectKind {
        DialectKind::SqlServer
    }

    fn escape(&self, identifier: &str) -> String {
        format!("[{}]", identifier.replace(']', "]]"))
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@{index}")
    }

    fn reuses_placeholders(&self) -> bool {
        true
    }

    fn returning_syntax(&self) -> Option<ReturningSyntax> {
        Some(ReturningSyntax::Output)
    }

    fn spatial_literal(&self, column: &ColumnMetadata, placeholder: &str) -> Option<String> {
        let type_name = match column.column_type {
            ColumnType::Geometry | ColumnType::Geography => column.column_type.spatial_name()?,
            _ => return None,
        };

        Some(format!(
            "{type_name}::STGeomFromText({placeholder}, {})",
            column.srid.unwrap_or(0)
        ))
    }

    /// The driver needs to know the native type of each parameter
    fn parametrize(&self, column: &ColumnMetadata, value: Value) -> Value {
        match value {
            Value::Null => Value::Null,
            value => Value::Typed {
                native_type: self.native_type(&column.column_type),
                value: Box::new(value),
            },
        }
    }

    fn native_type(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::SmallInt => "smallint".into(),
            ColumnType::Int => "int".into(),
            ColumnType::BigInt => "bigint".into(),
            ColumnType::Float => "real".into(),
            ColumnType::Double => "float".into(),
            ColumnType::Numeric { precision, scale } => format!(
                "decimal({}, {})",
                precision.unwrap_or(18),
                scale.unwrap_or(0)
            ),
            ColumnType::Boolean => "bit".into(),
            ColumnType::Varchar { length } => format!("nvarchar({})", length.unwrap_or(255)),
            ColumnType::Text
            | ColumnType::Json
            | ColumnType::SimpleArray
            | ColumnType::SimpleJson => "nvarchar(MAX)".into(),
            ColumnType::Timestamp { timezone: true } => "datetimeoffset".into(),
            ColumnType::Timestamp { timezone: false } => "datetime2".into(),
            ColumnType::Date => "date".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Uuid => "uniqueidentifier".into(),
            ColumnType::Binary => "varbinary(MAX)".into(),
            ColumnType::Geometry | ColumnType::Point => "geometry".into(),
            ColumnType::Geography => "geography".into(),
        }
    }

    fn table_variable_declaration(&self, name: &str, columns: &[&ColumnMetadata]) -> Option<String> {
        let columns = columns
            .iter()
            .map(|column| {
                format!(
                    "{} {}",
                    self.escape(&column.database_name),
                    self.native_type(&column.column_type)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        Some(format!("DECLARE {name} TABLE ({columns})"))
    }
}
